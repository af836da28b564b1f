//! Vector utility functions

/// Index of the smallest and of the largest value.
///
/// Ties keep the first occurrence. Returns `None` for an empty slice.
pub fn argmin_argmax(vec: &[f64]) -> Option<(usize, usize)> {
    if vec.is_empty() {
        return None;
    }
    let mut imin = 0;
    let mut imax = 0;
    for (i, &x) in vec.iter().enumerate() {
        if x < vec[imin] {
            imin = i;
        }
        if x > vec[imax] {
            imax = i;
        }
    }
    Some((imin, imax))
}
