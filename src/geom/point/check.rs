use super::*;

/// Checks if (multiple) points are collinear
pub fn are_points_collinear(pts: &[Point]) -> bool {
    if pts.len() <= 2 {
        return true; // 1 or 2 points are always collinear
    }
    let p0 = pts[0];
    // Pick the farthest point as the reference direction
    let Some(far) = pts
        .iter()
        .skip(1)
        .max_by(|a, b| p0.distance(a).total_cmp(&p0.distance(b)))
    else {
        return true;
    };
    let Ok(dir) = (*far - p0).normalize() else {
        return true; // All points coincide
    };
    pts.iter()
        .skip(1)
        .all(|p| dir.cross(&(*p - p0)).length() < EPS.sqrt())
}

/// Checks if `ptest` and `pref` lie on the same side of the line `p1`-`p2`.
///
/// Points lying on the line are reported as being on the same side.
pub fn is_point_on_same_side(p1: Point, p2: Point, ptest: Point, pref: Point) -> bool {
    let edge = p2 - p1;
    let c_test = edge.cross(&(ptest - p1));
    let c_ref = edge.cross(&(pref - p1));
    c_test.dot(&c_ref) >= -EPS
}
