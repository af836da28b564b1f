//! Majorized view factor between two patches.
//!
//! Both patches are replaced by squares of equal area, parallel and facing
//! each other with aligned centers. This arrangement maximizes the view factor
//! for the given areas and center distance, so the result is an upper bound
//! of the true view factor. It is only used to decide whether a building can
//! matter at all.

use crate::Point;
use std::f64::consts::PI;

/// Distance used when both centroids coincide.
const MIN_DISTANCE: f64 = 0.01;

/// Upper bound of the view factor from patch 1 to patch 2.
///
/// The result is not symmetric: the prefactor only depends on patch 1.
pub fn majorized_view_factor(centroid_1: Point, area_1: f64, centroid_2: Point, area_2: f64) -> f64 {
    let mut d = centroid_1.distance(&centroid_2);
    if d == 0. {
        d = MIN_DISTANCE;
    }
    let w1 = area_1.sqrt() / d;
    let w2 = area_2.sqrt() / d;
    parallel_squares_view_factor(w1, w2)
}

/// View factor between coaxial parallel squares with normalized sides `w1` and `w2`.
fn parallel_squares_view_factor(w1: f64, w2: f64) -> f64 {
    let x = w2 - w1;
    let y = w2 + w1;
    let p = (w1.powi(2) + w2.powi(2) + 2.).powi(2);
    let q = (x.powi(2) + 2.) * (y.powi(2) + 2.);
    let u = (x.powi(2) + 4.).sqrt();
    let v = (y.powi(2) + 4.).sqrt();
    let s = u * (x * (x / u).atan() - y * (y / u).atan());
    let t = v * (x * (x / v).atan() - y * (y / v).atan());
    (1. / (PI * w1.powi(2))) * ((p / q).ln() + s - t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vf_at(d: f64, a1: f64, a2: f64) -> f64 {
        majorized_view_factor(Point::new(0., 0., 0.), a1, Point::new(d, 0., 0.), a2)
    }

    #[test]
    fn test_known_values() {
        assert!((vf_at(1., 4., 4.) - 0.41525).abs() < 1e-4);
        assert!((vf_at(2., 4., 4.) - 0.19982).abs() < 1e-4);
        assert!((vf_at(10., 4., 4.) - 0.012404).abs() < 1e-5);
    }

    #[test]
    fn test_non_negative_and_decreasing() {
        let mut prev = f64::INFINITY;
        for i in 1..200 {
            let d = i as f64 * 0.5;
            let vf = vf_at(d, 4., 9.);
            assert!(vf >= 0.);
            assert!(vf < prev, "not decreasing at d={d}");
            prev = vf;
        }
    }

    #[test]
    fn test_coincident_centroids() {
        let vf = vf_at(0., 4., 4.);
        assert!(vf.is_finite());
        assert!((vf - 0.99012).abs() < 1e-4);
    }

    #[test]
    fn test_not_symmetric() {
        let small_to_large = vf_at(10., 1., 100.);
        let large_to_small = vf_at(10., 100., 1.);
        assert!((small_to_large - 0.2390).abs() < 1e-3);
        assert!((large_to_small - 0.00239).abs() < 1e-4);
        assert!((small_to_large - large_to_small).abs() > 0.1);
    }

    #[test]
    fn test_vanishes_far_away() {
        assert!(vf_at(1e4, 100., 300.) < 1e-5);
    }
}
