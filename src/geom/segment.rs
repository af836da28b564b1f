//! Line segments and segment-triangle intersection.

use crate::geom::EPS;
use crate::{Point, Vector};
use serde::{Deserialize, Serialize};

/// Barycentric tolerance for segment-triangle intersection.
///
/// Slightly inclusive, so that segments passing exactly through a shared
/// edge of two triangles are not leaking through the mesh.
const BARY_TOLERANCE: f64 = 1e-9;

/// Segment parameters closer than this to either end point are ignored.
const T_TOLERANCE: f64 = 1e-9;

/// A straight segment from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Vector from `start` to `end` (not normalized).
    pub fn vector(&self) -> Vector {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.vector().length()
    }

    /// Moves both end points `margin` towards each other along the segment.
    ///
    /// Segments not longer than `2 * margin` collapse to their midpoint.
    pub fn shrink(&self, margin: f64) -> Self {
        let len = self.length();
        if len <= 2. * margin {
            let mid = Point::new_between_2_points(self.start, self.end, 0.5);
            return Self::new(mid, mid);
        }
        let step = self.vector() * (margin / len);
        Self::new(self.start + step, self.end - step)
    }

    /// Möller–Trumbore test restricted to the open segment.
    ///
    /// Returns the relative position `t` in `(0, 1)` of the hit along the segment.
    /// Segments lying in the triangle plane never intersect.
    pub fn intersect_triangle(&self, tri: &[Point; 3]) -> Option<f64> {
        let dir = self.vector();
        let e1 = tri[1] - tri[0];
        let e2 = tri[2] - tri[0];
        let h = dir.cross(&e2);
        let det = e1.dot(&h);
        if det.abs() < EPS * EPS.sqrt() {
            return None; // Parallel
        }

        let inv_det = 1.0 / det;
        let s = self.start - tri[0];
        let u = inv_det * s.dot(&h);
        if !(-BARY_TOLERANCE..=1.0 + BARY_TOLERANCE).contains(&u) {
            return None;
        }

        let q = s.cross(&e1);
        let v = inv_det * dir.dot(&q);
        if v < -BARY_TOLERANCE || u + v > 1.0 + BARY_TOLERANCE {
            return None;
        }

        let t = inv_det * e2.dot(&q);
        if t > T_TOLERANCE && t < 1.0 - T_TOLERANCE {
            Some(t)
        } else {
            None
        }
    }
}
