//! Rays between a context surface (emitter) and a target face (receiver).
//!
//! Each surface provides three anchors on a horizontal line: its left corner,
//! its right corner and their midpoint. Left and right are seen from the
//! front side of the surface. Receiver anchors are placed at the receiver
//! centroid height, emitter anchors at the lowest of both top heights.

use crate::geom::polygon::Polygon;
use crate::geom::segment::Segment;
use crate::vecutils::argmin_argmax;
use crate::{Point, Vector};

/// Distance removed from both ends of each ray when excluding margins.
pub const RAY_MARGIN: f64 = 0.05;

/// Maximum number of rays per surface pair.
pub const MAX_RAYS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Center,
    Left,
    Right,
}

/// Ray template in priority order, as `(emitter anchor, receiver anchor)`.
const RAY_TEMPLATE: [(Anchor, Anchor); MAX_RAYS] = [
    (Anchor::Center, Anchor::Center),
    (Anchor::Center, Anchor::Left),
    (Anchor::Center, Anchor::Right),
    (Anchor::Left, Anchor::Center),
    (Anchor::Right, Anchor::Center),
    (Anchor::Left, Anchor::Left),
    (Anchor::Right, Anchor::Right),
    (Anchor::Left, Anchor::Right),
    (Anchor::Right, Anchor::Left),
];

/// Returns the first `n_rays` rays of the template, from emitter to receiver.
///
/// `n_rays` above [`MAX_RAYS`] is capped. With `exclude_margin`, both end
/// points of each ray are moved [`RAY_MARGIN`] towards each other.
pub fn generate_rays(
    emitter: &Polygon,
    receiver: &Polygon,
    exclude_margin: bool,
    n_rays: usize,
) -> Vec<Segment> {
    let emitter_z = emitter.max_z().min(receiver.max_z());
    let receiver_z = receiver.centroid().z;
    let emitter_anchors = Anchors::new(emitter, emitter_z);
    let receiver_anchors = Anchors::new(receiver, receiver_z);

    RAY_TEMPLATE
        .iter()
        .take(n_rays.min(MAX_RAYS))
        .map(|&(e, r)| {
            let ray = Segment::new(emitter_anchors.get(e), receiver_anchors.get(r));
            if exclude_margin {
                ray.shrink(RAY_MARGIN)
            } else {
                ray
            }
        })
        .collect()
}

struct Anchors {
    left: Point,
    right: Point,
    center: Point,
}

impl Anchors {
    fn new(poly: &Polygon, z: f64) -> Self {
        let h = horizontal_direction(poly.normal());
        let proj: Vec<f64> = poly
            .vertices()
            .iter()
            .map(|p| p.x * h.dx + p.y * h.dy)
            .collect();
        // Polygons always have at least 3 vertices
        let (imin, imax) = argmin_argmax(&proj).unwrap_or((0, 0));
        let left = poly.vertices()[imin].with_z(z);
        let right = poly.vertices()[imax].with_z(z);
        let center = Point::new_between_2_points(left, right, 0.5);
        Self {
            left,
            right,
            center,
        }
    }

    fn get(&self, anchor: Anchor) -> Point {
        match anchor {
            Anchor::Center => self.center,
            Anchor::Left => self.left,
            Anchor::Right => self.right,
        }
    }
}

/// Horizontal unit vector pointing to the right of an observer facing the front side.
///
/// Horizontal polygons have no preferred direction, the X axis is used.
fn horizontal_direction(normal: Vector) -> Vector {
    Vector::up()
        .cross(&normal)
        .normalize()
        .unwrap_or(Vector::new(1., 0., 0.))
}
