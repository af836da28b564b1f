use crate::Point;
use crate::geom::IsClose;
use crate::geom::point::check::{are_points_collinear, is_point_on_same_side};
use crate::geom::vector::Vector;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Type for holding vertex indices for a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleIndex(pub usize, pub usize, pub usize);

/// Triangulates the polygon defined by points `pts` and unit normal `vn`.
///
/// Ear-clipping. The points must be ordered counter-clockwise with respect
/// to `vn`. On failure the reversed point order is tried once.
pub fn triangulate(
    mut pts: Vec<Point>,
    vn: Vector,
    num_try: usize,
) -> Result<(Vec<Point>, Vec<TriangleIndex>)> {
    if num_try >= 2 {
        return Err(anyhow!("Ear-clipping algorithm failed."));
    }
    if vn.length().is_close(0.) {
        return Err(anyhow!("Normal vector cannot have zero length"));
    }
    if pts.len() < 3 {
        return Err(anyhow!("At least 3 points are needed, got {}", pts.len()));
    }

    let mut vertices: Vec<usize> = (0..pts.len()).collect();
    let mut triangles: Vec<TriangleIndex> = Vec::new();
    let mut pos: usize = 0;
    let mut num_fail: usize = 0;

    while vertices.len() > 2 {
        if num_fail > pts.len() {
            // Try with flipped points
            pts.reverse();
            return triangulate(pts, -vn, num_try + 1).map(|(mut pts, tri)| {
                // Restore the original orientation
                let n = pts.len();
                pts.reverse();
                let tri = tri
                    .into_iter()
                    .map(|t| TriangleIndex(n - 1 - t.0, n - 1 - t.2, n - 1 - t.1))
                    .collect();
                (pts, tri)
            });
        }

        // If last vertex, start from the beginning
        if pos > vertices.len() - 1 {
            pos = 0;
        }

        let prev_pos = if pos > 0 { pos - 1 } else { vertices.len() - 1 };
        let next_pos = if pos < vertices.len() - 1 { pos + 1 } else { 0 };

        let prev_id = vertices[prev_pos];
        let curr_id = vertices[pos];
        let next_id = vertices[next_pos];

        if is_corner_convex(&pts[prev_id], &pts[curr_id], &pts[next_id], &vn) {
            // No other point may be within this triangle (non-convex polygons)
            let any_point_inside = vertices.iter().any(|&test_id| {
                ![prev_id, curr_id, next_id].contains(&test_id)
                    && is_point_inside_triangle(
                        pts[test_id],
                        pts[prev_id],
                        pts[curr_id],
                        pts[next_id],
                    )
            });
            if !any_point_inside {
                triangles.push(TriangleIndex(prev_id, curr_id, next_id));
                vertices.remove(pos);
                num_fail = 0;
                continue;
            }
        }
        num_fail += 1;
        pos += 1;
    }

    Ok((pts, triangles))
}

/// Checks if the angle between p2->p1 and p2->p3 is less than 180 degrees
///
/// It is done by comparing the polygon normal vector with the cross
/// product p1->p2 x p2->p3. The points p1, p2, p3 should be ordered
/// counter-clockwise with respect to the surface front side.
pub fn is_corner_convex(p1: &Point, p2: &Point, p3: &Point, vn: &Vector) -> bool {
    debug_assert!((vn.length() - 1.0).abs() < 1e-6);

    let v1: Vector = *p2 - *p1;
    let v2: Vector = *p3 - *p2;
    match v1.cross(&v2).normalize() {
        Ok(v1v2_n) => v1v2_n.dot(vn) > 0.,
        Err(_) => false, // Collinear points p1, p2, p3
    }
}

/// Tests if point `ptest` is inside the triangle `(p1, p2, p3)`.
///
/// Using the "same side technique" described at:
/// https://blackpawn.com/texts/pointinpoly/
/// Points on the edges count as inside.
/// This function does not test if the point is coplanar with the triangle.
pub fn is_point_inside_triangle(ptest: Point, p1: Point, p2: Point, p3: Point) -> bool {
    if ptest.is_close(&p1) || ptest.is_close(&p2) || ptest.is_close(&p3) {
        return true;
    }
    for (pa, pb) in [(p1, p2), (p2, p3), (p3, p1)] {
        if are_points_collinear(&[pa, pb, ptest]) {
            return ptest.is_on_segment(pa, pb);
        }
    }

    is_point_on_same_side(p1, p2, ptest, p3)
        && is_point_on_same_side(p2, p3, ptest, p1)
        && is_point_on_same_side(p3, p1, ptest, p2)
}

/// Area of the triangle `(p1, p2, p3)`.
pub fn triangle_area(p1: Point, p2: Point, p3: Point) -> f64 {
    0.5 * (p2 - p1).cross(&(p3 - p1)).length()
}
