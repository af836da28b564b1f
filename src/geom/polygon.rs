//! Planar polygon with cached normal, area, centroid and triangulation.

use crate::geom::EPS;
use crate::geom::bboxes::bounding_box;
use crate::geom::point::check::are_points_collinear;
use crate::geom::triangles::{TriangleIndex, triangle_area, triangulate};
use crate::{Point, Vector};
use anyhow::{Result, anyhow};
use std::fmt;

/// Normals with `|dz|` above this value are considered vertical (horizontal polygon).
const HORIZONTAL_DZ: f64 = 1.0 - 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub name: String,
    pts: Vec<Point>,
    tri: Vec<TriangleIndex>,
    vn: Vector,
    area: f64,
    centroid: Point,
}

impl Polygon {
    /// Creates a polygon from its vertices.
    ///
    /// Vertices are expected counter-clockwise when looking at the front side.
    /// If `normal` is given and points the other way, the vertex order is reversed
    /// so that the polygon faces `normal`. Consecutive duplicate and collinear
    /// vertices are dropped.
    pub fn new(name: &str, pts: Vec<Point>, normal: Option<Vector>) -> Result<Self> {
        let mut pts = clean_points(pts);
        if pts.len() < 3 {
            return Err(anyhow!(
                "Polygon {name} needs at least 3 non-collinear points, got {}",
                pts.len()
            ));
        }
        if are_points_collinear(&pts) {
            return Err(anyhow!("Polygon {name} has all points collinear"));
        }

        let mut vn = newell_normal(&pts)
            .normalize()
            .map_err(|_| anyhow!("Polygon {name} has zero area"))?;

        if let Some(expected) = normal {
            let expected = expected.normalize()?;
            let cos = vn.dot(&expected);
            if cos.abs() < 1. - 1e-6 {
                return Err(anyhow!(
                    "Polygon {name}: given normal {expected} is not perpendicular to the polygon plane"
                ));
            }
            if cos < 0. {
                pts.reverse();
                vn = -vn;
            }
        }

        let (pts, tri) = triangulate(pts, vn, 0)?;

        let mut area = 0.;
        let mut cx = 0.;
        let mut cy = 0.;
        let mut cz = 0.;
        for t in tri.iter() {
            let (a, b, c) = (pts[t.0], pts[t.1], pts[t.2]);
            let ta = triangle_area(a, b, c);
            area += ta;
            cx += ta * (a.x + b.x + c.x) / 3.;
            cy += ta * (a.y + b.y + c.y) / 3.;
            cz += ta * (a.z + b.z + c.z) / 3.;
        }
        if area < EPS {
            return Err(anyhow!("Polygon {name} has zero area"));
        }
        let centroid = Point::new(cx / area, cy / area, cz / area);

        Ok(Self {
            name: name.to_string(),
            pts,
            tri,
            vn,
            area,
            centroid,
        })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.pts
    }

    pub fn triangles(&self) -> &[TriangleIndex] {
        &self.tri
    }

    /// Outward (front side) unit normal.
    pub fn normal(&self) -> Vector {
        self.vn
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Area-weighted centroid.
    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn min_z(&self) -> f64 {
        bounding_box(&self.pts).0.z
    }

    pub fn max_z(&self) -> f64 {
        bounding_box(&self.pts).1.z
    }

    /// True for roofs, floors and other polygons whose normal is (anti)parallel to Z.
    pub fn is_horizontal(&self) -> bool {
        self.vn.dz.abs() > HORIZONTAL_DZ
    }

    /// Returns the coordinates of each triangle.
    pub fn triangle_points(&self) -> Vec<[Point; 3]> {
        self.tri
            .iter()
            .map(|t| [self.pts[t.0], self.pts[t.1], self.pts[t.2]])
            .collect()
    }

    /// Returns a copy moved by `v`.
    pub fn translate(&self, v: Vector) -> Self {
        let mut moved = self.clone();
        for p in moved.pts.iter_mut() {
            *p = *p + v;
        }
        moved.centroid = moved.centroid + v;
        moved
    }

    /// Returns a copy moved by `distance` along its own normal.
    pub fn offset_along_normal(&self, distance: f64) -> Self {
        self.translate(self.vn * distance)
    }

    /// Returns a copy facing the opposite direction.
    pub fn flip(&self, name: &str) -> Result<Self> {
        let mut pts = self.pts.clone();
        pts.reverse();
        Self::new(name, pts, Some(-self.vn))
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2);
        write!(f, "Polygon({}, [", self.name)?;
        for (i, p) in self.pts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.prec$}", p, prec = prec)?;
        }
        write!(f, "])")
    }
}

/// Newell's method. The returned vector has length `2 * area` for planar polygons.
fn newell_normal(pts: &[Point]) -> Vector {
    let n = pts.len();
    let mut v = Vector::new(0., 0., 0.);
    for i in 0..n {
        let p = pts[i];
        let q = pts[(i + 1) % n];
        v.dx += (p.y - q.y) * (p.z + q.z);
        v.dy += (p.z - q.z) * (p.x + q.x);
        v.dz += (p.x - q.x) * (p.y + q.y);
    }
    v
}

/// Removes repeated vertices and vertices lying on the line through their neighbors.
fn clean_points(pts: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(pts.len());
    for p in pts {
        if out.last().is_none_or(|last| !last.is_close(&p)) {
            out.push(p);
        }
    }
    while out.len() > 1 && out[0].is_close(&out[out.len() - 1]) {
        out.pop();
    }

    let mut changed = true;
    while changed && out.len() > 3 {
        changed = false;
        let n = out.len();
        for i in 0..n {
            let prev = out[(i + n - 1) % n];
            let next = out[(i + 1) % n];
            if are_points_collinear(&[prev, out[i], next]) {
                out.remove(i);
                changed = true;
                break;
            }
        }
    }
    out
}
