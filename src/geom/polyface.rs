use crate::geom::bboxes::bounding_box;
use crate::geom::polygon::Polygon;
use crate::geom::validate_name;
use crate::{Point, Vector};
use anyhow::{Result, anyhow};

/// Closed shell made of planar polygons with outward normals.
#[derive(Debug, Clone)]
pub struct Polyface {
    pub name: String,
    faces: Vec<Polygon>,
}

impl Polyface {
    pub fn new(name: &str, faces: Vec<Polygon>) -> Result<Self> {
        let name = validate_name(name)?;
        if faces.is_empty() {
            return Err(anyhow!("Polyface {name} has no faces"));
        }
        Ok(Self {
            name: name.to_string(),
            faces,
        })
    }

    pub fn faces(&self) -> &[Polygon] {
        &self.faces
    }

    /// Returns all face vertices.
    pub fn vertices(&self) -> Vec<Point> {
        self.faces
            .iter()
            .flat_map(|f| f.vertices().iter().copied())
            .collect()
    }

    /// Returns the `(min, max)` corners of the axis-aligned bounding box.
    pub fn bounding_box(&self) -> (Point, Point) {
        bounding_box(&self.vertices())
    }

    /// Return a box with given dimensions and location.
    ///
    /// `x`, `y`, `z` are the dimensions along the X, Y, Z axes.
    /// The corner `(min(x), min(y), min(z))` will be located at `origin`.
    ///
    /// The face names are hardcoded:
    /// - floor
    /// - wall_0 (XZ at ymin)
    /// - wall_1 (YZ at xmax)
    /// - wall_2 (XZ at ymax)
    /// - wall_3 (YZ at xmin)
    /// - roof
    pub fn from_box(
        x: f64,
        y: f64,
        z: f64,
        origin: Option<(f64, f64, f64)>,
        name: &str,
    ) -> Result<Self> {
        if x <= 0. || y <= 0. || z <= 0. {
            return Err(anyhow!("Box dimensions must be positive: ({x}, {y}, {z})"));
        }
        let origin_vec = match origin {
            Some((dx, dy, dz)) => Vector::new(dx, dy, dz),
            None => Vector::new(0., 0., 0.),
        };

        let p0 = Point::new(0., 0., 0.) + origin_vec;
        let p1 = Point::new(x, 0., 0.) + origin_vec;
        let p2 = Point::new(x, y, 0.) + origin_vec;
        let p3 = Point::new(0., y, 0.) + origin_vec;
        let p4 = Point::new(0., 0., z) + origin_vec;
        let p5 = Point::new(x, 0., z) + origin_vec;
        let p6 = Point::new(x, y, z) + origin_vec;
        let p7 = Point::new(0., y, z) + origin_vec;

        let faces = vec![
            Polygon::new("floor", vec![p0, p3, p2, p1], None)?,
            Polygon::new("wall_0", vec![p0, p1, p5, p4], None)?,
            Polygon::new("wall_1", vec![p1, p2, p6, p5], None)?,
            Polygon::new("wall_2", vec![p3, p7, p6, p2], None)?,
            Polygon::new("wall_3", vec![p0, p4, p7, p3], None)?,
            Polygon::new("roof", vec![p4, p5, p6, p7], None)?,
        ];
        Self::new(name, faces)
    }

    /// Extrudes a horizontal footprint upwards by `height`.
    ///
    /// The footprint may be given clockwise or counter-clockwise. Walls are named
    /// `wall_<i>` after the footprint edge they come from, plus `floor` and `roof`.
    pub fn extrude(name: &str, footprint: &[Point], height: f64) -> Result<Self> {
        if height <= 0. {
            return Err(anyhow!("Extrusion height must be positive, got {height}"));
        }
        // Normalize orientation to counter-clockwise seen from above
        let base = Polygon::new("floor", footprint.to_vec(), Some(Vector::up()))?;
        if !base.is_horizontal() {
            return Err(anyhow!("Footprint of {name} is not horizontal"));
        }
        let pts = base.vertices().to_vec();
        let up = Vector::up() * height;
        let n = pts.len();

        let mut faces = Vec::with_capacity(n + 2);
        faces.push(base.flip("floor")?);
        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            faces.push(Polygon::new(
                &format!("wall_{i}"),
                vec![a, b, b + up, a + up],
                None,
            )?);
        }
        faces.push(Polygon::new(
            "roof",
            pts.iter().map(|p| *p + up).collect(),
            None,
        )?);

        Self::new(name, faces)
    }
}
