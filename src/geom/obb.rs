//! Oriented bounding box of a building.
//!
//! The box is rotated around the vertical axis only, so its faces split into
//! 4 lateral faces (horizontal normal) and 2 horizontal faces (top/bottom).
//! Boxes are computed outside of this crate; here they are validated and queried.

use crate::geom::polyface::Polyface;
use crate::geom::polygon::Polygon;
use crate::{Point, Vector};
use anyhow::{Result, anyhow};

#[derive(Debug, Clone)]
pub struct OrientedBoundingBox {
    faces: Vec<Polygon>,
}

impl OrientedBoundingBox {
    /// Wraps 6 planar faces, 2 of which must be horizontal.
    pub fn new(faces: Vec<Polygon>) -> Result<Self> {
        if faces.len() != 6 {
            return Err(anyhow!(
                "Oriented bounding box needs 6 faces, got {}",
                faces.len()
            ));
        }
        let num_horizontal = faces.iter().filter(|f| f.is_horizontal()).count();
        if num_horizontal != 2 {
            return Err(anyhow!(
                "Oriented bounding box needs 2 horizontal faces, got {num_horizontal}"
            ));
        }
        Ok(Self { faces })
    }

    pub fn from_polyface(polyface: &Polyface) -> Result<Self> {
        Self::new(polyface.faces().to_vec())
    }

    /// Builds a box with its bottom corner at `origin`, its local X axis rotated
    /// by `angle_deg` (counter-clockwise from global X) and the given dimensions.
    pub fn from_dimensions(origin: Point, angle_deg: f64, x: f64, y: f64, z: f64) -> Result<Self> {
        if x <= 0. || y <= 0. || z <= 0. {
            return Err(anyhow!("Box dimensions must be positive: ({x}, {y}, {z})"));
        }
        let a = angle_deg.to_radians();
        let ex = Vector::new(a.cos(), a.sin(), 0.) * x;
        let ey = Vector::new(-a.sin(), a.cos(), 0.) * y;
        let ez = Vector::up() * z;

        let p0 = origin;
        let p1 = origin + ex;
        let p2 = origin + ex + ey;
        let p3 = origin + ey;
        let [p4, p5, p6, p7] = [p0 + ez, p1 + ez, p2 + ez, p3 + ez];

        Self::new(vec![
            Polygon::new("bottom", vec![p0, p3, p2, p1], None)?,
            Polygon::new("side_0", vec![p0, p1, p5, p4], None)?,
            Polygon::new("side_1", vec![p1, p2, p6, p5], None)?,
            Polygon::new("side_2", vec![p3, p7, p6, p2], None)?,
            Polygon::new("side_3", vec![p0, p4, p7, p3], None)?,
            Polygon::new("top", vec![p4, p5, p6, p7], None)?,
        ])
    }

    pub fn faces(&self) -> &[Polygon] {
        &self.faces
    }

    /// Faces whose normal is not vertical. Only these can shade laterally.
    pub fn lateral_faces(&self) -> impl Iterator<Item = &Polygon> {
        self.faces.iter().filter(|f| !f.is_horizontal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dimensions() -> Result<()> {
        let obb = OrientedBoundingBox::from_dimensions(Point::new(0., 0., 0.), 30., 10., 5., 8.)?;
        assert_eq!(obb.lateral_faces().count(), 4);
        assert_eq!(obb.faces().iter().filter(|f| f.is_horizontal()).count(), 2);
        let areas: Vec<f64> = obb.lateral_faces().map(|f| f.area()).collect();
        assert!(areas.iter().any(|a| (a - 80.).abs() < 1e-9));
        assert!(areas.iter().any(|a| (a - 40.).abs() < 1e-9));
        for f in obb.lateral_faces() {
            assert!(f.normal().dz.abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_from_polyface() -> Result<()> {
        let pf = Polyface::from_box(1., 2., 3., None, "box")?;
        let obb = OrientedBoundingBox::from_polyface(&pf)?;
        assert_eq!(obb.faces().len(), 6);
        Ok(())
    }

    #[test]
    fn test_invalid_face_count() -> Result<()> {
        let pf = Polyface::from_box(1., 2., 3., None, "box")?;
        let faces = pf.faces()[..5].to_vec();
        assert!(OrientedBoundingBox::new(faces).is_err());
        Ok(())
    }
}
