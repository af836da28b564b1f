//! Envelope surfaces of buildings.
//!
//! A single record type covers Honeybee-style faces, apertures and raw
//! polyface polygons; the variant is carried by [`SurfaceKind`].

use crate::geom::polyface::Polyface;
use crate::geom::polygon::Polygon;
use crate::urban::construction::Construction;
use crate::{Point, Vector};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    Wall,
    RoofCeiling,
    Floor,
    /// Window or glazed door hosted by a wall or roof.
    Aperture,
    /// Polygon of a bare polyface, without semantic information.
    RawPolygon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryCondition {
    Outdoors,
    Ground,
    Adiabatic,
    /// Adjacent to another surface of the model.
    Surface,
}

#[derive(Debug, Clone)]
pub struct Surface {
    pub identifier: String,
    pub kind: SurfaceKind,
    pub boundary_condition: BoundaryCondition,
    pub construction: Option<Construction>,
    geometry: Polygon,
    apertures: Vec<Surface>,
}

impl Surface {
    pub fn new(
        identifier: &str,
        kind: SurfaceKind,
        boundary_condition: BoundaryCondition,
        geometry: Polygon,
    ) -> Self {
        Self {
            identifier: identifier.to_string(),
            kind,
            boundary_condition,
            construction: None,
            geometry,
            apertures: Vec::new(),
        }
    }

    /// Outdoor wall.
    pub fn wall(identifier: &str, geometry: Polygon) -> Self {
        Self::new(
            identifier,
            SurfaceKind::Wall,
            BoundaryCondition::Outdoors,
            geometry,
        )
    }

    /// Outdoor polygon without semantics.
    pub fn raw(identifier: &str, geometry: Polygon) -> Self {
        Self::new(
            identifier,
            SurfaceKind::RawPolygon,
            BoundaryCondition::Outdoors,
            geometry,
        )
    }

    /// Outdoor aperture with the given glazing.
    pub fn aperture(identifier: &str, geometry: Polygon, construction: Construction) -> Self {
        Self::new(
            identifier,
            SurfaceKind::Aperture,
            BoundaryCondition::Outdoors,
            geometry,
        )
        .with_construction(construction)
    }

    /// Converts the faces of a polyface into raw surfaces named `<prefix>_<face>`.
    ///
    /// Downward facing polygons lie on the ground and get the `Ground` boundary condition.
    pub fn from_polyface(prefix: &str, polyface: &Polyface) -> Vec<Self> {
        polyface
            .faces()
            .iter()
            .map(|f| {
                let bc = if f.is_horizontal() && f.normal().dz < 0. {
                    BoundaryCondition::Ground
                } else {
                    BoundaryCondition::Outdoors
                };
                Self::new(
                    &format!("{prefix}_{}", f.name),
                    SurfaceKind::RawPolygon,
                    bc,
                    f.clone(),
                )
            })
            .collect()
    }

    pub fn with_construction(mut self, construction: Construction) -> Self {
        self.construction = Some(construction);
        self
    }

    /// Attaches a child aperture. Only walls and roofs can host apertures.
    pub fn add_aperture(&mut self, aperture: Surface) -> Result<()> {
        if aperture.kind != SurfaceKind::Aperture {
            return Err(anyhow!(
                "Surface {} is not an aperture ({:?})",
                aperture.identifier,
                aperture.kind
            ));
        }
        if !matches!(self.kind, SurfaceKind::Wall | SurfaceKind::RoofCeiling) {
            return Err(anyhow!(
                "Surface {} ({:?}) cannot host apertures",
                self.identifier,
                self.kind
            ));
        }
        if self.apertures.iter().any(|a| a.identifier == aperture.identifier) {
            return Err(anyhow!(
                "Aperture is already present: {}",
                aperture.identifier
            ));
        }
        self.apertures.push(aperture);
        Ok(())
    }

    pub fn with_aperture(mut self, aperture: Surface) -> Result<Self> {
        self.add_aperture(aperture)?;
        Ok(self)
    }

    pub fn apertures(&self) -> &[Surface] {
        &self.apertures
    }

    pub fn geometry(&self) -> &Polygon {
        &self.geometry
    }

    pub fn vertices(&self) -> &[Point] {
        self.geometry.vertices()
    }

    pub fn centroid(&self) -> Point {
        self.geometry.centroid()
    }

    pub fn area(&self) -> f64 {
        self.geometry.area()
    }

    /// Outward unit normal.
    pub fn normal(&self) -> Vector {
        self.geometry.normal()
    }

    pub fn is_outdoors(&self) -> bool {
        self.boundary_condition == BoundaryCondition::Outdoors
    }

    pub fn is_aperture(&self) -> bool {
        self.kind == SurfaceKind::Aperture
    }

    /// Returns a copy moved by `distance` along its own normal. Apertures are kept.
    pub fn offset_along_normal(&self, distance: f64) -> Self {
        let mut moved = self.clone();
        moved.geometry = self.geometry.offset_along_normal(distance);
        moved
    }
}
