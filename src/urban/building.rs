//! Buildings of the urban model.
//!
//! A building is either *modeled* (rooms with semantic faces, constructions
//! and apertures) or *basic* (a bare extruded footprint). Only modeled
//! buildings can be filtering targets.

use crate::Point;
use crate::geom::obb::OrientedBoundingBox;
use crate::geom::polyface::Polyface;
use crate::geom::validate_name;
use crate::urban::construction::Construction;
use crate::urban::surface::{BoundaryCondition, Surface, SurfaceKind};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Geometry used by a building in the scene mesh, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneSource {
    MergedFacade,
    Rooms,
    ExtrudedFootprint,
}

/// A thermal room of a modeled building.
#[derive(Debug, Clone)]
pub struct Room {
    pub identifier: String,
    faces: Vec<Surface>,
}

impl Room {
    pub fn new(identifier: &str, faces: Vec<Surface>) -> Result<Self> {
        let identifier = validate_name(identifier)?;
        if faces.is_empty() {
            return Err(anyhow!("Room {identifier} has no faces"));
        }
        if let Some(ap) = faces.iter().find(|f| f.is_aperture()) {
            return Err(anyhow!(
                "Room {identifier}: aperture {} must be hosted by a face",
                ap.identifier
            ));
        }
        Ok(Self {
            identifier: identifier.to_string(),
            faces,
        })
    }

    /// Creates a room from a closed polyface.
    ///
    /// Upward faces become outdoor roofs, downward faces ground floors and the
    /// rest outdoor walls. All faces get `construction` if given.
    pub fn from_polyface(
        identifier: &str,
        polyface: &Polyface,
        construction: Option<Construction>,
    ) -> Result<Self> {
        let faces = polyface
            .faces()
            .iter()
            .map(|f| {
                let (kind, bc) = if f.is_horizontal() && f.normal().dz > 0. {
                    (SurfaceKind::RoofCeiling, BoundaryCondition::Outdoors)
                } else if f.is_horizontal() {
                    (SurfaceKind::Floor, BoundaryCondition::Ground)
                } else {
                    (SurfaceKind::Wall, BoundaryCondition::Outdoors)
                };
                let mut s = Surface::new(&format!("{identifier}_{}", f.name), kind, bc, f.clone());
                s.construction = construction.clone();
                s
            })
            .collect();
        Self::new(identifier, faces)
    }

    pub fn faces(&self) -> &[Surface] {
        &self.faces
    }

    pub fn faces_mut(&mut self) -> &mut [Surface] {
        &mut self.faces
    }
}

#[derive(Debug, Clone)]
pub struct Building {
    pub id: String,
    extruded_footprint: Polyface,
    oriented_bounding_box: Option<OrientedBoundingBox>,
    rooms: Vec<Room>,
    merged_facade: Option<Polyface>,
    is_modeled: bool,
}

impl Building {
    /// A context-only building described by its extruded footprint.
    pub fn basic(id: &str, extruded_footprint: Polyface) -> Result<Self> {
        let id = validate_name(id)?;
        Ok(Self {
            id: id.to_string(),
            extruded_footprint,
            oriented_bounding_box: None,
            rooms: Vec::new(),
            merged_facade: None,
            is_modeled: false,
        })
    }

    /// A building with a full envelope model.
    pub fn modeled(id: &str, extruded_footprint: Polyface, rooms: Vec<Room>) -> Result<Self> {
        let id = validate_name(id)?;
        if rooms.is_empty() {
            return Err(anyhow!("Modeled building {id} has no rooms"));
        }
        let mut names: Vec<&str> = rooms.iter().map(|r| r.identifier.as_str()).collect();
        names.sort_unstable();
        if let Some(w) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(anyhow!("Room is already present in building {id}: {}", w[0]));
        }
        Ok(Self {
            id: id.to_string(),
            extruded_footprint,
            oriented_bounding_box: None,
            rooms,
            merged_facade: None,
            is_modeled: true,
        })
    }

    pub fn with_oriented_bounding_box(mut self, obb: OrientedBoundingBox) -> Self {
        self.oriented_bounding_box = Some(obb);
        self
    }

    /// Attaches a simplified facade model, preferred for the scene mesh.
    pub fn with_merged_facade(mut self, facade: Polyface) -> Self {
        self.merged_facade = Some(facade);
        self
    }

    pub fn extruded_footprint(&self) -> &Polyface {
        &self.extruded_footprint
    }

    pub fn oriented_bounding_box(&self) -> Option<&OrientedBoundingBox> {
        self.oriented_bounding_box.as_ref()
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn is_modeled(&self) -> bool {
        self.is_modeled
    }

    /// All envelope surfaces: room faces for modeled buildings,
    /// footprint polygons otherwise. Apertures stay attached to their hosts.
    pub fn envelope_surfaces(&self) -> Vec<Surface> {
        if self.is_modeled {
            self.rooms
                .iter()
                .flat_map(|r| r.faces().iter().cloned())
                .collect()
        } else {
            Surface::from_polyface(&self.id, &self.extruded_footprint)
        }
    }

    /// Surfaces that can shade or reflect onto other buildings.
    ///
    /// Only outdoor surfaces qualify. Their apertures stay attached.
    pub fn outdoor_surfaces(&self) -> Vec<Surface> {
        self.envelope_surfaces()
            .into_iter()
            .filter(|s| s.is_outdoors())
            .collect()
    }

    /// Which geometry represents this building in the scene mesh.
    pub fn scene_source(&self) -> SceneSource {
        if self.merged_facade.is_some() {
            SceneSource::MergedFacade
        } else if self.is_modeled {
            SceneSource::Rooms
        } else {
            SceneSource::ExtrudedFootprint
        }
    }

    /// Triangles of the preferred scene geometry.
    pub fn scene_triangles(&self) -> Vec<[Point; 3]> {
        match self.scene_source() {
            SceneSource::MergedFacade => self
                .merged_facade
                .iter()
                .flat_map(|pf| pf.faces().iter().flat_map(|f| f.triangle_points()))
                .collect(),
            SceneSource::Rooms => self
                .rooms
                .iter()
                .flat_map(|r| r.faces().iter())
                .flat_map(|f| f.geometry().triangle_points())
                .collect(),
            SceneSource::ExtrudedFootprint => self
                .extruded_footprint
                .faces()
                .iter()
                .flat_map(|f| f.triangle_points())
                .collect(),
        }
    }
}
