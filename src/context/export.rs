//! JSON records of the filter states.
//!
//! The in-memory types are never serialized directly. States are converted to
//! plain records keyed by building id, and rebuilt from them on import. Shade
//! constructions are resolved again through the inventory cache.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::Point;
use crate::context::second_pass::ContextSurface;
use crate::context::shade::{Shade, ShadeConstructionCache};
use crate::context::state::ContextFilterState;
use crate::geom::polygon::Polygon;
use crate::urban::construction::Construction;
use crate::urban::inventory::BuildingInventory;
use crate::urban::surface::{BoundaryCondition, Surface, SurfaceKind};

/// Surface of a context building. Apertures are not exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRecord {
    pub building_id: String,
    pub identifier: String,
    pub kind: SurfaceKind,
    pub boundary_condition: BoundaryCondition,
    #[serde(default)]
    pub construction: Option<Construction>,
    pub vertices: Vec<Point>,
}

impl SurfaceRecord {
    pub fn from_context_surface(c: &ContextSurface) -> Self {
        Self {
            building_id: c.building_id.clone(),
            identifier: c.surface.identifier.clone(),
            kind: c.surface.kind,
            boundary_condition: c.surface.boundary_condition,
            construction: c.surface.construction.clone(),
            vertices: c.surface.vertices().to_vec(),
        }
    }

    pub fn to_context_surface(&self) -> Result<ContextSurface> {
        let geometry = Polygon::new(&self.identifier, self.vertices.clone(), None)?;
        let mut surface = Surface::new(
            &self.identifier,
            self.kind,
            self.boundary_condition,
            geometry,
        );
        surface.construction = self.construction.clone();
        Ok(ContextSurface::new(&self.building_id, surface))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadeRecord {
    pub identifier: String,
    pub source: SurfaceRecord,
    pub solar_reflectance: f64,
    pub visible_reflectance: f64,
    pub is_specular: bool,
}

impl ShadeRecord {
    pub fn from_shade(shade: &Shade) -> Self {
        let source = ContextSurface::new(&shade.source_building_id, shade.source_surface.clone());
        Self {
            identifier: shade.identifier(),
            source: SurfaceRecord::from_context_surface(&source),
            solar_reflectance: shade.solar_reflectance(),
            visible_reflectance: shade.visible_reflectance(),
            is_specular: shade.is_specular,
        }
    }

    /// Rebuilds the shade. Its geometry is used as stored, without offset.
    pub fn to_shade(&self, cache: &ShadeConstructionCache) -> Result<Shade> {
        let source = self.source.to_context_surface()?;
        let construction = cache.get_or_insert(self.solar_reflectance, self.visible_reflectance);
        Ok(Shade::new(
            &source.building_id,
            source.surface,
            construction,
            self.is_specular,
        ))
    }
}

/// Serializable form of [`ContextFilterState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextFilterRecord {
    pub min_vf_criterion: f64,
    pub selected_context_building_id_list: Vec<String>,
    pub first_pass_done: bool,
    pub first_pass_duration: f64,
    pub number_of_rays: usize,
    pub consider_windows: bool,
    pub context_shading_list: Vec<ShadeRecord>,
    #[serde(default)]
    pub discarded_surfaces: Option<Vec<SurfaceRecord>>,
    pub second_pass_done: bool,
    pub second_pass_duration: f64,
    #[serde(default)]
    pub forced_context_surfaces: Vec<SurfaceRecord>,
}

impl ContextFilterRecord {
    pub fn from_state(state: &ContextFilterState) -> Self {
        Self {
            min_vf_criterion: state.min_vf_criterion(),
            selected_context_building_id_list: state
                .selected_context_building_ids()
                .iter()
                .cloned()
                .collect(),
            first_pass_done: state.first_pass_done(),
            first_pass_duration: state.first_pass_duration(),
            number_of_rays: state.number_of_rays(),
            consider_windows: state.consider_windows(),
            context_shading_list: state
                .context_shading_list()
                .iter()
                .map(ShadeRecord::from_shade)
                .collect(),
            discarded_surfaces: state
                .discarded_surfaces()
                .map(|d| d.iter().map(SurfaceRecord::from_context_surface).collect()),
            second_pass_done: state.second_pass_done(),
            second_pass_duration: state.second_pass_duration(),
            forced_context_surfaces: state
                .forced_context_surfaces()
                .iter()
                .map(SurfaceRecord::from_context_surface)
                .collect(),
        }
    }

    /// Rebuilds the state of `building_id`.
    pub fn to_state(
        &self,
        building_id: &str,
        cache: &ShadeConstructionCache,
    ) -> Result<ContextFilterState> {
        let mut state = ContextFilterState::new(building_id);
        state.set_forced_context_surfaces(
            self.forced_context_surfaces
                .iter()
                .map(SurfaceRecord::to_context_surface)
                .collect::<Result<_>>()?,
        );
        if self.first_pass_done {
            state.record_first_pass(
                self.min_vf_criterion,
                self.selected_context_building_id_list.iter().cloned().collect(),
                self.first_pass_duration,
            );
        }
        if self.second_pass_done {
            let shades = self
                .context_shading_list
                .iter()
                .map(|s| s.to_shade(cache))
                .collect::<Result<_>>()?;
            let discarded = self
                .discarded_surfaces
                .as_ref()
                .map(|d| {
                    d.iter()
                        .map(SurfaceRecord::to_context_surface)
                        .collect::<Result<Vec<_>>>()
                })
                .transpose()?;
            state.record_second_pass(
                self.number_of_rays,
                self.consider_windows,
                shades,
                discarded,
                self.second_pass_duration,
            )?;
        }
        Ok(state)
    }
}

/// Serializes all states to a JSON object keyed by building id.
pub fn states_to_json(inventory: &BuildingInventory) -> Result<String> {
    let records: BTreeMap<&str, ContextFilterRecord> = inventory
        .states()
        .map(|s| (s.building_id(), ContextFilterRecord::from_state(s)))
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Restores states from [`states_to_json`] output.
///
/// Every id must belong to a building of the inventory. Returns the number of
/// restored states. Nothing is modified if any record is invalid.
pub fn states_from_json(inventory: &mut BuildingInventory, json: &str) -> Result<usize> {
    let records: BTreeMap<String, ContextFilterRecord> = serde_json::from_str(json)?;
    let mut restored = Vec::with_capacity(records.len());
    for (id, record) in records.iter() {
        if inventory.building(id).is_none() {
            return Err(anyhow!("Building {id} is not in the inventory"));
        }
        restored.push(record.to_state(id, inventory.shade_constructions())?);
    }
    let n = restored.len();
    for state in restored {
        if let Some(slot) = inventory.state_mut(state.building_id()) {
            *slot = state;
        }
    }
    Ok(n)
}
