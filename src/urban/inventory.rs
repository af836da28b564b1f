//! Buildings of an urban model with their context filtering state.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};

use crate::context::error::ContextFilterError;
use crate::context::observer::{FilterEvent, FilterObserver};
use crate::context::second_pass::ContextSurface;
use crate::context::shade::ShadeConstructionCache;
use crate::context::state::ContextFilterState;
use crate::urban::building::Building;

/// Buildings keyed by id. Each building owns exactly one filter state,
/// created on insertion and dropped on removal.
#[derive(Debug, Default)]
pub struct BuildingInventory {
    buildings: BTreeMap<String, Building>,
    states: BTreeMap<String, ContextFilterState>,
    shade_constructions: ShadeConstructionCache,
}

impl BuildingInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_building(&mut self, building: Building) -> Result<()> {
        if self.buildings.contains_key(&building.id) {
            return Err(anyhow!("Building is already present: {}", building.id));
        }
        self.states
            .insert(building.id.clone(), ContextFilterState::new(&building.id));
        self.buildings.insert(building.id.clone(), building);
        Ok(())
    }

    pub fn with_building(mut self, building: Building) -> Result<Self> {
        self.add_building(building)?;
        Ok(self)
    }

    /// Removes a building and its state.
    pub fn remove_building(&mut self, id: &str) -> Option<Building> {
        self.states.remove(id);
        self.buildings.remove(id)
    }

    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.get(id)
    }

    /// Buildings sorted by id.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn state(&self, id: &str) -> Option<&ContextFilterState> {
        self.states.get(id)
    }

    pub fn state_mut(&mut self, id: &str) -> Option<&mut ContextFilterState> {
        self.states.get_mut(id)
    }

    pub fn states(&self) -> impl Iterator<Item = &ContextFilterState> {
        self.states.values()
    }

    pub fn shade_constructions(&self) -> &ShadeConstructionCache {
        &self.shade_constructions
    }

    /// Surfaces the user wants as shades of `target_id`, whatever the filters say.
    pub fn force_context_surfaces(
        &mut self,
        target_id: &str,
        surfaces: Vec<ContextSurface>,
    ) -> std::result::Result<(), ContextFilterError> {
        let state =
            self.states
                .get_mut(target_id)
                .ok_or_else(|| ContextFilterError::UnknownBuilding {
                    building_id: target_id.to_string(),
                })?;
        state.set_forced_context_surfaces(surfaces);
        Ok(())
    }

    /// Resolves the target buildings of a run.
    ///
    /// An empty `ids` list means all modeled buildings. Unknown ids are reported
    /// and skipped. Known ids of buildings that are not modeled are returned as
    /// errors.
    pub fn resolve_targets(
        &self,
        ids: &[String],
        observer: &dyn FilterObserver,
    ) -> (Vec<String>, Vec<ContextFilterError>) {
        if ids.is_empty() {
            let targets = self
                .buildings
                .values()
                .filter(|b| b.is_modeled())
                .map(|b| b.id.clone())
                .collect();
            return (targets, Vec::new());
        }

        let mut targets: Vec<String> = Vec::new();
        let mut errors = Vec::new();
        for id in ids {
            if targets.contains(id) {
                continue;
            }
            match self.buildings.get(id) {
                None => observer.notify(FilterEvent::UnknownBuilding {
                    building_id: id.clone(),
                }),
                Some(b) if !b.is_modeled() => errors.push(ContextFilterError::NotModeled {
                    building_id: id.clone(),
                }),
                Some(_) => targets.push(id.clone()),
            }
        }
        (targets, errors)
    }
}
