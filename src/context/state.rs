use std::collections::BTreeSet;

use crate::context::error::{ContextFilterError, Result};
use crate::context::first_pass::DEFAULT_MIN_VF_CRITERION;
use crate::context::second_pass::{ContextSurface, DEFAULT_NUMBER_OF_RAYS};
use crate::context::shade::Shade;

/// Context filtering results of one target building.
///
/// Only the passes write into it. Recording a new first pass invalidates the
/// second pass, so `second_pass_done` always implies `first_pass_done`.
#[derive(Debug, Clone)]
pub struct ContextFilterState {
    building_id: String,

    // First pass
    min_vf_criterion: f64,
    selected_context_building_ids: BTreeSet<String>,
    first_pass_done: bool,
    first_pass_duration: f64,

    // Second pass
    number_of_rays: usize,
    consider_windows: bool,
    context_shading_list: Vec<Shade>,
    discarded_surfaces: Option<Vec<ContextSurface>>,
    second_pass_done: bool,
    second_pass_duration: f64,

    /// Surfaces the user wants as shades regardless of the filters.
    forced_context_surfaces: Vec<ContextSurface>,
}

impl ContextFilterState {
    pub fn new(building_id: &str) -> Self {
        Self {
            building_id: building_id.to_string(),
            min_vf_criterion: DEFAULT_MIN_VF_CRITERION,
            selected_context_building_ids: BTreeSet::new(),
            first_pass_done: false,
            first_pass_duration: 0.,
            number_of_rays: DEFAULT_NUMBER_OF_RAYS,
            consider_windows: false,
            context_shading_list: Vec::new(),
            discarded_surfaces: None,
            second_pass_done: false,
            second_pass_duration: 0.,
            forced_context_surfaces: Vec::new(),
        }
    }

    pub fn building_id(&self) -> &str {
        &self.building_id
    }

    pub fn min_vf_criterion(&self) -> f64 {
        self.min_vf_criterion
    }

    pub fn selected_context_building_ids(&self) -> &BTreeSet<String> {
        &self.selected_context_building_ids
    }

    pub fn first_pass_done(&self) -> bool {
        self.first_pass_done
    }

    pub fn first_pass_duration(&self) -> f64 {
        self.first_pass_duration
    }

    pub fn number_of_rays(&self) -> usize {
        self.number_of_rays
    }

    pub fn consider_windows(&self) -> bool {
        self.consider_windows
    }

    pub fn context_shading_list(&self) -> &[Shade] {
        &self.context_shading_list
    }

    pub fn discarded_surfaces(&self) -> Option<&[ContextSurface]> {
        self.discarded_surfaces.as_deref()
    }

    pub fn second_pass_done(&self) -> bool {
        self.second_pass_done
    }

    pub fn second_pass_duration(&self) -> f64 {
        self.second_pass_duration
    }

    pub fn forced_context_surfaces(&self) -> &[ContextSurface] {
        &self.forced_context_surfaces
    }

    /// Replaces the user-forced surfaces. They are kept across pass overwrites.
    pub fn set_forced_context_surfaces(&mut self, surfaces: Vec<ContextSurface>) {
        self.forced_context_surfaces = surfaces;
    }

    /// Stores a first pass result and resets the second pass.
    pub fn record_first_pass(
        &mut self,
        min_vf_criterion: f64,
        selected: BTreeSet<String>,
        duration: f64,
    ) {
        self.min_vf_criterion = min_vf_criterion;
        self.selected_context_building_ids = selected;
        self.first_pass_done = true;
        self.first_pass_duration = duration;
        self.reset_second_pass();
    }

    /// Stores a second pass result. The previous shades are replaced, not merged.
    pub fn record_second_pass(
        &mut self,
        number_of_rays: usize,
        consider_windows: bool,
        shades: Vec<Shade>,
        discarded: Option<Vec<ContextSurface>>,
        duration: f64,
    ) -> Result<()> {
        if !self.first_pass_done {
            return Err(ContextFilterError::FirstPassNotDone {
                building_id: self.building_id.clone(),
            });
        }
        self.number_of_rays = number_of_rays;
        self.consider_windows = consider_windows;
        self.context_shading_list = shades;
        self.discarded_surfaces = discarded;
        self.second_pass_done = true;
        self.second_pass_duration = duration;
        Ok(())
    }

    fn reset_second_pass(&mut self) {
        self.context_shading_list.clear();
        self.discarded_surfaces = None;
        self.second_pass_done = false;
        self.second_pass_duration = 0.;
    }
}
