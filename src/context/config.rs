use serde::{Deserialize, Serialize};

/// Parameters of a context filtering run.
///
/// Out-of-range values are not rejected here. Each pass replaces them with a
/// safe default and reports a warning through its observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextFilterConfig {
    /// Minimum majorized view factor for a building to be kept by the first pass.
    ///
    /// Must be in (0, 1). Use a tiny value (e.g. `1e-5`) to select nearly everything.
    pub min_vf_criterion: f64,
    /// Target buildings. Empty means all modeled buildings of the inventory.
    pub building_id_list: Vec<String>,
    /// Rays per facing surface pair, one of 1, 3, 6 or 9 (0 only with `no_ray_tracing`).
    pub number_of_rays: usize,
    /// Test the apertures of context buildings as independent surfaces.
    pub consider_windows: bool,
    /// Accept every outdoor context surface without ray tracing.
    pub no_ray_tracing: bool,
    /// Keep the surfaces rejected by the second pass in the building state.
    pub keep_discarded_faces: bool,
    pub overwrite_first_pass: bool,
    pub overwrite_second_pass: bool,
    /// Cell size of the scene mesh voxel grid (length units).
    pub voxel_size: f64,
    /// Worker threads. `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
}

impl ContextFilterConfig {
    pub fn new() -> Self {
        Self {
            min_vf_criterion: 0.01,
            building_id_list: Vec::new(),
            number_of_rays: 3,
            consider_windows: false,
            no_ray_tracing: false,
            keep_discarded_faces: false,
            overwrite_first_pass: false,
            overwrite_second_pass: false,
            voxel_size: 5.0,
            num_threads: None,
        }
    }
}

impl Default for ContextFilterConfig {
    fn default() -> Self {
        Self::new()
    }
}
