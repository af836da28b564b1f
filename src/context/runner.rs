//! Runs the filter passes over the target buildings of an inventory.
//!
//! Targets are processed in parallel. Workers only read the inventory and the
//! scene mesh; their results are written into the building states afterwards,
//! one building at a time. A failing building is reported and does not stop
//! the others.

use std::time::Instant;

use anyhow::Result;
use rayon::prelude::*;

use crate::context::config::ContextFilterConfig;
use crate::context::error::ContextFilterError;
use crate::context::first_pass::{BoundingBoxCandidate, FirstPassOutcome, select_context_buildings};
use crate::context::observer::{FilterEvent, FilterObserver};
use crate::context::scene::SceneMesh;
use crate::context::second_pass::{
    ContextSurface, SecondPassOptions, SecondPassOutcome, select_shading_surfaces,
};
use crate::urban::inventory::BuildingInventory;

/// Outcome of one pass over the inventory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Buildings whose pass was computed.
    pub completed: Vec<String>,
    /// Buildings whose previous result was kept.
    pub skipped: Vec<String>,
    pub failed: Vec<ContextFilterError>,
}

impl RunReport {
    fn fail(&mut self, error: ContextFilterError, observer: &dyn FilterObserver) {
        observer.notify(FilterEvent::BuildingFailed {
            building_id: error.building_id().to_string(),
            message: error.to_string(),
        });
        self.failed.push(error);
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Reports of a full run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReports {
    pub first_pass: RunReport,
    pub second_pass: RunReport,
}

/// Runs the first pass, then the second pass.
pub fn run(
    inventory: &mut BuildingInventory,
    config: &ContextFilterConfig,
    observer: &dyn FilterObserver,
) -> Result<RunReports> {
    let first_pass = run_first_pass(inventory, config, observer)?;
    let second_pass = run_second_pass(inventory, config, observer)?;
    Ok(RunReports {
        first_pass,
        second_pass,
    })
}

/// Selects the context buildings of each target.
///
/// Targets with a completed first pass are skipped unless
/// `overwrite_first_pass` is set. Overwriting invalidates the second pass.
pub fn run_first_pass(
    inventory: &mut BuildingInventory,
    config: &ContextFilterConfig,
    observer: &dyn FilterObserver,
) -> Result<RunReport> {
    let mut report = RunReport::default();
    let (targets, errors) = inventory.resolve_targets(&config.building_id_list, observer);
    for e in errors {
        report.fail(e, observer);
    }

    let mut todo = Vec::new();
    for id in targets {
        let done = inventory.state(&id).is_some_and(|s| s.first_pass_done());
        if done && !config.overwrite_first_pass {
            observer.notify(FilterEvent::FirstPassSkipped {
                building_id: id.clone(),
            });
            report.skipped.push(id);
        } else {
            todo.push(id);
        }
    }

    let inv = &*inventory;
    let results: Vec<(String, Result<FirstPassOutcome, ContextFilterError>)> =
        install(config.num_threads, || {
            todo.par_iter()
                .map(|id| (id.clone(), first_pass_for(inv, id, config, observer)))
                .collect()
        })?;

    for (id, result) in results {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                report.fail(e, observer);
                continue;
            }
        };
        let Some(state) = inventory.state_mut(&id) else {
            report.fail(ContextFilterError::UnknownBuilding { building_id: id }, observer);
            continue;
        };
        observer.notify(FilterEvent::FirstPassDone {
            building_id: id.clone(),
            num_selected: outcome.selected.len(),
            duration: outcome.duration,
        });
        state.record_first_pass(outcome.min_vf_criterion, outcome.selected, outcome.duration);
        report.completed.push(id);
    }
    Ok(report)
}

/// Selects the shading surfaces of each target.
///
/// The scene mesh is built once, before any target is processed, from all
/// buildings of the inventory. Targets without first pass fail; targets with a
/// completed second pass are skipped unless `overwrite_second_pass` is set.
pub fn run_second_pass(
    inventory: &mut BuildingInventory,
    config: &ContextFilterConfig,
    observer: &dyn FilterObserver,
) -> Result<RunReport> {
    let mut report = RunReport::default();
    let (targets, errors) = inventory.resolve_targets(&config.building_id_list, observer);
    for e in errors {
        report.fail(e, observer);
    }

    let mut todo = Vec::new();
    for id in targets {
        let Some(state) = inventory.state(&id) else {
            report.fail(ContextFilterError::UnknownBuilding { building_id: id }, observer);
            continue;
        };
        if !state.first_pass_done() {
            report.fail(ContextFilterError::FirstPassNotDone { building_id: id }, observer);
        } else if state.second_pass_done() && !config.overwrite_second_pass {
            observer.notify(FilterEvent::SecondPassSkipped {
                building_id: id.clone(),
            });
            report.skipped.push(id);
        } else {
            todo.push(id);
        }
    }
    if todo.is_empty() {
        return Ok(report);
    }

    let scene = if config.no_ray_tracing {
        SceneMesh::empty()
    } else {
        let t0 = Instant::now();
        let scene = SceneMesh::from_buildings(inventory.buildings(), config.voxel_size)?;
        observer.notify(FilterEvent::SceneMeshBuilt {
            num_buildings: scene.building_count(),
            sources: scene.source_counts(),
            num_triangles: scene.triangle_count(),
            duration: t0.elapsed().as_secs_f64(),
        });
        scene
    };

    let inv = &*inventory;
    let scene = &scene;
    let results: Vec<(String, Result<SecondPassOutcome, ContextFilterError>)> =
        install(config.num_threads, || {
            todo.par_iter()
                .map(|id| (id.clone(), second_pass_for(inv, id, scene, config, observer)))
                .collect()
        })?;

    for (id, result) in results {
        let applied = result.and_then(|outcome| {
            let state = inventory
                .state_mut(&id)
                .ok_or_else(|| ContextFilterError::UnknownBuilding {
                    building_id: id.clone(),
                })?;
            let num_shades = outcome.shades.len();
            let num_discarded = outcome.discarded.as_ref().map_or(0, Vec::len);
            state.record_second_pass(
                outcome.number_of_rays,
                config.consider_windows,
                outcome.shades,
                outcome.discarded,
                outcome.duration,
            )?;
            observer.notify(FilterEvent::SecondPassDone {
                building_id: id.clone(),
                num_shades,
                num_discarded,
                duration: outcome.duration,
            });
            Ok(())
        });
        match applied {
            Ok(()) => report.completed.push(id),
            Err(e) => report.fail(e, observer),
        }
    }
    Ok(report)
}

fn first_pass_for(
    inventory: &BuildingInventory,
    id: &str,
    config: &ContextFilterConfig,
    observer: &dyn FilterObserver,
) -> Result<FirstPassOutcome, ContextFilterError> {
    let building = inventory
        .building(id)
        .ok_or_else(|| ContextFilterError::UnknownBuilding {
            building_id: id.to_string(),
        })?;
    if building.oriented_bounding_box().is_none() {
        return Err(ContextFilterError::MissingBoundingBox {
            building_id: id.to_string(),
        });
    }
    let candidates: Vec<BoundingBoxCandidate> = inventory
        .buildings()
        .map(|b| BoundingBoxCandidate {
            id: &b.id,
            bounding_box: b.oriented_bounding_box(),
        })
        .collect();
    Ok(select_context_buildings(
        building.extruded_footprint(),
        id,
        &candidates,
        config.min_vf_criterion,
        observer,
    ))
}

fn second_pass_for(
    inventory: &BuildingInventory,
    id: &str,
    scene: &SceneMesh,
    config: &ContextFilterConfig,
    observer: &dyn FilterObserver,
) -> Result<SecondPassOutcome, ContextFilterError> {
    let unknown = || ContextFilterError::UnknownBuilding {
        building_id: id.to_string(),
    };
    let building = inventory.building(id).ok_or_else(unknown)?;
    let state = inventory.state(id).ok_or_else(unknown)?;

    let mut candidates = Vec::new();
    for context_id in state.selected_context_building_ids() {
        match inventory.building(context_id) {
            Some(b) => candidates.extend(
                b.outdoor_surfaces()
                    .into_iter()
                    .map(|s| ContextSurface::new(context_id, s)),
            ),
            // Removed since the first pass
            None => observer.notify(FilterEvent::UnknownBuilding {
                building_id: context_id.clone(),
            }),
        }
    }

    let options = SecondPassOptions {
        number_of_rays: config.number_of_rays,
        consider_windows: config.consider_windows,
        no_ray_tracing: config.no_ray_tracing,
        keep_discarded: config.keep_discarded_faces,
    };
    let cache = inventory.shade_constructions();
    let mut outcome = select_shading_surfaces(
        id,
        building.extruded_footprint(),
        &candidates,
        scene,
        &options,
        cache,
        observer,
    )?;
    for forced in state.forced_context_surfaces() {
        outcome.shades.push(cache.to_shade(id, forced, observer)?);
    }
    Ok(outcome)
}

/// Runs `op` in a dedicated pool of `num_threads` workers, or in the global pool.
fn install<T, F>(num_threads: Option<usize>, op: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match num_threads {
        None => Ok(op()),
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            Ok(pool.install(op))
        }
    }
}
