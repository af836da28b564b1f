//! Second pass: surface level occlusion test.
//!
//! Every outdoor surface of the buildings kept by the first pass is tested
//! against each target footprint face it faces. A surface is kept as soon as
//! one ray reaches the target without hitting the scene mesh.

use std::time::Instant;

use crate::context::error::{ContextFilterError, Result};
use crate::context::facing::are_facing;
use crate::context::observer::{FilterEvent, FilterObserver};
use crate::context::rays::generate_rays;
use crate::context::scene::SceneMesh;
use crate::context::shade::{Shade, ShadeConstructionCache};
use crate::geom::polyface::Polyface;
use crate::geom::polygon::Polygon;
use crate::urban::construction::Construction;
use crate::urban::surface::Surface;

/// Ray counts accepted when ray tracing is enabled.
pub const VALID_NUMBER_OF_RAYS: [usize; 4] = [1, 3, 6, 9];

/// Replacement for an invalid ray count.
pub const DEFAULT_NUMBER_OF_RAYS: usize = 3;

/// Surface of a context building, tagged with the building it belongs to.
#[derive(Debug, Clone)]
pub struct ContextSurface {
    pub building_id: String,
    pub surface: Surface,
}

impl ContextSurface {
    pub fn new(building_id: &str, surface: Surface) -> Self {
        Self {
            building_id: building_id.to_string(),
            surface,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondPassOptions {
    pub number_of_rays: usize,
    pub consider_windows: bool,
    pub no_ray_tracing: bool,
    pub keep_discarded: bool,
}

impl Default for SecondPassOptions {
    fn default() -> Self {
        Self {
            number_of_rays: DEFAULT_NUMBER_OF_RAYS,
            consider_windows: false,
            no_ray_tracing: false,
            keep_discarded: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecondPassOutcome {
    /// Ray count actually used, after validation.
    pub number_of_rays: usize,
    pub shades: Vec<Shade>,
    /// Rejected surfaces, only with `keep_discarded`.
    pub discarded: Option<Vec<ContextSurface>>,
    /// Wall-clock duration in seconds.
    pub duration: f64,
}

/// Checks the ray count and replaces an invalid one with [`DEFAULT_NUMBER_OF_RAYS`].
///
/// 0 is only valid without ray tracing.
pub fn validate_number_of_rays(
    number_of_rays: usize,
    no_ray_tracing: bool,
    building_id: &str,
    observer: &dyn FilterObserver,
) -> usize {
    let valid = VALID_NUMBER_OF_RAYS.contains(&number_of_rays)
        || (number_of_rays == 0 && no_ray_tracing);
    if valid {
        return number_of_rays;
    }
    observer.notify(FilterEvent::NumberOfRaysReplaced {
        building_id: building_id.to_string(),
        given: number_of_rays,
        replacement: DEFAULT_NUMBER_OF_RAYS,
    });
    DEFAULT_NUMBER_OF_RAYS
}

/// Selects the context surfaces that can shade or reflect onto the target.
///
/// `candidates` are the surfaces of the buildings selected by the first pass.
/// Surfaces that are not outdoors are ignored. With `consider_windows`, the
/// outdoor apertures of each candidate are tested as independent surfaces.
/// Accepted surfaces become shades through `cache`.
pub fn select_shading_surfaces(
    target_id: &str,
    target_footprint: &Polyface,
    candidates: &[ContextSurface],
    scene: &SceneMesh,
    options: &SecondPassOptions,
    cache: &ShadeConstructionCache,
    observer: &dyn FilterObserver,
) -> Result<SecondPassOutcome> {
    let t0 = Instant::now();

    let number_of_rays = validate_number_of_rays(
        options.number_of_rays,
        options.no_ray_tracing,
        target_id,
        observer,
    );
    if options.no_ray_tracing && options.keep_discarded {
        observer.notify(FilterEvent::OptionIgnored {
            building_id: target_id.to_string(),
            option: "keep_discarded_faces",
            reason: "no surface is discarded without ray tracing",
        });
    }

    let mut shades = Vec::new();
    let mut discarded = Vec::new();

    for candidate in candidates {
        if !candidate.surface.is_outdoors() {
            continue;
        }
        let mut tested = vec![candidate.clone()];
        if options.consider_windows {
            for ap in candidate.surface.apertures() {
                if !ap.is_outdoors() {
                    continue;
                }
                if matches!(ap.construction, Some(Construction::DynamicWindow { .. })) {
                    return Err(ContextFilterError::DynamicGlazing {
                        building_id: target_id.to_string(),
                        context_building_id: candidate.building_id.clone(),
                        surface_id: ap.identifier.clone(),
                    });
                }
                tested.push(ContextSurface::new(&candidate.building_id, ap.clone()));
            }
        }

        for c in tested {
            let accepted = options.no_ray_tracing
                || is_surface_unobstructed(
                    c.surface.geometry(),
                    target_footprint,
                    scene,
                    number_of_rays,
                );
            if accepted {
                shades.push(cache.to_shade(target_id, &c, observer)?);
            } else if options.keep_discarded {
                discarded.push(c);
            }
        }
    }

    Ok(SecondPassOutcome {
        number_of_rays,
        shades,
        discarded: options.keep_discarded.then_some(discarded),
        duration: t0.elapsed().as_secs_f64(),
    })
}

/// True if at least one ray from `surface` reaches a facing target face unobstructed.
///
/// Target faces not facing `surface` are skipped. A surface facing no target
/// face at all is obstructed.
pub fn is_surface_unobstructed(
    surface: &Polygon,
    target_footprint: &Polyface,
    scene: &SceneMesh,
    number_of_rays: usize,
) -> bool {
    target_footprint
        .faces()
        .iter()
        .filter(|face| are_facing(face, surface))
        .any(|face| {
            generate_rays(surface, face, true, number_of_rays)
                .iter()
                .any(|ray| !scene.ray_intersects(ray.start, ray.end))
        })
}
