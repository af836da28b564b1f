//! First pass: building level pre-selection.
//!
//! A candidate building is kept when the majorized view factor between one of
//! the target footprint faces and one of the lateral faces of its oriented
//! bounding box exceeds the criterion.

use std::collections::BTreeSet;
use std::time::Instant;

use crate::context::observer::{FilterEvent, FilterObserver};
use crate::context::view_factor::majorized_view_factor;
use crate::geom::obb::OrientedBoundingBox;
use crate::geom::polyface::Polyface;

/// Replacement for a criterion outside of (0, 1).
pub const DEFAULT_MIN_VF_CRITERION: f64 = 0.01;

/// Candidate building for the first pass: id and bounding box, if computed.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBoxCandidate<'a> {
    pub id: &'a str,
    pub bounding_box: Option<&'a OrientedBoundingBox>,
}

/// Checks the criterion and replaces an invalid one with [`DEFAULT_MIN_VF_CRITERION`].
pub fn validate_min_vf_criterion(
    min_vf_criterion: f64,
    building_id: &str,
    observer: &dyn FilterObserver,
) -> f64 {
    if min_vf_criterion > 0. && min_vf_criterion < 1. {
        return min_vf_criterion;
    }
    observer.notify(FilterEvent::CriterionReplaced {
        building_id: building_id.to_string(),
        given: min_vf_criterion,
        replacement: DEFAULT_MIN_VF_CRITERION,
    });
    DEFAULT_MIN_VF_CRITERION
}

/// Result of the first pass for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstPassOutcome {
    /// Criterion actually used, after validation.
    pub min_vf_criterion: f64,
    pub selected: BTreeSet<String>,
    /// Wall-clock duration in seconds.
    pub duration: f64,
}

/// Selects the candidate buildings that can matter for the target.
///
/// The target itself is never selected. Candidates without bounding box are
/// skipped with a warning.
pub fn select_context_buildings(
    target_footprint: &Polyface,
    target_id: &str,
    candidates: &[BoundingBoxCandidate],
    min_vf_criterion: f64,
    observer: &dyn FilterObserver,
) -> FirstPassOutcome {
    let t0 = Instant::now();
    let min_vf_criterion = validate_min_vf_criterion(min_vf_criterion, target_id, observer);

    let mut selected = BTreeSet::new();
    for candidate in candidates {
        if candidate.id == target_id || selected.contains(candidate.id) {
            continue;
        }
        let Some(obb) = candidate.bounding_box else {
            observer.notify(FilterEvent::CandidateWithoutBoundingBox {
                building_id: target_id.to_string(),
                candidate_id: candidate.id.to_string(),
            });
            continue;
        };
        if is_bounding_box_visible(target_footprint, obb, min_vf_criterion) {
            selected.insert(candidate.id.to_string());
        }
    }

    FirstPassOutcome {
        min_vf_criterion,
        selected,
        duration: t0.elapsed().as_secs_f64(),
    }
}

/// True as soon as one (target face, lateral box face) pair exceeds `min_vf_criterion`.
pub fn is_bounding_box_visible(
    target_footprint: &Polyface,
    obb: &OrientedBoundingBox,
    min_vf_criterion: f64,
) -> bool {
    obb.lateral_faces().any(|box_face| {
        target_footprint.faces().iter().any(|face| {
            majorized_view_factor(
                face.centroid(),
                face.area(),
                box_face.centroid(),
                box_face.area(),
            ) > min_vf_criterion
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use crate::context::observer::{EventLevel, RecordingObserver};
    use anyhow::Result;

    fn obb_at(x: f64, y: f64) -> Result<OrientedBoundingBox> {
        OrientedBoundingBox::from_dimensions(Point::new(x, y, 0.), 0., 10., 10., 10.)
    }

    fn footprint() -> Result<Polyface> {
        Polyface::from_box(10., 10., 10., None, "target")
    }

    #[test]
    fn test_near_selected_far_rejected() -> Result<()> {
        let obs = RecordingObserver::new();
        let near = obb_at(20., 0.)?;
        let far = obb_at(500., 0.)?;
        let own = obb_at(0., 0.)?;
        let candidates = [
            BoundingBoxCandidate {
                id: "target",
                bounding_box: Some(&own),
            },
            BoundingBoxCandidate {
                id: "near",
                bounding_box: Some(&near),
            },
            BoundingBoxCandidate {
                id: "far",
                bounding_box: Some(&far),
            },
        ];
        let out = select_context_buildings(&footprint()?, "target", &candidates, 0.01, &obs);
        assert_eq!(out.selected.into_iter().collect::<Vec<_>>(), vec!["near"]);
        assert!(obs.events().is_empty());
        Ok(())
    }

    #[test]
    fn test_tiny_criterion_selects_nearly_everything() -> Result<()> {
        let obs = RecordingObserver::new();
        let boxes: Vec<OrientedBoundingBox> = (1..=10)
            .map(|i| obb_at(i as f64 * 30., 0.))
            .collect::<Result<_>>()?;
        let ids: Vec<String> = (1..=10).map(|i| format!("b{i}")).collect();
        let candidates: Vec<BoundingBoxCandidate> = ids
            .iter()
            .zip(boxes.iter())
            .map(|(id, obb)| BoundingBoxCandidate {
                id,
                bounding_box: Some(obb),
            })
            .collect();
        let strict = select_context_buildings(&footprint()?, "t", &candidates, 0.01, &obs);
        let loose = select_context_buildings(&footprint()?, "t", &candidates, 0.00001, &obs);
        assert!(strict.selected.len() < 10);
        assert_eq!(loose.selected.len(), 10);
        Ok(())
    }

    #[test]
    fn test_duplicate_candidates_selected_once() -> Result<()> {
        let obs = RecordingObserver::new();
        let near = obb_at(20., 0.)?;
        let c = BoundingBoxCandidate {
            id: "near",
            bounding_box: Some(&near),
        };
        let out = select_context_buildings(&footprint()?, "t", &[c, c], 0.01, &obs);
        assert_eq!(out.selected.len(), 1);
        Ok(())
    }

    #[test]
    fn test_invalid_criterion_is_replaced() -> Result<()> {
        let obs = RecordingObserver::new();
        let out = select_context_buildings(&footprint()?, "t", &[], 1.5, &obs);
        assert!((out.min_vf_criterion - DEFAULT_MIN_VF_CRITERION).abs() < 1e-12);
        let out = select_context_buildings(&footprint()?, "t", &[], 0., &obs);
        assert!((out.min_vf_criterion - DEFAULT_MIN_VF_CRITERION).abs() < 1e-12);
        assert_eq!(obs.events_at_least(EventLevel::Warning).len(), 2);
        Ok(())
    }

    #[test]
    fn test_candidate_without_bounding_box() -> Result<()> {
        let obs = RecordingObserver::new();
        let c = BoundingBoxCandidate {
            id: "nobox",
            bounding_box: None,
        };
        let out = select_context_buildings(&footprint()?, "t", &[c], 0.01, &obs);
        assert!(out.selected.is_empty());
        assert_eq!(
            obs.events(),
            vec![FilterEvent::CandidateWithoutBoundingBox {
                building_id: "t".to_string(),
                candidate_id: "nobox".to_string(),
            }]
        );
        Ok(())
    }

    #[test]
    fn test_horizontal_box_faces_are_ignored() -> Result<()> {
        // Flat slab right above the target: only its thin sides count
        let slab = OrientedBoundingBox::from_dimensions(Point::new(-50., -50., 30.), 0., 110., 110., 0.01)?;
        assert!(!is_bounding_box_visible(&footprint()?, &slab, 0.01));
        Ok(())
    }
}
