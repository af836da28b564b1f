//! Observer interface for filter diagnostics.
//!
//! Filters do not log through a global logger. Each call receives a
//! [`FilterObserver`] which gets typed events; [`TracingObserver`] forwards
//! them to `tracing`, [`RecordingObserver`] keeps them for inspection.

use std::fmt;
use std::sync::Mutex;

use crate::context::scene::SceneSourceCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterEvent {
    /// `min_vf_criterion` outside of (0, 1).
    CriterionReplaced {
        building_id: String,
        given: f64,
        replacement: f64,
    },
    /// `number_of_rays` not in {0, 1, 3, 6, 9} (0 only without ray tracing).
    NumberOfRaysReplaced {
        building_id: String,
        given: usize,
        replacement: usize,
    },
    /// An option has no effect with the other options given.
    OptionIgnored {
        building_id: String,
        option: &'static str,
        reason: &'static str,
    },
    /// A candidate without bounding box cannot be tested by the first pass.
    CandidateWithoutBoundingBox {
        building_id: String,
        candidate_id: String,
    },
    /// Reflectance outside [0, 1] or NaN, replaced by the generic context pair.
    ReflectanceReplaced {
        building_id: String,
        context_building_id: String,
        surface_id: String,
    },
    /// Building id that is not (or no longer) in the inventory.
    UnknownBuilding { building_id: String },
    FirstPassSkipped { building_id: String },
    FirstPassDone {
        building_id: String,
        num_selected: usize,
        duration: f64,
    },
    SecondPassSkipped { building_id: String },
    SecondPassDone {
        building_id: String,
        num_shades: usize,
        num_discarded: usize,
        duration: f64,
    },
    SceneMeshBuilt {
        num_buildings: usize,
        sources: SceneSourceCounts,
        num_triangles: usize,
        duration: f64,
    },
    BuildingFailed { building_id: String, message: String },
}

impl FilterEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            Self::CriterionReplaced { .. }
            | Self::NumberOfRaysReplaced { .. }
            | Self::OptionIgnored { .. }
            | Self::CandidateWithoutBoundingBox { .. }
            | Self::ReflectanceReplaced { .. }
            | Self::UnknownBuilding { .. } => EventLevel::Warning,
            Self::BuildingFailed { .. } => EventLevel::Error,
            Self::FirstPassSkipped { .. }
            | Self::FirstPassDone { .. }
            | Self::SecondPassSkipped { .. }
            | Self::SecondPassDone { .. }
            | Self::SceneMeshBuilt { .. } => EventLevel::Info,
        }
    }

    /// Building the event refers to, if any.
    pub fn building_id(&self) -> Option<&str> {
        match self {
            Self::CriterionReplaced { building_id, .. }
            | Self::NumberOfRaysReplaced { building_id, .. }
            | Self::OptionIgnored { building_id, .. }
            | Self::CandidateWithoutBoundingBox { building_id, .. }
            | Self::ReflectanceReplaced { building_id, .. }
            | Self::UnknownBuilding { building_id }
            | Self::FirstPassSkipped { building_id }
            | Self::FirstPassDone { building_id, .. }
            | Self::SecondPassSkipped { building_id }
            | Self::SecondPassDone { building_id, .. }
            | Self::BuildingFailed { building_id, .. } => Some(building_id),
            Self::SceneMeshBuilt { .. } => None,
        }
    }
}

impl fmt::Display for FilterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CriterionReplaced {
                given, replacement, ..
            } => write!(
                f,
                "min_vf_criterion {given} is not in (0, 1), using {replacement}"
            ),
            Self::NumberOfRaysReplaced {
                given, replacement, ..
            } => write!(
                f,
                "number_of_rays {given} is not supported, using {replacement}"
            ),
            Self::OptionIgnored { option, reason, .. } => {
                write!(f, "option {option} is ignored: {reason}")
            }
            Self::CandidateWithoutBoundingBox { candidate_id, .. } => write!(
                f,
                "candidate {candidate_id} has no oriented bounding box and is skipped"
            ),
            Self::ReflectanceReplaced {
                context_building_id,
                surface_id,
                ..
            } => write!(
                f,
                "surface {surface_id} of {context_building_id} has an invalid reflectance, using the generic context construction"
            ),
            Self::UnknownBuilding { .. } => write!(f, "building is not in the inventory"),
            Self::FirstPassSkipped { .. } => {
                write!(f, "first pass already done, keeping previous results")
            }
            Self::FirstPassDone {
                num_selected,
                duration,
                ..
            } => write!(
                f,
                "first pass selected {num_selected} buildings in {duration:.3} s"
            ),
            Self::SecondPassSkipped { .. } => {
                write!(f, "second pass already done, keeping previous results")
            }
            Self::SecondPassDone {
                num_shades,
                num_discarded,
                duration,
                ..
            } => write!(
                f,
                "second pass kept {num_shades} surfaces, discarded {num_discarded} in {duration:.3} s"
            ),
            Self::SceneMeshBuilt {
                num_buildings,
                sources,
                num_triangles,
                duration,
            } => write!(
                f,
                "scene mesh built from {num_buildings} buildings ({} merged facades, {} room sets, {} footprints, {num_triangles} triangles) in {duration:.3} s",
                sources.merged_facade, sources.rooms, sources.extruded_footprint
            ),
            Self::BuildingFailed { message, .. } => write!(f, "{message}"),
        }
    }
}

/// Receiver of filter diagnostics. Must be shareable across worker threads.
pub trait FilterObserver: Send + Sync {
    fn notify(&self, event: FilterEvent);
}

/// Forwards events to the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FilterObserver for TracingObserver {
    fn notify(&self, event: FilterEvent) {
        let building = event.building_id().unwrap_or("-");
        match event.level() {
            EventLevel::Info => tracing::info!(building, "{event}"),
            EventLevel::Warning => tracing::warn!(building, "{event}"),
            EventLevel::Error => tracing::error!(building, "{event}"),
        }
    }
}

/// Keeps all events in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<FilterEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events received so far.
    pub fn events(&self) -> Vec<FilterEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events at or above `level`.
    pub fn events_at_least(&self, level: EventLevel) -> Vec<FilterEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level() >= level)
            .collect()
    }
}

impl FilterObserver for RecordingObserver {
    fn notify(&self, event: FilterEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
