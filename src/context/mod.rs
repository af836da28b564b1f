//! Two-pass selection of the context surfaces that can shade a building.
//!
//! The first pass keeps the buildings whose bounding box has a majorized view
//! factor above a criterion. The second pass ray traces the surfaces of these
//! buildings against the target footprint and turns the visible ones into
//! shades.

pub mod config;
pub mod error;
pub mod export;
pub mod facing;
pub mod first_pass;
pub mod observer;
pub mod rays;
pub mod runner;
pub mod scene;
pub mod second_pass;
pub mod shade;
pub mod state;
pub mod view_factor;
pub mod voxel_grid;

pub use config::ContextFilterConfig;
pub use error::ContextFilterError;
pub use observer::{EventLevel, FilterEvent, FilterObserver, RecordingObserver, TracingObserver};
pub use runner::{RunReport, RunReports, run, run_first_pass, run_second_pass};
pub use scene::{SceneMesh, SceneSourceCounts};
pub use second_pass::ContextSurface;
pub use shade::{Shade, ShadeConstruction, ShadeConstructionCache};
pub use state::ContextFilterState;
