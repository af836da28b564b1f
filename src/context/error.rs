use thiserror::Error;

/// Errors that stop the filtering of one building.
///
/// They never abort a whole run: the runner reports them and moves on to the
/// next building.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextFilterError {
    #[error("Building {building_id} has no oriented bounding box")]
    MissingBoundingBox { building_id: String },

    #[error("Building {building_id} is not modeled and cannot be a filtering target")]
    NotModeled { building_id: String },

    #[error(
        "Building {building_id}: aperture {surface_id} of building {context_building_id} has a dynamic glazing construction"
    )]
    DynamicGlazing {
        building_id: String,
        context_building_id: String,
        surface_id: String,
    },

    #[error("Building {building_id}: second pass requested before the first pass")]
    FirstPassNotDone { building_id: String },

    #[error("Building {building_id} is not in the inventory")]
    UnknownBuilding { building_id: String },
}

impl ContextFilterError {
    /// Id of the building whose filtering failed.
    pub fn building_id(&self) -> &str {
        match self {
            Self::MissingBoundingBox { building_id }
            | Self::NotModeled { building_id }
            | Self::DynamicGlazing { building_id, .. }
            | Self::FirstPassNotDone { building_id }
            | Self::UnknownBuilding { building_id } => building_id,
        }
    }
}

/// Result type for context filtering operations
pub type Result<T> = std::result::Result<T, ContextFilterError>;
