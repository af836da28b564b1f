use serde::{Deserialize, Serialize};

/// Solar reflectance used when a surface has no resolvable construction.
pub const DEFAULT_SOLAR_REFLECTANCE: f64 = 0.2;

/// Visible reflectance used when a surface has no resolvable construction.
pub const DEFAULT_VISIBLE_REFLECTANCE: f64 = 0.2;

/// Construction assigned to an envelope surface or aperture.
///
/// Only the outside reflectances matter for context filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Construction {
    /// Wall, roof or floor construction.
    Opaque {
        identifier: String,
        solar_reflectance: f64,
        visible_reflectance: f64,
    },
    /// Static glazing.
    Window {
        identifier: String,
        solar_reflectance: f64,
        visible_reflectance: f64,
    },
    /// Glazing with time-varying states (electrochromic, shades...).
    ///
    /// Its reflectance cannot be resolved statically.
    DynamicWindow { identifier: String },
}

impl Construction {
    pub fn opaque(identifier: &str, solar_reflectance: f64, visible_reflectance: f64) -> Self {
        Self::Opaque {
            identifier: identifier.to_string(),
            solar_reflectance,
            visible_reflectance,
        }
    }

    pub fn window(identifier: &str, solar_reflectance: f64, visible_reflectance: f64) -> Self {
        Self::Window {
            identifier: identifier.to_string(),
            solar_reflectance,
            visible_reflectance,
        }
    }

    pub fn dynamic_window(identifier: &str) -> Self {
        Self::DynamicWindow {
            identifier: identifier.to_string(),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Self::Opaque { identifier, .. }
            | Self::Window { identifier, .. }
            | Self::DynamicWindow { identifier } => identifier,
        }
    }

    /// Returns `(solar, visible)` reflectance, or `None` for dynamic glazing.
    pub fn reflectance(&self) -> Option<(f64, f64)> {
        match self {
            Self::Opaque {
                solar_reflectance,
                visible_reflectance,
                ..
            }
            | Self::Window {
                solar_reflectance,
                visible_reflectance,
                ..
            } => Some((*solar_reflectance, *visible_reflectance)),
            Self::DynamicWindow { .. } => None,
        }
    }
}
