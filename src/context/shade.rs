//! Shades and their shared reflectance constructions.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::UID;
use crate::context::error::{ContextFilterError, Result};
use crate::context::observer::{FilterEvent, FilterObserver};
use crate::context::second_pass::ContextSurface;
use crate::urban::construction::{
    Construction, DEFAULT_SOLAR_REFLECTANCE, DEFAULT_VISIBLE_REFLECTANCE,
};
use crate::urban::surface::Surface;

/// Reflectances are compared after rounding to this many decimals.
pub const REFLECTANCE_DECIMALS: i32 = 3;

/// Apertures are moved this far along their normal before becoming shades,
/// so that they do not overlap their host wall.
pub const APERTURE_OFFSET: f64 = 0.01;

type ReflectanceKey = (i64, i64);

fn is_valid_reflectance(x: f64) -> bool {
    (0.0..=1.0).contains(&x)
}

fn reflectance_key(solar: f64, visible: f64) -> ReflectanceKey {
    let scale = 10f64.powi(REFLECTANCE_DECIMALS);
    ((solar * scale).round() as i64, (visible * scale).round() as i64)
}

/// Opaque construction shared by all shades with the same rounded reflectances.
#[derive(Debug, PartialEq)]
pub struct ShadeConstruction {
    pub uid: UID,
    pub identifier: String,
    pub solar_reflectance: f64,
    pub visible_reflectance: f64,
}

impl ShadeConstruction {
    fn from_key(key: ReflectanceKey) -> Self {
        let scale = 10f64.powi(REFLECTANCE_DECIMALS);
        let solar_reflectance = key.0 as f64 / scale;
        let visible_reflectance = key.1 as f64 / scale;
        Self {
            uid: UID::new(),
            identifier: format!("context_sr{solar_reflectance:.3}_vr{visible_reflectance:.3}"),
            solar_reflectance,
            visible_reflectance,
        }
    }
}

/// Passive surface representing a context surface in downstream simulations.
#[derive(Debug, Clone)]
pub struct Shade {
    pub source_building_id: String,
    pub source_surface: Surface,
    pub construction: Arc<ShadeConstruction>,
    /// True for shades made from windows.
    pub is_specular: bool,
}

impl Shade {
    pub fn new(
        source_building_id: &str,
        source_surface: Surface,
        construction: Arc<ShadeConstruction>,
        is_specular: bool,
    ) -> Self {
        Self {
            source_building_id: source_building_id.to_string(),
            source_surface,
            construction,
            is_specular,
        }
    }

    /// Unique name built from the source building and surface.
    pub fn identifier(&self) -> String {
        format!(
            "{}_{}",
            self.source_building_id, self.source_surface.identifier
        )
    }

    pub fn solar_reflectance(&self) -> f64 {
        self.construction.solar_reflectance
    }

    pub fn visible_reflectance(&self) -> f64 {
        self.construction.visible_reflectance
    }
}

/// Append-only table of shade constructions keyed by rounded reflectances.
///
/// Lookups only take a read lock. A miss takes the write lock and inserts
/// the construction unless another thread did it first.
#[derive(Debug, Default)]
pub struct ShadeConstructionCache {
    constructions: RwLock<HashMap<ReflectanceKey, Arc<ShadeConstruction>>>,
}

impl ShadeConstructionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the construction shared by all surfaces with these reflectances.
    pub fn get_or_insert(&self, solar: f64, visible: f64) -> Arc<ShadeConstruction> {
        let key = reflectance_key(solar, visible);
        {
            let map = self
                .constructions
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(c) = map.get(&key) {
                return Arc::clone(c);
            }
        }
        let mut map = self
            .constructions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            map.entry(key)
                .or_insert_with(|| Arc::new(ShadeConstruction::from_key(key))),
        )
    }

    pub fn len(&self) -> usize {
        self.constructions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts an accepted context surface into a shade.
    ///
    /// Surfaces without construction use the generic context reflectances.
    /// Apertures are moved off their host and become specular shades.
    /// Dynamic glazing is an error attributed to `building_id`, the target.
    /// Reflectances outside [0, 1] are replaced by the generic pair with a warning.
    pub fn to_shade(
        &self,
        building_id: &str,
        candidate: &ContextSurface,
        observer: &dyn FilterObserver,
    ) -> Result<Shade> {
        let surface = &candidate.surface;
        let (solar, visible) = match &surface.construction {
            None => (DEFAULT_SOLAR_REFLECTANCE, DEFAULT_VISIBLE_REFLECTANCE),
            Some(Construction::DynamicWindow { .. }) => {
                return Err(ContextFilterError::DynamicGlazing {
                    building_id: building_id.to_string(),
                    context_building_id: candidate.building_id.clone(),
                    surface_id: surface.identifier.clone(),
                });
            }
            Some(c) => match c.reflectance() {
                Some((s, v)) if is_valid_reflectance(s) && is_valid_reflectance(v) => (s, v),
                _ => {
                    observer.notify(FilterEvent::ReflectanceReplaced {
                        building_id: building_id.to_string(),
                        context_building_id: candidate.building_id.clone(),
                        surface_id: surface.identifier.clone(),
                    });
                    (DEFAULT_SOLAR_REFLECTANCE, DEFAULT_VISIBLE_REFLECTANCE)
                }
            },
        };
        let construction = self.get_or_insert(solar, visible);

        let (source_surface, is_specular) = if surface.is_aperture() {
            (surface.offset_along_normal(APERTURE_OFFSET), true)
        } else {
            (surface.clone(), false)
        };
        Ok(Shade::new(
            &candidate.building_id,
            source_surface,
            construction,
            is_specular,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use crate::context::observer::{EventLevel, RecordingObserver};
    use crate::geom::polygon::Polygon;
    use anyhow::Result;

    fn wall(id: &str, construction: Option<Construction>) -> Result<ContextSurface> {
        let poly = Polygon::new(
            id,
            vec![
                Point::new(0., 0., 0.),
                Point::new(1., 0., 0.),
                Point::new(1., 0., 1.),
                Point::new(0., 0., 1.),
            ],
            None,
        )?;
        let mut s = Surface::wall(id, poly);
        s.construction = construction;
        Ok(ContextSurface::new("ctx", s))
    }

    #[test]
    fn test_rounded_reflectances_share_construction() {
        let cache = ShadeConstructionCache::new();
        let a = cache.get_or_insert(0.2, 0.2);
        let b = cache.get_or_insert(0.2000001, 0.2000001);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.uid, b.uid);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_reflectances() {
        let cache = ShadeConstructionCache::new();
        let a = cache.get_or_insert(0.2, 0.2);
        let b = cache.get_or_insert(0.3, 0.2);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(a.uid, b.uid);
        assert_eq!(cache.len(), 2);
        assert_eq!(b.identifier, "context_sr0.300_vr0.200");
    }

    #[test]
    fn test_default_reflectance() -> Result<()> {
        let cache = ShadeConstructionCache::new();
        let shade = cache.to_shade("target", &wall("w", None)?, &RecordingObserver::new())?;
        assert!((shade.solar_reflectance() - 0.2).abs() < 1e-12);
        assert!((shade.visible_reflectance() - 0.2).abs() < 1e-12);
        assert!(!shade.is_specular);
        assert_eq!(shade.identifier(), "ctx_w");
        Ok(())
    }

    #[test]
    fn test_surfaces_reuse_construction() -> Result<()> {
        let cache = ShadeConstructionCache::new();
        let obs = RecordingObserver::new();
        let s1 = cache.to_shade("t", &wall("w1", Some(Construction::opaque("a", 0.35, 0.4)))?, &obs)?;
        let s2 = cache.to_shade("t", &wall("w2", Some(Construction::opaque("b", 0.35, 0.4)))?, &obs)?;
        assert!(Arc::ptr_eq(&s1.construction, &s2.construction));
        Ok(())
    }

    #[test]
    fn test_window_is_offset_and_specular() -> Result<()> {
        let cache = ShadeConstructionCache::new();
        let mut c = wall("win", Some(Construction::window("g", 0.08, 0.1)))?;
        c.surface.kind = crate::urban::surface::SurfaceKind::Aperture;
        let shade = cache.to_shade("t", &c, &RecordingObserver::new())?;
        assert!(shade.is_specular);
        // Wall vertices are counter-clockwise seen from -y
        assert!(shade.source_surface.centroid().is_close(&Point::new(0.5, -0.01, 0.5)));
        Ok(())
    }

    #[test]
    fn test_dynamic_glazing_is_rejected() -> Result<()> {
        let cache = ShadeConstructionCache::new();
        let c = wall("win", Some(Construction::dynamic_window("ec")))?;
        let err = cache.to_shade("target", &c, &RecordingObserver::new()).unwrap_err();
        assert_eq!(err.building_id(), "target");
        assert!(matches!(err, ContextFilterError::DynamicGlazing { .. }));
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_reflectance_uses_default() -> Result<()> {
        let cache = ShadeConstructionCache::new();
        let obs = RecordingObserver::new();
        let nan = wall("w", Some(Construction::opaque("bad", f64::NAN, 0.3)))?;
        let shade = cache.to_shade("target", &nan, &obs)?;
        assert!((shade.solar_reflectance() - 0.2).abs() < 1e-12);
        assert!((shade.visible_reflectance() - 0.2).abs() < 1e-12);

        let too_high = wall("w2", Some(Construction::window("bad", 0.1, 1.5)))?;
        cache.to_shade("target", &too_high, &obs)?;
        assert_eq!(cache.len(), 1);

        let warnings = obs.events_at_least(EventLevel::Warning);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            &warnings[0],
            FilterEvent::ReflectanceReplaced { building_id, surface_id, .. }
                if building_id == "target" && surface_id == "w"
        ));
        Ok(())
    }

    #[test]
    fn test_concurrent_inserts() {
        use rayon::prelude::*;
        let cache = ShadeConstructionCache::new();
        let uids: Vec<UID> = (0..64)
            .into_par_iter()
            .map(|i| cache.get_or_insert(0.1 * (i % 4) as f64, 0.5).uid.clone())
            .collect();
        assert_eq!(cache.len(), 4);
        assert_eq!(uids[0], uids[4]);
    }
}
