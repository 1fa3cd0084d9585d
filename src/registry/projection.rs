//! Coordinate reprojection with a pluggable transform provider.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::units::MapUnit;

/// A coordinate transform between two coordinate reference systems.
pub trait CrsTransform: Send + Sync {
    fn forward(&self, p: [f64; 2]) -> [f64; 2];
    fn inverse(&self, p: [f64; 2]) -> [f64; 2];
}

struct Identity;

impl CrsTransform for Identity {
    fn forward(&self, p: [f64; 2]) -> [f64; 2] {
        p
    }
    fn inverse(&self, p: [f64; 2]) -> [f64; 2] {
        p
    }
}

const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Spherical Web Mercator: lon/lat degrees to EPSG:3857 meters.
struct LonLatToMercator;

impl CrsTransform for LonLatToMercator {
    fn forward(&self, p: [f64; 2]) -> [f64; 2] {
        let x = p[0].to_radians() * EARTH_RADIUS_M;
        let lat = p[1].to_radians();
        let y = (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln() * EARTH_RADIUS_M;
        [x, y]
    }

    fn inverse(&self, p: [f64; 2]) -> [f64; 2] {
        let lon = (p[0] / EARTH_RADIUS_M).to_degrees();
        let lat = (2.0 * (p[1] / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
            .to_degrees();
        [lon, lat]
    }
}

/// A registered transform viewed in the opposite direction.
struct Reversed(Arc<dyn CrsTransform>);

impl CrsTransform for Reversed {
    fn forward(&self, p: [f64; 2]) -> [f64; 2] {
        self.0.inverse(p)
    }
    fn inverse(&self, p: [f64; 2]) -> [f64; 2] {
        self.0.forward(p)
    }
}

/// Normalize a CRS identifier to `AUTHORITY:CODE`.
///
/// Accepts bare codes (`EPSG:2056`) and OGC URN forms
/// (`urn:ogc:def:crs:EPSG::2056`, `urn:ogc:def:crs:EPSG:8.9:2056`).
pub fn normalize_crs(crs: &str) -> String {
    let trimmed = crs.trim();
    if let Some(rest) = trimmed.strip_prefix("urn:ogc:def:crs:") {
        let parts: Vec<&str> = rest.split(':').collect();
        if let (Some(authority), Some(code)) = (parts.first(), parts.last()) {
            if !authority.is_empty() && !code.is_empty() {
                return format!("{}:{}", authority.to_uppercase(), code);
            }
        }
    }
    trimmed.to_uppercase()
}

/// Transform provider: built-in lon/lat to Web Mercator plus any transforms
/// the host registers for other CRS pairs.
pub struct ProjectionSet {
    transforms: HashMap<(String, String), Arc<dyn CrsTransform>>,
    units: HashMap<String, MapUnit>,
}

impl Default for ProjectionSet {
    fn default() -> Self {
        let mut set = Self {
            transforms: HashMap::new(),
            units: HashMap::new(),
        };
        set.register_transform("EPSG:4326", "EPSG:3857", Arc::new(LonLatToMercator));
        set.register_unit("EPSG:4326", MapUnit::Degree);
        set.register_unit("CRS:84", MapUnit::Degree);
        set.register_unit("EPSG:3857", MapUnit::M);
        set
    }
}

impl ProjectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform for a CRS pair; the reverse direction is derived.
    pub fn register_transform(
        &mut self,
        from: &str,
        to: &str,
        transform: Arc<dyn CrsTransform>,
    ) {
        let from = normalize_crs(from);
        let to = normalize_crs(to);
        self.transforms
            .insert((to.clone(), from.clone()), Arc::new(Reversed(transform.clone())));
        self.transforms.insert((from, to), transform);
    }

    pub fn register_unit(&mut self, crs: &str, unit: MapUnit) {
        self.units.insert(normalize_crs(crs), unit);
    }

    /// Ground unit of a CRS; meters when the CRS is unknown.
    pub fn unit_of(&self, crs: &str) -> MapUnit {
        self.units
            .get(&normalize_crs(crs))
            .copied()
            .unwrap_or(MapUnit::M)
    }

    /// Transform from one CRS to another. Equal (normalized) codes yield the
    /// identity; unknown pairs fail.
    pub fn converter(&self, from: &str, to: &str) -> Result<Arc<dyn CrsTransform>> {
        let from_n = normalize_crs(from);
        let to_n = normalize_crs(to);
        if from_n == to_n {
            return Ok(Arc::new(Identity));
        }
        self.transforms
            .get(&(from_n, to_n))
            .cloned()
            .ok_or_else(|| EngineError::ProjectionNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_crs() {
        assert_eq!(normalize_crs("EPSG:2056"), "EPSG:2056");
        assert_eq!(normalize_crs("epsg:2056"), "EPSG:2056");
        assert_eq!(normalize_crs("urn:ogc:def:crs:EPSG::2056"), "EPSG:2056");
        assert_eq!(normalize_crs("urn:ogc:def:crs:EPSG:8.9:2056"), "EPSG:2056");
    }

    #[test]
    fn test_identity_for_equal_codes() {
        let set = ProjectionSet::new();
        let t = set.converter("EPSG:2056", "urn:ogc:def:crs:EPSG::2056").unwrap();
        assert_eq!(t.forward([2600000.0, 1200000.0]), [2600000.0, 1200000.0]);
    }

    #[test]
    fn test_mercator_round_trip() {
        let set = ProjectionSet::new();
        let t = set.converter("EPSG:4326", "EPSG:3857").unwrap();
        for p in [[0.0, 0.0], [7.44, 46.95], [-122.4, 37.8], [179.0, -85.0]] {
            let projected = t.forward(p);
            let back = t.inverse(projected);
            assert!((back[0] - p[0]).abs() < 1e-9, "lon {p:?} -> {back:?}");
            assert!((back[1] - p[1]).abs() < 1e-9, "lat {p:?} -> {back:?}");
        }
        // Known anchor: 180 degrees is half the mercator world width
        let edge = t.forward([180.0, 0.0]);
        assert!((edge[0] - 20_037_508.342_789_244).abs() < 1e-3);
    }

    #[test]
    fn test_reverse_direction_is_derived() {
        let set = ProjectionSet::new();
        let t = set.converter("EPSG:3857", "EPSG:4326").unwrap();
        let lonlat = t.forward([0.0, 0.0]);
        assert!(lonlat[0].abs() < 1e-9 && lonlat[1].abs() < 1e-9);
    }

    #[test]
    fn test_unknown_pair_fails() {
        let set = ProjectionSet::new();
        assert!(matches!(
            set.converter("EPSG:4326", "EPSG:2056"),
            Err(EngineError::ProjectionNotFound { .. })
        ));
    }

    #[test]
    fn test_unit_lookup() {
        let set = ProjectionSet::new();
        assert_eq!(set.unit_of("EPSG:4326"), MapUnit::Degree);
        assert_eq!(set.unit_of("urn:ogc:def:crs:EPSG::3857"), MapUnit::M);
        // Unknown CRS defaults to meters
        assert_eq!(set.unit_of("EPSG:99999"), MapUnit::M);
    }
}
