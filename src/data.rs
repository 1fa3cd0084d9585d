//! Loading of GeoJSON feature collections, style documents and tiled-service
//! capabilities from JSON bytes or files.

use std::fs;
use std::path::Path;

use geojson::FeatureCollection;

use crate::error::{EngineError, Result};
use crate::style::Style;
use crate::tiles::Capabilities;

fn from_slice<T: serde::de::DeserializeOwned>(bytes: &mut [u8]) -> Result<T> {
    simd_json::serde::from_slice(bytes).map_err(|e| EngineError::Parse(e.to_string()))
}

/// Parse a GeoJSON feature collection. The buffer is mutated in place by the
/// parser.
pub fn features_from_slice(bytes: &mut [u8]) -> Result<FeatureCollection> {
    from_slice(bytes)
}

pub fn features_from_file(path: &Path) -> Result<FeatureCollection> {
    let mut bytes = fs::read(path)?;
    features_from_slice(&mut bytes)
}

/// Parse a style document.
pub fn style_from_slice(bytes: &mut [u8]) -> Result<Style> {
    from_slice(bytes)
}

pub fn style_from_file(path: &Path) -> Result<Style> {
    let mut bytes = fs::read(path)?;
    style_from_slice(&mut bytes)
}

/// Parse an already-fetched capabilities document.
pub fn capabilities_from_slice(bytes: &mut [u8]) -> Result<Capabilities> {
    from_slice(bytes)
}

pub fn capabilities_from_file(path: &Path) -> Result<Capabilities> {
    let mut bytes = fs::read(path)?;
    capabilities_from_slice(&mut bytes)
}
