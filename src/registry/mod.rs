//! Layer registry: owns vector layers (reprojected into the map CRS and
//! spatially indexed at registration) and tiled-imagery layers.

mod projection;
mod spatial;

pub use projection::{normalize_crs, CrsTransform, ProjectionSet};
pub use spatial::{FeatureEntry, FeatureIndex};

use std::collections::HashMap;

use geojson::{Feature, FeatureCollection};
use rayon::prelude::*;

use crate::error::{EngineError, Result};
use crate::geom::{for_each_position, Extent};
use crate::tiles::{
    Capabilities, TileMatrixSet, TiledLayer, TileUrlSource,
};
use crate::units::MapUnit;

/// A registered vector layer: the features as provided, their reprojection
/// into the map CRS and the spatial index over the reprojected geometry.
pub struct VectorLayer {
    pub layer_id: String,
    provided: FeatureCollection,
    data_crs: String,
    pub effective: FeatureCollection,
    index: FeatureIndex,
}

/// Registry of everything the renderer can draw.
pub struct MapRegistry {
    map_crs: String,
    ground_unit: MapUnit,
    projections: ProjectionSet,
    vector: HashMap<String, VectorLayer>,
    tiled: HashMap<String, TiledLayer>,
}

impl MapRegistry {
    pub fn new(map_crs: &str) -> Self {
        let projections = ProjectionSet::new();
        let ground_unit = projections.unit_of(map_crs);
        Self {
            map_crs: map_crs.to_string(),
            ground_unit,
            projections,
            vector: HashMap::new(),
            tiled: HashMap::new(),
        }
    }

    pub fn map_crs(&self) -> &str {
        &self.map_crs
    }

    pub fn ground_unit(&self) -> MapUnit {
        self.ground_unit
    }

    /// Mutable access for registering custom transforms or CRS units.
    pub fn projections_mut(&mut self) -> &mut ProjectionSet {
        &mut self.projections
    }

    /// Register (or replace) a vector layer, reprojecting its features into
    /// the map CRS and indexing them.
    pub fn register_vector_layer(
        &mut self,
        layer_id: &str,
        features: FeatureCollection,
        data_crs: &str,
    ) -> Result<()> {
        log::info!("register vector layer {layer_id} ({} features)", features.features.len());
        let effective = self.reprojected(&features, data_crs)?;
        let index = FeatureIndex::build(&effective.features);
        self.vector.insert(
            layer_id.to_string(),
            VectorLayer {
                layer_id: layer_id.to_string(),
                provided: features,
                data_crs: data_crs.to_string(),
                effective,
                index,
            },
        );
        Ok(())
    }

    fn reprojected(
        &self,
        features: &FeatureCollection,
        data_crs: &str,
    ) -> Result<FeatureCollection> {
        if normalize_crs(data_crs) == normalize_crs(&self.map_crs) {
            return Ok(features.clone());
        }
        let converter = self.projections.converter(data_crs, &self.map_crs)?;
        let converted: Vec<Feature> = features
            .features
            .par_iter()
            .map(|feature| {
                let mut feature = feature.clone();
                if let Some(geometry) = feature.geometry.as_mut() {
                    for_each_position(&mut geometry.value, &mut |p| {
                        let q = converter.forward([p[0], p[1]]);
                        p[0] = q[0];
                        p[1] = q[1];
                    });
                }
                feature
            })
            .collect();
        Ok(FeatureCollection {
            bbox: None,
            features: converted,
            foreign_members: None,
        })
    }

    /// Change the map CRS, re-deriving the ground unit and rebuilding every
    /// vector layer from its provided features.
    pub fn set_map_crs(&mut self, crs: &str) -> Result<()> {
        self.map_crs = crs.to_string();
        self.ground_unit = self.projections.unit_of(crs);
        let ids: Vec<String> = self.vector.keys().cloned().collect();
        for id in ids {
            let (provided, data_crs) = {
                let layer = &self.vector[&id];
                (layer.provided.clone(), layer.data_crs.clone())
            };
            self.register_vector_layer(&id, provided, &data_crs)?;
        }
        Ok(())
    }

    /// Features of a layer whose bounding boxes intersect `extent`. Unknown
    /// layers yield an empty collection.
    pub fn get_features(&self, layer_id: &str, extent: &Extent) -> FeatureCollection {
        let features = match self.vector.get(layer_id) {
            Some(layer) => layer
                .index
                .query(extent)
                .into_iter()
                .map(|i| layer.effective.features[i].clone())
                .collect(),
            None => Vec::new(),
        };
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Register a tiled-imagery layer from a parsed capabilities document.
    ///
    /// Fails when the named layer is missing, when none of its matrix sets
    /// (optionally restricted to `wanted_matrix_set`) match the map CRS, or
    /// when the layer declares no style.
    pub fn register_tiled_layer(
        &mut self,
        layer_id: &str,
        capabilities: &Capabilities,
        wanted_layer_id: &str,
        wanted_matrix_set: Option<&str>,
    ) -> Result<()> {
        let contents = capabilities
            .contents
            .as_ref()
            .ok_or_else(|| EngineError::LayerNotFound(wanted_layer_id.to_string()))?;

        let layer = contents
            .layer
            .iter()
            .find(|l| l.identifier == wanted_layer_id)
            .ok_or_else(|| EngineError::LayerNotFound(wanted_layer_id.to_string()))?;

        let map_crs = normalize_crs(&self.map_crs);
        let mut candidates: Vec<&TileMatrixSet> = contents
            .tile_matrix_set
            .iter()
            .filter(|tms| normalize_crs(&tms.supported_crs) == map_crs)
            .filter(|tms| {
                layer
                    .tile_matrix_set_link
                    .iter()
                    .any(|link| link.tile_matrix_set == tms.identifier)
            })
            .collect();
        if candidates.is_empty() {
            return Err(EngineError::UnsupportedCrs(self.map_crs.clone()));
        }
        if let Some(wanted) = wanted_matrix_set {
            candidates.retain(|tms| tms.identifier == wanted);
            if candidates.is_empty() {
                return Err(EngineError::MatrixSetNotFound(wanted.to_string()));
            }
        }
        let matrix_set = candidates[0].clone();

        let style = layer
            .style
            .iter()
            .find(|s| s.is_default)
            .or_else(|| layer.style.first())
            .ok_or_else(|| EngineError::NoStyle(wanted_layer_id.to_string()))?;

        let url = if let Some(resource) = layer
            .resource_url
            .iter()
            .find(|r| r.resource_type == "tile")
        {
            let mut template = resource.template.clone();
            for dim in &layer.dimension {
                template = template.replace(
                    &format!("{{{}}}", dim.identifier),
                    &dim.default_value,
                );
            }
            TileUrlSource::Template(template)
        } else if let Some(endpoint) = capabilities
            .operations_metadata
            .as_ref()
            .and_then(|ops| ops.get_tile.as_ref())
            .and_then(|op| op.dcp.http.get.first())
        {
            TileUrlSource::Kvp {
                endpoint: endpoint.href.clone(),
                params: vec![
                    ("Service".into(), "WMTS".into()),
                    ("Request".into(), "GetTile".into()),
                    ("Version".into(), "1.0.0".into()),
                    (
                        "Format".into(),
                        layer.format.first().cloned().unwrap_or_default(),
                    ),
                    ("Layer".into(), layer.identifier.clone()),
                    ("Style".into(), style.identifier.clone()),
                    ("TileMatrixSet".into(), matrix_set.identifier.clone()),
                ],
            }
        } else {
            return Err(EngineError::NoTileEndpoint(wanted_layer_id.to_string()));
        };

        log::info!(
            "register tiled layer {layer_id} -> {} via matrix set {}",
            layer.identifier,
            matrix_set.identifier
        );
        self.tiled.insert(
            layer_id.to_string(),
            TiledLayer {
                layer_id: layer_id.to_string(),
                matrix_set,
                url,
            },
        );
        Ok(())
    }

    pub fn get_tiled_layer(&self, layer_id: &str) -> Option<&TiledLayer> {
        self.tiled.get(layer_id)
    }

    /// Remove a layer of either kind; unknown ids are a no-op.
    pub fn delete_layer(&mut self, layer_id: &str) {
        if self.vector.remove(layer_id).is_some() || self.tiled.remove(layer_id).is_some() {
            log::info!("delete layer {layer_id}");
        }
    }
}
