//! Typed tiled-imagery capabilities, as produced by an external
//! capabilities-document parser, plus the per-layer tile URL builder.

use serde::{Deserialize, Serialize};

/// One zoom level's tiling grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TileMatrix {
    pub identifier: String,
    pub scale_denominator: f64,
    pub top_left_corner: [f64; 2],
    pub tile_width: u32,
    pub tile_height: u32,
    pub matrix_width: u64,
    pub matrix_height: u64,
}

/// Ordered collection of tile matrices, coarsest first by convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TileMatrixSet {
    pub identifier: String,
    #[serde(rename = "SupportedCRS")]
    pub supported_crs: String,
    #[serde(default)]
    pub tile_matrix: Vec<TileMatrix>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TileMatrixSetLink {
    pub tile_matrix_set: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleEntry {
    #[serde(rename = "Identifier")]
    pub identifier: String,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(rename = "Identifier")]
    pub identifier: String,
    #[serde(rename = "Default")]
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUrl {
    pub template: String,
    #[serde(rename = "resourceType")]
    pub resource_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapabilitiesLayer {
    pub identifier: String,
    #[serde(default)]
    pub tile_matrix_set_link: Vec<TileMatrixSetLink>,
    #[serde(default)]
    pub style: Vec<StyleEntry>,
    #[serde(default)]
    pub format: Vec<String>,
    #[serde(default)]
    pub dimension: Vec<Dimension>,
    #[serde(rename = "ResourceURL", default)]
    pub resource_url: Vec<ResourceUrl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contents {
    #[serde(default)]
    pub tile_matrix_set: Vec<TileMatrixSet>,
    #[serde(default)]
    pub layer: Vec<CapabilitiesLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetEndpoint {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpDcp {
    #[serde(rename = "Get", default)]
    pub get: Vec<GetEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dcp {
    #[serde(rename = "HTTP")]
    pub http: HttpDcp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationMetadata {
    #[serde(rename = "DCP")]
    pub dcp: Dcp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OperationsMetadata {
    #[serde(default)]
    pub get_tile: Option<OperationMetadata>,
}

/// Parsed capabilities of a tiled-imagery service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Capabilities {
    #[serde(default)]
    pub contents: Option<Contents>,
    #[serde(default)]
    pub operations_metadata: Option<OperationsMetadata>,
}

/// How tile URLs are produced for a registered layer.
#[derive(Debug, Clone)]
pub(crate) enum TileUrlSource {
    /// RESTful template with `{TileMatrix}`/`{TileCol}`/`{TileRow}`
    /// placeholders (dimension defaults already substituted).
    Template(String),
    /// Key-value GetTile endpoint.
    Kvp {
        endpoint: String,
        params: Vec<(String, String)>,
    },
}

/// A registered tiled-imagery layer: immutable after registration.
#[derive(Debug, Clone)]
pub struct TiledLayer {
    pub layer_id: String,
    pub matrix_set: TileMatrixSet,
    pub(crate) url: TileUrlSource,
}

impl TiledLayer {
    /// URL of one tile in the layer's matrix set.
    pub fn tile_url(&self, matrix_id: &str, col: u64, row: u64) -> String {
        match &self.url {
            TileUrlSource::Template(template) => template
                .replace("{TileMatrix}", matrix_id)
                .replace("{TileCol}", &col.to_string())
                .replace("{TileRow}", &row.to_string()),
            TileUrlSource::Kvp { endpoint, params } => {
                let mut url = String::from(endpoint.as_str());
                if !url.ends_with('?') {
                    url.push('?');
                }
                for (i, (key, value)) in params.iter().enumerate() {
                    if i > 0 {
                        url.push('&');
                    }
                    url.push_str(key);
                    url.push('=');
                    url.push_str(value);
                }
                url.push_str(&format!(
                    "&TileMatrix={matrix_id}&TileRow={row}&TileCol={col}"
                ));
                url
            }
        }
    }
}
