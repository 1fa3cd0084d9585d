//! Fill variants.

use serde::{Deserialize, Serialize};

use crate::units::Uom;

use super::stroke::Stroke;

/// How the interior of an area (or a synthesized stroke ribbon) is painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Fill {
    SolidFill(SolidFill),
    /// Accepted in style documents but not rendered yet; drawing it is a
    /// logged no-op so styles using it keep their other symbolizers.
    HatchedFill(HatchedFill),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolidFill {
    pub color: String,
    /// 0 to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
}

impl Default for SolidFill {
    fn default() -> Self {
        Self {
            color: "#aaaaaa".to_string(),
            opacity: Some(1.0),
            uom: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HatchedFill {
    pub stroke: Box<Stroke>,
    pub angle: f64,
    pub distance: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
}

impl Fill {
    /// Solid black, the fallback fill for strokes and labels.
    pub fn black() -> Self {
        Fill::SolidFill(SolidFill {
            color: "#000000".to_string(),
            opacity: Some(1.0),
            uom: None,
        })
    }
}
