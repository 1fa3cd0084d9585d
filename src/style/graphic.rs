//! Point graphics: well-known mark shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::units::Uom;

use super::fill::Fill;
use super::parameter::{ParameterValue, PropertyValue};
use super::stroke::Stroke;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellKnownName {
    Circle,
    Square,
    Triangle,
}

impl PropertyValue for WellKnownName {
    fn from_property(value: &JsonValue) -> Option<Self> {
        match value.as_str()? {
            "circle" => Some(WellKnownName::Circle),
            "square" => Some(WellKnownName::Square),
            "triangle" => Some(WellKnownName::Triangle),
            _ => None,
        }
    }
}

/// Which point of the mark's bounding box lands on the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorPosition {
    #[default]
    Center,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GraphicSize {
    /// Isotropic size; triangles stretch their height by sqrt(3).
    Size(SizeSpec),
    /// Explicit width and height.
    ViewBox(ViewBox),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeSpec {
    pub size: ParameterValue<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewBox {
    pub width: ParameterValue<f64>,
    pub height: ParameterValue<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
}

/// Background glow behind a mark or label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Halo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<ParameterValue<f64>>,
    pub fill: Fill,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Graphic {
    MarkGraphic(MarkGraphic),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkGraphic {
    pub well_known_name: ParameterValue<WellKnownName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<GraphicSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Box<Stroke>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo: Option<Halo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_position: Option<AnchorPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
}
