//! Stroke variants: continuous pen strokes and repeated graphic strokes.

use serde::{Deserialize, Serialize};

use crate::units::Uom;

use super::fill::Fill;
use super::graphic::Graphic;
use super::parameter::ParameterValue;

pub const DEFAULT_WIDTH_PX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Orientation of graphics stamped along a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelativeOrientation {
    /// Keep the graphic's own orientation, ignoring the line.
    #[default]
    Portrayal,
    /// Perpendicular to the line.
    Normal,
    /// Perpendicular, flipped where it would point downward.
    NormalUp,
    /// Along the line.
    Line,
    /// Along the line, flipped where it would render upside down.
    LineUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stroke {
    PenStroke(PenStroke),
    GraphicStroke(GraphicStroke),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenStroke {
    pub fill: Fill,
    #[serde(default = "default_width")]
    pub width: ParameterValue<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_cap: Option<LineCap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_join: Option<LineJoin>,
    /// Space-separated dash segment lengths, each in the stroke's uom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<ParameterValue<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_offset: Option<ParameterValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
}

fn default_width() -> ParameterValue<f64> {
    ParameterValue::Literal(DEFAULT_WIDTH_PX)
}

impl Default for PenStroke {
    fn default() -> Self {
        Self {
            fill: Fill::black(),
            width: default_width(),
            line_cap: None,
            line_join: None,
            dash_array: None,
            dash_offset: None,
            uom: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicStroke {
    pub graphics: Vec<Graphic>,
    /// Spacing between stamped graphics; defaults to 10px when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<ParameterValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<RelativeOrientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap_mark: Option<ParameterValue<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
}
