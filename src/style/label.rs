//! Label specifications for text symbolizers.

use serde::{Deserialize, Serialize};

use crate::units::Uom;

use super::fill::Fill;
use super::graphic::Halo;
use super::parameter::ParameterValue;
use super::stroke::{RelativeOrientation, Stroke};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerticalAlignment {
    Top,
    Middle,
    Baseline,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleFont {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<ParameterValue<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<ParameterValue<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<ParameterValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<ParameterValue<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
}

/// Text drawn near a feature.
///
/// `rotation` applies to point placements, `relative_orientation` to line
/// placements; both are optional and a label carries whichever its geometry
/// calls for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub text_label: ParameterValue<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<StyleFont>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Box<Stroke>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo: Option<Halo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_align: Option<HorizontalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_align: Option<VerticalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<ParameterValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_orientation: Option<RelativeOrientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
}
