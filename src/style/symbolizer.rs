//! Symbolizer variants: one drawing rule each for areas, lines, points and
//! text, stacked by rendering level.

use serde::{Deserialize, Serialize};

use crate::units::Uom;

use super::fill::Fill;
use super::graphic::Graphic;
use super::label::Label;
use super::parameter::ParameterValue;
use super::stroke::Stroke;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Symbolizer {
    AreaSymbolizer(AreaSymbolizer),
    LineSymbolizer(LineSymbolizer),
    PointSymbolizer(PointSymbolizer),
    TextSymbolizer(TextSymbolizer),
}

impl Symbolizer {
    /// Rendering level; symbolizers of one rule draw in ascending order.
    pub fn level(&self) -> i32 {
        match self {
            Symbolizer::AreaSymbolizer(s) => s.level,
            Symbolizer::LineSymbolizer(s) => s.level,
            Symbolizer::PointSymbolizer(s) => s.level,
            Symbolizer::TextSymbolizer(s) => s.level,
        }
    }

    /// Unit-of-measure override for this symbolizer's subtree.
    pub fn uom(&self) -> Option<Uom> {
        match self {
            Symbolizer::AreaSymbolizer(s) => s.uom,
            Symbolizer::LineSymbolizer(s) => s.uom,
            Symbolizer::PointSymbolizer(s) => s.uom,
            Symbolizer::TextSymbolizer(s) => s.uom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSymbolizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub level: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perpendicular_offset: Option<ParameterValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSymbolizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub level: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perpendicular_offset: Option<ParameterValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSymbolizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub level: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
    /// Stamp the graphics on every vertex instead of one representative point.
    #[serde(default)]
    pub on_vertex: bool,
    #[serde(default)]
    pub graphics: Vec<Graphic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSymbolizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub level: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<Uom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perpendicular_offset: Option<ParameterValue<f64>>,
    pub label: Label,
}
