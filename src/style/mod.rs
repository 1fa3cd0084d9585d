//! Declarative, scale-aware symbology: styles made of ordered rules, each
//! with an optional scale-denominator window, an optional feature filter and
//! an ordered list of symbolizers.

mod fill;
mod graphic;
mod label;
mod parameter;
mod stroke;
mod symbolizer;

pub use fill::{Fill, HatchedFill, SolidFill};
pub use graphic::{
    AnchorPosition, Graphic, GraphicSize, Halo, MarkGraphic, SizeSpec, ViewBox, WellKnownName,
};
pub use label::{HorizontalAlignment, Label, StyleFont, VerticalAlignment};
pub use parameter::{resolve_color, ParameterValue, PropertyValue, ValueReference};
pub use stroke::{
    GraphicStroke, LineCap, LineJoin, PenStroke, RelativeOrientation, Stroke, DEFAULT_WIDTH_PX,
};
pub use symbolizer::{
    AreaSymbolizer, LineSymbolizer, PointSymbolizer, Symbolizer, TextSymbolizer,
};

use serde::{Deserialize, Serialize};

/// One styling rule: applies within an inclusive scale-denominator window,
/// optionally restricted by a per-feature boolean filter.
///
/// Nothing prevents `min_scale > max_scale`; such a rule simply never fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ParameterValue<bool>>,
    #[serde(default)]
    pub symbolizers: Vec<Symbolizer>,
}

impl Rule {
    /// Whether this rule's scale window contains the given denominator.
    /// Both bounds are inclusive; an absent bound is unconstrained.
    pub fn applies_at(&self, scale_denom: f64) -> bool {
        if let Some(min) = self.min_scale {
            if scale_denom < min {
                return false;
            }
        }
        if let Some(max) = self.max_scale {
            if scale_denom > max {
                return false;
            }
        }
        true
    }
}

/// A named, ordered list of rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_window_is_inclusive() {
        let rule = Rule {
            name: None,
            min_scale: Some(1000.0),
            max_scale: Some(5000.0),
            filter: None,
            symbolizers: vec![],
        };
        assert!(!rule.applies_at(999.0));
        assert!(rule.applies_at(1000.0));
        assert!(rule.applies_at(3000.0));
        assert!(rule.applies_at(5000.0));
        assert!(!rule.applies_at(5001.0));
    }

    #[test]
    fn test_unbounded_windows() {
        let open = Rule {
            name: None,
            min_scale: None,
            max_scale: None,
            filter: None,
            symbolizers: vec![],
        };
        assert!(open.applies_at(1.0));
        assert!(open.applies_at(1e9));

        let min_only = Rule {
            min_scale: Some(500.0),
            ..open.clone()
        };
        assert!(!min_only.applies_at(499.0));
        assert!(min_only.applies_at(1e9));
    }

    #[test]
    fn test_inverted_window_never_matches() {
        let rule = Rule {
            name: None,
            min_scale: Some(5000.0),
            max_scale: Some(1000.0),
            filter: None,
            symbolizers: vec![],
        };
        for scale in [500.0, 1000.0, 3000.0, 5000.0, 9000.0] {
            assert!(!rule.applies_at(scale));
        }
    }

    #[test]
    fn test_style_document_round_trip() {
        let doc = r##"{
            "type": "Style",
            "name": "roads",
            "rules": [{
                "type": "Rule",
                "minScale": 1000,
                "maxScale": 50000,
                "symbolizers": [
                    {
                        "type": "LineSymbolizer",
                        "level": 1,
                        "uom": "MM",
                        "stroke": {
                            "type": "PenStroke",
                            "fill": {"type": "SolidFill", "color": "#ff0000", "opacity": 0.8},
                            "width": {"type": "ValueReference", "property": "lanes"},
                            "lineCap": "round",
                            "dashArray": "5 3"
                        }
                    },
                    {
                        "type": "PointSymbolizer",
                        "onVertex": true,
                        "graphics": [{
                            "type": "MarkGraphic",
                            "wellKnownName": "triangle",
                            "size": {"type": "Size", "size": 8},
                            "anchorPosition": "UPPER_LEFT"
                        }]
                    },
                    {
                        "type": "TextSymbolizer",
                        "label": {
                            "textLabel": {"type": "ValueReference", "property": "name"},
                            "halo": {"type": "Halo", "radius": 2,
                                     "fill": {"type": "SolidFill", "color": "#ffffff"}}
                        }
                    }
                ]
            }]
        }"##;
        let style: Style = serde_json::from_str(doc).unwrap();
        assert_eq!(style.name.as_deref(), Some("roads"));
        assert_eq!(style.rules.len(), 1);
        let rule = &style.rules[0];
        assert_eq!(rule.symbolizers.len(), 3);
        match &rule.symbolizers[0] {
            Symbolizer::LineSymbolizer(line) => {
                assert_eq!(line.level, 1);
                assert_eq!(line.uom, Some(crate::units::Uom::Mm));
                match line.stroke.as_ref().unwrap() {
                    Stroke::PenStroke(pen) => {
                        assert_eq!(pen.line_cap, Some(LineCap::Round));
                        assert_eq!(pen.width, ParameterValue::property("lanes"));
                    }
                    other => panic!("unexpected stroke {other:?}"),
                }
            }
            other => panic!("unexpected symbolizer {other:?}"),
        }
        match &rule.symbolizers[1] {
            Symbolizer::PointSymbolizer(point) => {
                assert!(point.on_vertex);
                let Graphic::MarkGraphic(mark) = &point.graphics[0];
                assert_eq!(mark.anchor_position, Some(AnchorPosition::UpperLeft));
                assert_eq!(
                    mark.well_known_name,
                    ParameterValue::Literal(WellKnownName::Triangle)
                );
            }
            other => panic!("unexpected symbolizer {other:?}"),
        }

        // Survives a serialize/deserialize cycle
        let json = serde_json::to_string(&style).unwrap();
        let again: Style = serde_json::from_str(&json).unwrap();
        assert_eq!(style, again);
    }

    #[test]
    fn test_default_level_is_zero() {
        let doc = r#"{"type": "AreaSymbolizer"}"#;
        let sym: Symbolizer = serde_json::from_str(doc).unwrap();
        assert_eq!(sym.level(), 0);
        assert_eq!(sym.uom(), None);
    }

    #[test]
    fn test_hatched_fill_is_accepted() {
        let doc = r##"{
            "type": "HatchedFill",
            "stroke": {"type": "PenStroke",
                       "fill": {"type": "SolidFill", "color": "#000000"},
                       "width": 1},
            "angle": 45.0,
            "distance": 4.0
        }"##;
        let fill: Fill = serde_json::from_str(doc).unwrap();
        assert!(matches!(fill, Fill::HatchedFill(_)));
    }
}
