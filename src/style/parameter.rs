//! Dynamic style parameters and color resolution.

use geojson::Feature;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Reference to a feature attribute supplying a parameter's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueReference {
    pub property: String,
}

/// A style parameter: either a literal or a per-feature property reference.
///
/// References resolve against the feature's properties at draw time, which
/// is the mechanism for attribute-driven styling (stroke color from a road
/// classification, label text from a name field, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue<T> {
    Reference(ValueReference),
    Literal(T),
}

impl<T> From<T> for ParameterValue<T> {
    fn from(value: T) -> Self {
        ParameterValue::Literal(value)
    }
}

impl<T> ParameterValue<T> {
    pub fn property(name: &str) -> Self {
        ParameterValue::Reference(ValueReference {
            property: name.to_string(),
        })
    }
}

/// Conversion from a raw feature attribute to a typed parameter value.
pub trait PropertyValue: Sized {
    fn from_property(value: &JsonValue) -> Option<Self>;
}

impl PropertyValue for f64 {
    fn from_property(value: &JsonValue) -> Option<Self> {
        value.as_f64()
    }
}

impl PropertyValue for bool {
    fn from_property(value: &JsonValue) -> Option<Self> {
        value.as_bool()
    }
}

impl PropertyValue for String {
    fn from_property(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl<T: Clone + PropertyValue> ParameterValue<T> {
    /// Resolve against a feature, returning `None` for a reference to a
    /// missing or incompatible attribute.
    pub fn resolve(&self, feature: &Feature) -> Option<T> {
        match self {
            ParameterValue::Literal(v) => Some(v.clone()),
            ParameterValue::Reference(r) => feature
                .properties
                .as_ref()
                .and_then(|props| props.get(&r.property))
                .and_then(T::from_property),
        }
    }
}

/// Parse a style color (`#rrggbb`, `#rrggbbaa` or a named color) and combine
/// it with an opacity in `[0, 1]`. Unparseable colors fall back to black.
pub fn resolve_color(spec: &str, opacity: f64) -> tiny_skia::Color {
    let (r, g, b, a) = parse_color(spec).unwrap_or_else(|| {
        log::warn!("unparseable color {spec:?}, using black");
        (0, 0, 0, 255)
    });
    let alpha = (a as f64 / 255.0 * opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    tiny_skia::Color::from_rgba8(r, g, b, alpha)
}

fn parse_color(spec: &str) -> Option<(u8, u8, u8, u8)> {
    let s = spec.trim();
    if let Some(hex) = s.strip_prefix('#') {
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return match hex.len() {
            6 => Some((byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some((byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        };
    }
    match s.to_ascii_lowercase().as_str() {
        "black" => Some((0, 0, 0, 255)),
        "white" => Some((255, 255, 255, 255)),
        "red" => Some((255, 0, 0, 255)),
        "green" => Some((0, 128, 0, 255)),
        "blue" => Some((0, 0, 255, 255)),
        "yellow" => Some((255, 255, 0, 255)),
        "orange" => Some((255, 165, 0, 255)),
        "purple" => Some((128, 0, 128, 255)),
        "gray" | "grey" => Some((128, 128, 128, 255)),
        "hotpink" => Some((255, 105, 180, 255)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature_with(props: serde_json::Value) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: props.as_object().cloned(),
            foreign_members: None,
        }
    }

    #[test]
    fn test_literal_resolves_to_itself() {
        let pv: ParameterValue<f64> = 3.5.into();
        assert_eq!(pv.resolve(&feature_with(json!({}))), Some(3.5));
    }

    #[test]
    fn test_reference_reads_property() {
        let pv: ParameterValue<f64> = ParameterValue::property("width");
        let feature = feature_with(json!({"width": 2.25}));
        assert_eq!(pv.resolve(&feature), Some(2.25));
        assert_eq!(pv.resolve(&feature_with(json!({}))), None);
    }

    #[test]
    fn test_numeric_property_as_label_text() {
        let pv: ParameterValue<String> = ParameterValue::property("elevation");
        let feature = feature_with(json!({"elevation": 1042}));
        assert_eq!(pv.resolve(&feature), Some("1042".to_string()));
    }

    #[test]
    fn test_deserialize_both_forms() {
        let lit: ParameterValue<f64> = serde_json::from_str("4.0").unwrap();
        assert_eq!(lit, ParameterValue::Literal(4.0));
        let reference: ParameterValue<f64> =
            serde_json::from_str(r#"{"type": "ValueReference", "property": "w"}"#).unwrap();
        assert_eq!(reference, ParameterValue::property("w"));
    }

    #[test]
    fn test_color_parsing() {
        let c = resolve_color("#ff8000", 1.0);
        assert!((c.red() - 1.0).abs() < 1e-3);
        assert!((c.green() - 128.0 / 255.0).abs() < 1e-2);
        let half = resolve_color("#000000", 0.5);
        assert!((half.alpha() - 0.5).abs() < 2.0 / 255.0);
        let named = resolve_color("hotpink", 1.0);
        assert!(named.red() > 0.99);
        // Unknown names fall back to opaque black rather than failing
        let bad = resolve_color("no-such-color", 1.0);
        assert_eq!(bad.red(), 0.0);
        assert_eq!(bad.alpha(), 1.0);
    }

    #[test]
    fn test_hex_alpha_combines_with_opacity() {
        let c = resolve_color("#00000080", 0.5);
        assert!((c.alpha() - 0.25).abs() < 2.0 / 255.0);
    }
}
