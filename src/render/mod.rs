//! Rule evaluation and symbolizer dispatch.
//!
//! A render pass converts the visible features to device-pixel coordinates
//! once, then walks the style's applicable rules, drawing each rule's
//! symbolizers in ascending level order into the layer's surface. Text is
//! never drawn here: text symbolizers register label candidates which are
//! placed and painted after every layer has rendered.

mod fill;
mod fonts;
mod graphic;
mod labels;
mod stroke;
mod text;

pub use fill::draw_fill;
pub use fonts::{draw_text_run, FontLibrary, TextMetrics};
pub use graphic::draw_graphics;
pub use labels::{placement_candidates, LabelCandidate, LabelEngine};
pub use stroke::draw_stroke;
pub use text::draw_text;

use std::borrow::Cow;

use geojson::{Feature, FeatureCollection, Value};
use tiny_skia::Pixmap;

use crate::error::Result;
use crate::geom::{
    for_each_position, offset_open_line, offset_ring, Extent, NORTH,
};
use crate::style::{ParameterValue, Rule, Style, Symbolizer};
use crate::units::{
    ground_to_pixel_factor, pixel_to_ground_factor, to_pixel, MapUnit, Uom,
};

/// Everything a draw call needs to know about the viewport: ground extent,
/// device size and resolution, cartographic scale and the current
/// unit-of-measure scope.
///
/// The two conversion factors are derived at construction and must be
/// rebuilt (via a new context) whenever dpi, scale or ground unit change.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub ground_extent: Extent,
    pub width: u32,
    pub height: u32,
    pub dpi: f64,
    pub scale_denom: f64,
    pub ground_unit: MapUnit,
    pub uom: Option<Uom>,
    pub ground_to_pixel: f64,
    pub pixel_to_ground: f64,
}

impl RenderContext {
    pub fn new(
        ground_extent: Extent,
        width: u32,
        height: u32,
        dpi: f64,
        scale_denom: f64,
        ground_unit: MapUnit,
    ) -> Result<Self> {
        Ok(Self {
            ground_extent,
            width,
            height,
            dpi,
            scale_denom,
            ground_unit,
            uom: None,
            ground_to_pixel: ground_to_pixel_factor(ground_unit, dpi, scale_denom)?,
            pixel_to_ground: pixel_to_ground_factor(ground_unit, dpi, scale_denom)?,
        })
    }

    /// Child context for a subtree with its own unit-of-measure. Children
    /// inherit the nearest enclosing value unless they override it.
    pub fn scoped(&self, uom: Option<Uom>) -> Self {
        match uom {
            Some(uom) => Self {
                uom: Some(uom),
                ..*self
            },
            None => *self,
        }
    }

    /// Convert a style value in the current uom scope to pixels.
    pub fn to_pixel(&self, value: f64) -> f64 {
        // dpi and scale were validated at construction
        to_pixel(value, self.uom, self.dpi, self.scale_denom, None).unwrap_or(value)
    }

    /// Like [`Self::to_pixel`] with a 100% reference for percent values.
    pub fn to_pixel_with_reference(&self, value: f64, v100p: f64) -> f64 {
        to_pixel(value, self.uom, self.dpi, self.scale_denom, Some(v100p)).unwrap_or(value)
    }

    /// Ground coordinate to device pixel (y flipped to a top-down origin).
    pub fn ground_to_media(&self, p: [f64; 2]) -> [f64; 2] {
        let x = (p[0] - self.ground_extent[0]) * self.ground_to_pixel;
        let y = (p[1] - self.ground_extent[1]) * self.ground_to_pixel;
        [x, self.height as f64 - y]
    }
}

/// Convert a feature collection from ground to device-pixel coordinates.
fn to_media_coordinates(layer: &FeatureCollection, ctx: &RenderContext) -> FeatureCollection {
    let features = layer
        .features
        .iter()
        .map(|feature| {
            let mut feature = feature.clone();
            if let Some(geometry) = feature.geometry.as_mut() {
                for_each_position(&mut geometry.value, &mut |p| {
                    let q = ctx.ground_to_media([p[0], p[1]]);
                    p[0] = q[0];
                    p[1] = q[1];
                });
            }
            feature
        })
        .collect();
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Apply a perpendicular offset (in pixels) to a geometry: lateral line
/// offset for lines, ring offset for areas. Other geometry passes through.
fn with_perpendicular_offset(geometry: &Value, offset_px: f64) -> Cow<'_, Value> {
    if offset_px == 0.0 {
        return Cow::Borrowed(geometry);
    }
    match geometry {
        Value::LineString(line) => {
            Cow::Owned(Value::LineString(offset_open_line(line, offset_px)))
        }
        Value::MultiLineString(lines) => Cow::Owned(Value::MultiLineString(
            lines.iter().map(|l| offset_open_line(l, offset_px)).collect(),
        )),
        Value::Polygon(rings) => Cow::Owned(Value::Polygon(
            rings.iter().map(|r| offset_ring(r, offset_px)).collect(),
        )),
        Value::MultiPolygon(polygons) => Cow::Owned(Value::MultiPolygon(
            polygons
                .iter()
                .map(|rings| rings.iter().map(|r| offset_ring(r, offset_px)).collect())
                .collect(),
        )),
        _ => Cow::Borrowed(geometry),
    }
}

fn for_each_offset_feature<'a, F>(
    features: &[&'a Feature],
    perpendicular_offset: Option<&ParameterValue<f64>>,
    ctx: &RenderContext,
    mut draw: F,
) where
    F: FnMut(&'a Feature, &Value),
{
    for feature in features.iter().copied() {
        let offset = perpendicular_offset
            .and_then(|pv| pv.resolve(feature))
            .map(|v| ctx.to_pixel(v))
            .unwrap_or(0.0);
        if let Some(geometry) = feature.geometry.as_ref() {
            let shifted = with_perpendicular_offset(&geometry.value, offset);
            draw(feature, shifted.as_ref());
        }
    }
}

fn render_symbolizer(
    features: &[&Feature],
    symbolizer: &Symbolizer,
    ctx: &RenderContext,
    surface: &mut Pixmap,
    labels: &mut LabelEngine,
) {
    let ctx = ctx.scoped(symbolizer.uom());
    match symbolizer {
        Symbolizer::AreaSymbolizer(area) => {
            if area.fill.is_none() && area.stroke.is_none() {
                return;
            }
            for_each_offset_feature(
                features,
                area.perpendicular_offset.as_ref(),
                &ctx,
                |feature, geometry| {
                    if let Some(fill) = &area.fill {
                        draw_fill(fill, geometry, surface);
                    }
                    if let Some(stroke) = &area.stroke {
                        draw_stroke(stroke, geometry, feature, &ctx, surface);
                    }
                },
            );
        }
        Symbolizer::LineSymbolizer(line) => {
            if let Some(stroke) = &line.stroke {
                for_each_offset_feature(
                    features,
                    line.perpendicular_offset.as_ref(),
                    &ctx,
                    |feature, geometry| {
                        draw_stroke(stroke, geometry, feature, &ctx, surface);
                    },
                );
            }
        }
        Symbolizer::PointSymbolizer(point) => {
            if point.graphics.is_empty() {
                return;
            }
            for feature in features.iter().copied() {
                if let Some(geometry) = feature.geometry.as_ref() {
                    draw_graphics(
                        &point.graphics,
                        point.on_vertex,
                        NORTH,
                        &geometry.value,
                        feature,
                        &ctx,
                        surface,
                    );
                }
            }
        }
        Symbolizer::TextSymbolizer(symbolizer) => {
            for_each_offset_feature(
                features,
                symbolizer.perpendicular_offset.as_ref(),
                &ctx,
                |feature, geometry| {
                    draw_text(&symbolizer.label, geometry, feature, &ctx, labels);
                },
            );
        }
    }
}

fn render_rule(
    layer: &FeatureCollection,
    rule: &Rule,
    ctx: &RenderContext,
    surface: &mut Pixmap,
    labels: &mut LabelEngine,
) {
    let features: Vec<&Feature> = layer
        .features
        .iter()
        .filter(|feature| match &rule.filter {
            None => true,
            Some(filter) => filter.resolve(feature).unwrap_or(false),
        })
        .collect();
    if features.is_empty() {
        return;
    }

    let mut symbolizers: Vec<&Symbolizer> = rule.symbolizers.iter().collect();
    // Stable: equal levels keep their declaration order
    symbolizers.sort_by_key(|s| s.level());

    for symbolizer in symbolizers {
        render_symbolizer(&features, symbolizer, ctx, surface, labels);
    }
}

/// Render a feature collection with a style into a layer surface.
///
/// Rules outside the current scale window are skipped before any coordinate
/// conversion happens, so a style that does not apply costs nothing.
pub fn render(
    layer: &FeatureCollection,
    style: &Style,
    ctx: &RenderContext,
    surface: &mut Pixmap,
    labels: &mut LabelEngine,
) {
    let rules: Vec<&Rule> = style
        .rules
        .iter()
        .filter(|rule| rule.applies_at(ctx.scale_denom))
        .collect();
    if rules.is_empty() {
        return;
    }

    let media_layer = to_media_coordinates(layer, ctx);
    for rule in rules {
        render_rule(&media_layer, rule, ctx, surface, labels);
    }
}
