//! Stroke drawing: continuous pen strokes (with dash patterns and a ribbon
//! fallback for non-solid stroke fills) and graphic strokes stamped along
//! resampled lines.

use geojson::{Feature, Position, Value};
use tiny_skia::{Paint, PathBuilder, Pixmap, Stroke as SkStroke, StrokeDash, Transform};

use crate::geom::{offset_open_line, split_line, SplitMode, NORTH, SOUTH, WEST};
use crate::style::{
    resolve_color, Fill, GraphicStroke, LineCap, LineJoin, PenStroke, RelativeOrientation, Stroke,
    DEFAULT_WIDTH_PX,
};

use super::graphic::draw_graphics;
use super::{draw_fill, RenderContext};

/// Every line to stroke in a geometry: line strings and all polygon rings.
pub(crate) fn all_lines(geometry: &Value) -> Vec<&Vec<Position>> {
    match geometry {
        Value::LineString(line) => vec![line],
        Value::MultiLineString(lines) | Value::Polygon(lines) => lines.iter().collect(),
        Value::MultiPolygon(polygons) => polygons.iter().flatten().collect(),
        _ => Vec::new(),
    }
}

fn sk_cap(cap: Option<LineCap>) -> tiny_skia::LineCap {
    match cap.unwrap_or_default() {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    }
}

fn sk_join(join: Option<LineJoin>) -> tiny_skia::LineJoin {
    match join.unwrap_or_default() {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
    }
}

pub(crate) fn stroke_width(pen: &PenStroke, feature: &Feature, ctx: &RenderContext) -> f64 {
    ctx.to_pixel(pen.width.resolve(feature).unwrap_or(DEFAULT_WIDTH_PX))
}

/// Pen parameters for a solid stroke: geometry-space width, cap, join and
/// the dash pattern with every segment (and the offset) unit-converted.
pub(crate) fn pen_parameters(
    pen: &PenStroke,
    feature: &Feature,
    ctx: &RenderContext,
) -> SkStroke {
    let mut stroke = SkStroke {
        width: stroke_width(pen, feature, ctx).max(0.0) as f32,
        line_cap: sk_cap(pen.line_cap),
        line_join: sk_join(pen.line_join),
        ..SkStroke::default()
    };

    if let Some(dash_array) = &pen.dash_array {
        if let Some(spec) = dash_array.resolve(feature) {
            let mut dashes: Vec<f32> = spec
                .split_whitespace()
                .filter_map(|seg| seg.parse::<f64>().ok())
                .map(|seg| ctx.to_pixel(seg) as f32)
                .collect();
            // Odd dash lists repeat, as in SVG
            if dashes.len() % 2 == 1 {
                let repeated = dashes.clone();
                dashes.extend(repeated);
            }
            let offset = pen
                .dash_offset
                .as_ref()
                .and_then(|pv| pv.resolve(feature))
                .map(|v| ctx.to_pixel(v))
                .unwrap_or(0.0);
            stroke.dash = StrokeDash::new(dashes, offset as f32);
        }
    }
    stroke
}

fn polyline_path(line: &[Position]) -> Option<tiny_skia::Path> {
    if line.len() < 2 {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(line[0][0] as f32, line[0][1] as f32);
    for p in &line[1..] {
        pb.line_to(p[0] as f32, p[1] as f32);
    }
    pb.finish()
}

fn draw_pen_stroke(
    pen: &PenStroke,
    geometry: &Value,
    feature: &Feature,
    ctx: &RenderContext,
    surface: &mut Pixmap,
) {
    let ctx = ctx.scoped(pen.uom);
    let lines = all_lines(geometry);

    match &pen.fill {
        Fill::SolidFill(solid) => {
            let params = pen_parameters(pen, feature, &ctx);
            let mut paint = Paint::default();
            paint.set_color(resolve_color(&solid.color, solid.opacity.unwrap_or(1.0)));
            paint.anti_alias = true;
            for line in lines {
                if let Some(path) = polyline_path(line) {
                    surface.stroke_path(&path, &paint, &params, Transform::identity(), None);
                }
            }
        }
        other => {
            // Non-solid stroke fill: synthesize a ribbon polygon around the
            // line and hand it to the fill drawer
            let half = stroke_width(pen, feature, &ctx) / 2.0;
            for line in lines {
                if line.len() < 2 {
                    continue;
                }
                let left = offset_open_line(line, -half);
                let right = offset_open_line(line, half);
                let mut ring = left;
                ring.extend(right.into_iter().rev());
                ring.push(ring[0].clone());
                draw_fill(other, &Value::Polygon(vec![ring]), surface);
            }
        }
    }
}

/// Rotate a stamped graphic's angle for the requested orientation mode.
///
/// `LINE`/`LINE_UP` align the mark's upward axis with the travel direction
/// (LINE_UP first flipping tangents in the upper-left/left half-plane so
/// marks never render upside down); `NORMAL_UP` flips perpendicular marks
/// outside the right half-plane for the same reason.
pub(crate) fn oriented_angle(orientation: RelativeOrientation, raw: f64) -> f64 {
    let mut angle = raw;
    match orientation {
        RelativeOrientation::Portrayal | RelativeOrientation::Normal => {}
        RelativeOrientation::Line => {
            angle += SOUTH;
            if angle > std::f64::consts::PI {
                angle -= 2.0 * std::f64::consts::PI;
            }
        }
        RelativeOrientation::LineUp => {
            if angle > 0.0 && angle < WEST {
                angle += std::f64::consts::PI;
            }
            angle += SOUTH;
        }
        RelativeOrientation::NormalUp => {
            if angle < NORTH || angle > SOUTH {
                angle += std::f64::consts::PI;
            }
        }
    }
    angle
}

fn draw_graphic_stroke(
    stroke: &GraphicStroke,
    geometry: &Value,
    feature: &Feature,
    ctx: &RenderContext,
    surface: &mut Pixmap,
) {
    let ctx = ctx.scoped(stroke.uom);
    let distance = stroke
        .distance
        .as_ref()
        .and_then(|pv| pv.resolve(feature))
        .map(|v| ctx.to_pixel(v))
        .unwrap_or(0.0);
    let distance = if distance > 0.0 { distance } else { 10.0 };

    let orientation = stroke.orientation.unwrap_or_default();
    let compute_angle = orientation != RelativeOrientation::Portrayal;

    for line in all_lines(geometry) {
        for chunk in split_line(line, distance, SplitMode::Adjust, compute_angle) {
            let angle = oriented_angle(orientation, chunk.angle_rad);
            draw_graphics(
                &stroke.graphics,
                false,
                angle,
                &Value::Point(vec![chunk.point.x, chunk.point.y]),
                feature,
                &ctx,
                surface,
            );
        }
    }
}

/// Stroke every line and ring of a geometry.
pub fn draw_stroke(
    stroke: &Stroke,
    geometry: &Value,
    feature: &Feature,
    ctx: &RenderContext,
    surface: &mut Pixmap,
) {
    match stroke {
        Stroke::PenStroke(pen) => draw_pen_stroke(pen, geometry, feature, ctx, surface),
        Stroke::GraphicStroke(graphic) => {
            draw_graphic_stroke(graphic, geometry, feature, ctx, surface)
        }
    }
}
