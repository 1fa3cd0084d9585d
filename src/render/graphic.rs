//! Mark graphic drawing.

use geojson::{Feature, Position, Value};
use tiny_skia::Pixmap;

use crate::geom::{
    anchor_points, circle_ring, square_ring, triangle_ring, NORTH,
};
use crate::style::{
    AnchorPosition, Graphic, GraphicSize, MarkGraphic, WellKnownName,
};

use super::{draw_fill, draw_stroke, RenderContext};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Resolved pixel size of a mark: isotropic sizes stretch triangles to the
/// 1:sqrt(3) ratio, view boxes are taken as-is.
fn mark_size(
    size: Option<&GraphicSize>,
    shape: WellKnownName,
    feature: &Feature,
    ctx: &RenderContext,
) -> (f64, f64) {
    match size {
        None => {
            if shape == WellKnownName::Triangle {
                (3.0, 1.5 * SQRT_3)
            } else {
                (3.0, 3.0)
            }
        }
        Some(GraphicSize::Size(spec)) => {
            let ctx = ctx.scoped(spec.uom);
            let x = ctx.to_pixel(spec.size.resolve(feature).unwrap_or(3.0));
            if shape == WellKnownName::Triangle {
                (x, x * SQRT_3)
            } else {
                (x, x)
            }
        }
        Some(GraphicSize::ViewBox(vb)) => {
            let ctx = ctx.scoped(vb.uom);
            (
                ctx.to_pixel(vb.width.resolve(feature).unwrap_or(3.0)),
                ctx.to_pixel(vb.height.resolve(feature).unwrap_or(3.0)),
            )
        }
    }
}

/// Anchor translation: which point of the mark's box lands on the target.
fn anchor_shift(anchor: AnchorPosition, hw: f64, hh: f64) -> (f64, f64) {
    let dx = match anchor {
        AnchorPosition::UpperRight | AnchorPosition::Right | AnchorPosition::LowerRight => hw,
        AnchorPosition::UpperLeft | AnchorPosition::Left | AnchorPosition::LowerLeft => -hw,
        _ => 0.0,
    };
    let dy = match anchor {
        AnchorPosition::UpperLeft | AnchorPosition::Top | AnchorPosition::UpperRight => -hh,
        AnchorPosition::LowerLeft | AnchorPosition::Bottom | AnchorPosition::LowerRight => hh,
        _ => 0.0,
    };
    (dx, dy)
}

fn shape_ring(shape: WellKnownName, width: f64, height: f64) -> Vec<Position> {
    let hw = width / 2.0;
    let hh = height / 2.0;
    match shape {
        WellKnownName::Circle => circle_ring(width, height, 0.0, 0.0),
        WellKnownName::Square => square_ring(hw, hh),
        WellKnownName::Triangle => triangle_ring(hw, hh),
    }
}

fn draw_mark(
    mark: &MarkGraphic,
    on_vertex: bool,
    angle_rad: f64,
    geometry: &Value,
    feature: &Feature,
    ctx: &RenderContext,
    surface: &mut Pixmap,
) {
    let ctx = ctx.scoped(mark.uom);
    let Some(shape) = mark.well_known_name.resolve(feature) else {
        log::warn!("mark with unresolvable well-known name, nothing drawn");
        return;
    };
    let (width, height) = mark_size(mark.size.as_ref(), shape, feature, &ctx);
    let hw = width / 2.0;
    let hh = height / 2.0;
    let (dx, dy) = anchor_shift(mark.anchor_position.unwrap_or_default(), hw, hh);

    let rotation = (angle_rad != NORTH).then(|| (angle_rad.cos(), angle_rad.sin()));

    for point in anchor_points(geometry, on_vertex) {
        let cx = point.x + dx;
        let cy = point.y + dy;

        let mut ring = shape_ring(shape, width, height);
        if let Some((cos, sin)) = rotation {
            for p in &mut ring {
                let (x, y) = (p[0], p[1]);
                p[0] = x * cos - y * sin;
                p[1] = x * sin + y * cos;
            }
        }
        for p in &mut ring {
            p[0] += cx;
            p[1] += cy;
        }

        let polygon = Value::Polygon(vec![ring]);
        if let Some(fill) = &mark.fill {
            draw_fill(fill, &polygon, surface);
        }
        if let Some(stroke) = &mark.stroke {
            draw_stroke(stroke, &polygon, feature, &ctx, surface);
        }
    }
}

/// Stamp each configured graphic at the geometry's anchor points.
pub fn draw_graphics(
    graphics: &[Graphic],
    on_vertex: bool,
    angle_rad: f64,
    geometry: &Value,
    feature: &Feature,
    ctx: &RenderContext,
    surface: &mut Pixmap,
) {
    for graphic in graphics {
        let Graphic::MarkGraphic(mark) = graphic;
        draw_mark(mark, on_vertex, angle_rad, geometry, feature, ctx, surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Fill, ParameterValue, SizeSpec, SolidFill};
    use crate::units::MapUnit;

    fn ctx() -> RenderContext {
        RenderContext::new([0.0, 0.0, 100.0, 100.0], 100, 100, 25.4, 1000.0, MapUnit::M).unwrap()
    }

    fn feature() -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: None,
            foreign_members: None,
        }
    }

    fn red_mark(shape: WellKnownName, size: f64, anchor: Option<AnchorPosition>) -> Vec<Graphic> {
        vec![Graphic::MarkGraphic(MarkGraphic {
            well_known_name: ParameterValue::Literal(shape),
            size: Some(GraphicSize::Size(SizeSpec {
                size: size.into(),
                uom: None,
            })),
            fill: Some(Fill::SolidFill(SolidFill {
                color: "#ff0000".into(),
                opacity: Some(1.0),
                uom: None,
            })),
            stroke: None,
            halo: None,
            anchor_position: anchor,
            uom: None,
        })]
    }

    fn alpha_at(surface: &Pixmap, x: u32, y: u32) -> u8 {
        surface.pixels()[(y * surface.width() + x) as usize].alpha()
    }

    #[test]
    fn test_centered_square_mark() {
        let mut surface = Pixmap::new(100, 100).unwrap();
        draw_graphics(
            &red_mark(WellKnownName::Square, 10.0, None),
            false,
            NORTH,
            &Value::Point(vec![50.0, 50.0]),
            &feature(),
            &ctx(),
            &mut surface,
        );
        assert!(alpha_at(&surface, 50, 50) > 0);
        assert!(alpha_at(&surface, 46, 46) > 0);
        assert_eq!(alpha_at(&surface, 40, 50), 0);
    }

    #[test]
    fn test_anchor_position_shifts_mark() {
        let mut surface = Pixmap::new(100, 100).unwrap();
        draw_graphics(
            &red_mark(WellKnownName::Square, 10.0, Some(AnchorPosition::UpperLeft)),
            false,
            NORTH,
            &Value::Point(vec![50.0, 50.0]),
            &feature(),
            &ctx(),
            &mut surface,
        );
        // Mark center moves to (45, 45); the anchor itself sits on the
        // mark's lower-right corner
        assert!(alpha_at(&surface, 45, 45) > 0);
        assert_eq!(alpha_at(&surface, 55, 55), 0);
    }

    #[test]
    fn test_on_vertex_stamps_every_vertex() {
        let mut surface = Pixmap::new(100, 100).unwrap();
        let line = Value::LineString(vec![
            vec![10.0, 10.0],
            vec![50.0, 10.0],
            vec![90.0, 10.0],
        ]);
        draw_graphics(
            &red_mark(WellKnownName::Circle, 6.0, None),
            true,
            NORTH,
            &line,
            &feature(),
            &ctx(),
            &mut surface,
        );
        for x in [10u32, 50, 90] {
            assert!(alpha_at(&surface, x.min(99), 10) > 0, "no mark at x={x}");
        }
        assert_eq!(alpha_at(&surface, 30, 10), 0);
    }

    #[test]
    fn test_rotated_triangle() {
        let mut surface = Pixmap::new(100, 100).unwrap();
        // Quarter-turn: the apex that pointed up now points along +x
        draw_graphics(
            &red_mark(WellKnownName::Triangle, 20.0, None),
            false,
            std::f64::consts::FRAC_PI_2,
            &Value::Point(vec![50.0, 50.0]),
            &feature(),
            &ctx(),
            &mut surface,
        );
        // Triangle half-height is 10*sqrt(3); the rotated apex lies right of
        // center on the horizontal axis
        assert!(alpha_at(&surface, 62, 50) > 0);
        // Beyond the apex, and where the apex used to point, stays empty
        assert_eq!(alpha_at(&surface, 70, 50), 0);
        assert_eq!(alpha_at(&surface, 50, 33), 0);
    }
}
