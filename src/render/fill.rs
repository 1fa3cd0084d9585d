//! Fill drawing.

use geojson::{Position, Value};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::style::{resolve_color, Fill, SolidFill};

/// Build one path from a polygon's rings. Every ring is closed so the
/// even-odd rule can carve holes.
pub(crate) fn polygon_path(rings: &[Vec<Position>]) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for ring in rings {
        let mut points = ring.iter();
        let Some(first) = points.next() else { continue };
        pb.move_to(first[0] as f32, first[1] as f32);
        for p in points {
            pb.line_to(p[0] as f32, p[1] as f32);
        }
        pb.close();
    }
    pb.finish()
}

fn fill_polygon(rings: &[Vec<Position>], fill: &SolidFill, surface: &mut Pixmap) {
    let Some(path) = polygon_path(rings) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(resolve_color(&fill.color, fill.opacity.unwrap_or(1.0)));
    paint.anti_alias = true;
    surface.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), None);
}

/// Fill every polygon of a geometry. Non-area geometry is ignored.
pub fn draw_fill(fill: &Fill, geometry: &Value, surface: &mut Pixmap) {
    match fill {
        Fill::SolidFill(solid) => match geometry {
            Value::Polygon(rings) => fill_polygon(rings, solid, surface),
            Value::MultiPolygon(polygons) => {
                for rings in polygons {
                    fill_polygon(rings, solid, surface);
                }
            }
            _ => {}
        },
        Fill::HatchedFill(_) => {
            log::warn!("hatched fill is not supported yet; geometry left unfilled");
        }
    }
}
