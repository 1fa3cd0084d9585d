//! Anchor-point extraction: where on a geometry a mark or label lands.

use geojson::{Position, Value};
use glam::DVec2;

use super::dvec;

/// Representative point for a line: its start vertex.
fn point_on_line(line: &[Position]) -> Option<DVec2> {
    line.first().map(|p| dvec(p))
}

/// Even-odd test of a point against a set of rings.
pub fn point_in_rings(point: DVec2, rings: &[Vec<Position>]) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let a = dvec(&ring[i]);
            let b = dvec(&ring[j]);
            if (a.y > point.y) != (b.y > point.y) {
                let x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
                if point.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
    }
    inside
}

/// Representative interior point of a polygon.
///
/// The ring centroid is used when it falls inside; for concave shapes where
/// it does not, the widest interior span of a horizontal scanline through the
/// centroid is used instead.
pub fn interior_point(rings: &[Vec<Position>]) -> Option<DVec2> {
    let exterior = rings.first()?;
    if exterior.is_empty() {
        return None;
    }

    let closed = exterior.len() > 1 && exterior.first() == exterior.last();
    let core = if closed {
        &exterior[..exterior.len() - 1]
    } else {
        &exterior[..]
    };
    if core.is_empty() {
        return None;
    }

    let centroid = core.iter().fold(DVec2::ZERO, |acc, p| acc + dvec(p)) / core.len() as f64;
    if point_in_rings(centroid, rings) {
        return Some(centroid);
    }

    // Scanline through the centroid: midpoint of the widest inside span
    let mut crossings: Vec<f64> = Vec::new();
    let n = core.len();
    let mut j = n - 1;
    for i in 0..n {
        let a = dvec(&core[i]);
        let b = dvec(&core[j]);
        if (a.y > centroid.y) != (b.y > centroid.y) {
            crossings.push((b.x - a.x) * (centroid.y - a.y) / (b.y - a.y) + a.x);
        }
        j = i;
    }
    crossings.sort_by(|a, b| a.total_cmp(b));

    let mut best: Option<(f64, DVec2)> = None;
    for pair in crossings.chunks_exact(2) {
        let width = pair[1] - pair[0];
        let mid = DVec2::new((pair[0] + pair[1]) / 2.0, centroid.y);
        if best.map(|(w, _)| width > w).unwrap_or(true) {
            best = Some((width, mid));
        }
    }
    best.map(|(_, p)| p).or(Some(centroid))
}

/// Points a mark or label should be anchored at for the given geometry.
///
/// Points yield their own coordinate; lines and polygons a representative
/// point, or every vertex when `on_vertex` is set. Geometry collections are
/// not anchored.
pub fn anchor_points(geometry: &Value, on_vertex: bool) -> Vec<DVec2> {
    match geometry {
        Value::Point(p) => vec![dvec(p)],
        Value::MultiPoint(points) => points.iter().map(|p| dvec(p)).collect(),
        Value::LineString(line) => {
            if on_vertex {
                line.iter().map(|p| dvec(p)).collect()
            } else {
                point_on_line(line).into_iter().collect()
            }
        }
        Value::MultiLineString(lines) => {
            if on_vertex {
                lines.iter().flatten().map(|p| dvec(p)).collect()
            } else {
                lines.iter().filter_map(|l| point_on_line(l)).collect()
            }
        }
        Value::Polygon(rings) => {
            if on_vertex {
                rings.iter().flatten().map(|p| dvec(p)).collect()
            } else {
                interior_point(rings).into_iter().collect()
            }
        }
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .flat_map(|rings| {
                if on_vertex {
                    rings.iter().flatten().map(|p| dvec(p)).collect::<Vec<_>>()
                } else {
                    interior_point(rings).into_iter().collect::<Vec<_>>()
                }
            })
            .collect(),
        Value::GeometryCollection(_) => Vec::new(),
    }
}
