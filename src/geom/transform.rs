//! Recursive coordinate traversal over GeoJSON geometry.

use geojson::{Feature, Position, Value};

use super::Extent;

/// Apply `f` to every coordinate of a geometry value, recursing through all
/// variants including nested geometry collections.
pub fn for_each_position<F>(value: &mut Value, f: &mut F)
where
    F: FnMut(&mut Position),
{
    match value {
        Value::Point(p) => f(p),
        Value::MultiPoint(points) | Value::LineString(points) => {
            for p in points {
                f(p);
            }
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            for line in lines {
                for p in line {
                    f(p);
                }
            }
        }
        Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                for ring in polygon {
                    for p in ring {
                        f(p);
                    }
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                for_each_position(&mut g.value, f);
            }
        }
    }
}

/// Bounding box over every coordinate of a geometry value, or `None` for a
/// geometry with no coordinates.
pub fn value_bbox(value: &Value) -> Option<Extent> {
    let mut bbox: Option<Extent> = None;
    // Traversal only needs read access; clone-free would require a parallel
    // read-only walker, and geometries here are small
    let mut scratch = value.clone();
    for_each_position(&mut scratch, &mut |p: &mut Position| {
        let (x, y) = (p[0], p[1]);
        bbox = Some(match bbox {
            None => [x, y, x, y],
            Some(b) => [b[0].min(x), b[1].min(y), b[2].max(x), b[3].max(y)],
        });
    });
    bbox
}

/// Bounding box of a feature's geometry.
pub fn feature_bbox(feature: &Feature) -> Option<Extent> {
    feature.geometry.as_ref().and_then(|g| value_bbox(&g.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Geometry;

    #[test]
    fn test_traverses_nested_collections() {
        let mut value = Value::GeometryCollection(vec![
            Geometry::new(Value::Point(vec![1.0, 2.0])),
            Geometry::new(Value::GeometryCollection(vec![Geometry::new(
                Value::LineString(vec![vec![3.0, 4.0], vec![5.0, 6.0]]),
            )])),
        ]);
        let mut count = 0;
        for_each_position(&mut value, &mut |p: &mut Position| {
            p[0] += 10.0;
            count += 1;
        });
        assert_eq!(count, 3);
        if let Value::GeometryCollection(gs) = &value {
            if let Value::Point(p) = &gs[0].value {
                assert_eq!(p[0], 11.0);
            } else {
                panic!("expected point");
            }
        }
    }

    #[test]
    fn test_multipolygon_bbox() {
        let value = Value::MultiPolygon(vec![
            vec![vec![
                vec![0.0, 0.0],
                vec![4.0, 0.0],
                vec![4.0, 4.0],
                vec![0.0, 0.0],
            ]],
            vec![vec![
                vec![10.0, -2.0],
                vec![12.0, -2.0],
                vec![12.0, 1.0],
                vec![10.0, -2.0],
            ]],
        ]);
        assert_eq!(value_bbox(&value), Some([0.0, -2.0, 12.0, 4.0]));
    }

    #[test]
    fn test_empty_collection_has_no_bbox() {
        assert_eq!(value_bbox(&Value::GeometryCollection(vec![])), None);
    }
}
