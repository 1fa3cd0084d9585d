//! Line measurement and resampling.

use geojson::Position;
use glam::DVec2;

use super::dvec;

/// Angle pointing "up" on a y-down canvas.
pub const NORTH: f64 = -std::f64::consts::FRAC_PI_2;
pub const SOUTH: f64 = std::f64::consts::FRAC_PI_2;
pub const EAST: f64 = 0.0;
pub const WEST: f64 = std::f64::consts::PI;

/// A resampled point along a line, with the direction of the segment it was
/// taken from when angle computation was requested.
#[derive(Debug, Clone, Copy)]
pub struct OrientedPoint {
    pub point: DVec2,
    pub angle_rad: f64,
}

/// How a spacing pattern interacts with the end of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// Always respect the pattern length; a trailing remainder is dropped.
    Strict,
    /// Strict, but the final vertex is emitted even when the last pattern is
    /// incomplete.
    AddFinal,
    /// Stretch the pattern so it divides the line evenly with no remainder.
    #[default]
    Adjust,
}

/// Total length of a coordinate sequence.
pub fn line_length(coords: &[Position]) -> f64 {
    let mut length = 0.0;
    for pair in coords.windows(2) {
        length += dvec(&pair[0]).distance(dvec(&pair[1]));
    }
    length
}

/// Walk `line` emitting a point every `pattern` units of travelled distance.
///
/// The first emitted point is always the line's start. In `Adjust` mode the
/// effective spacing becomes `length / round(length / pattern)` (at least one
/// segment) so the pattern fits the line exactly. Split points falling inside
/// a segment are interpolated; whatever distance remains at the end emits the
/// final vertex unless the mode is `Strict`.
pub fn split_line(
    line: &[Position],
    pattern: f64,
    mode: SplitMode,
    compute_angle: bool,
) -> Vec<OrientedPoint> {
    if line.is_empty() {
        return Vec::new();
    }

    let mut pattern_length = pattern;
    if mode == SplitMode::Adjust {
        let length = line_length(line);
        let nb = (length / pattern_length).round().max(1.0);
        pattern_length = length / nb;
    }

    let mut current = dvec(&line[0]);
    let mut points = vec![OrientedPoint {
        point: current,
        angle_rad: NORTH,
    }];
    if compute_angle && line.len() > 1 {
        let vector = dvec(&line[1]) - current;
        points[0].angle_rad = vector.y.atan2(vector.x);
    }

    if !(pattern_length > 0.0) {
        return points;
    }

    let mut travelled = 0.0;
    let mut i = 1;
    while i < line.len() {
        let target = dvec(&line[i]);
        let dist_to_end = current.distance(target);

        if travelled + dist_to_end > pattern_length {
            // distance reached within this segment: interpolate the split
            // point and restart the travel from there
            let delta = pattern_length - travelled;
            let vector = target - current;
            let point = current + vector * (delta / dist_to_end);

            let angle_rad = if compute_angle {
                vector.y.atan2(vector.x)
            } else {
                NORTH
            };
            points.push(OrientedPoint { point, angle_rad });

            travelled = 0.0;
            current = point;
        } else {
            travelled += dist_to_end;
            current = target;
            i += 1;
        }
    }

    if travelled > 0.0 && mode != SplitMode::Strict {
        points.push(OrientedPoint {
            point: dvec(&line[line.len() - 1]),
            angle_rad: 0.0,
        });
    }

    points
}
