//! Signed parallel offsets for lines and rings.

use geojson::Position;
use glam::DVec2;

use super::{dvec, position};

// Offset lines grow unbounded at near-reflex joints; cap the miter like a
// renderer would.
const MITER_LIMIT: f64 = 8.0;

#[inline]
fn segment_normal(a: DVec2, b: DVec2) -> DVec2 {
    let dir = (b - a).normalize_or_zero();
    // Right-hand normal on a y-down canvas: positive distances offset to the
    // right of the travel direction.
    DVec2::new(-dir.y, dir.x)
}

fn miter_offset(prev: DVec2, at: DVec2, next: DVec2, distance: f64) -> DVec2 {
    let n1 = segment_normal(prev, at);
    let n2 = segment_normal(at, next);
    let sum = n1 + n2;
    let len_sq = sum.length_squared();
    if len_sq < 1e-12 {
        // 180-degree turn: fall back to the incoming segment's normal
        return at + n1 * distance;
    }
    // Miter vector: (n1 + n2) / |n1 + n2|^2 * 2 has length 1/cos(theta/2)
    let miter = sum * (2.0 / len_sq);
    let miter = if miter.length() > MITER_LIMIT {
        miter.normalize_or_zero() * MITER_LIMIT
    } else {
        miter
    };
    at + miter * distance
}

/// Offset an open polyline laterally by `distance` (sign selects the side).
///
/// Vertices are displaced along miter-joined normals; the result has the same
/// number of vertices as the input. Self-intersections from large offsets on
/// tight geometry are not removed.
pub fn offset_open_line(line: &[Position], distance: f64) -> Vec<Position> {
    let n = line.len();
    if n < 2 || distance == 0.0 {
        return line.to_vec();
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let at = dvec(&line[i]);
        let moved = if i == 0 {
            at + segment_normal(at, dvec(&line[1])) * distance
        } else if i == n - 1 {
            at + segment_normal(dvec(&line[n - 2]), at) * distance
        } else {
            miter_offset(dvec(&line[i - 1]), at, dvec(&line[i + 1]), distance)
        };
        out.push(position(moved));
    }
    out
}

/// Offset a closed ring laterally by `distance`, joining across the closure.
///
/// Accepts rings with or without a duplicated closing vertex and returns the
/// same form it was given.
pub fn offset_ring(ring: &[Position], distance: f64) -> Vec<Position> {
    let closed = ring.len() > 1 && ring.first() == ring.last();
    let core: &[Position] = if closed { &ring[..ring.len() - 1] } else { ring };
    let n = core.len();
    if n < 3 || distance == 0.0 {
        return ring.to_vec();
    }

    let mut out = Vec::with_capacity(ring.len());
    for i in 0..n {
        let prev = dvec(&core[(i + n - 1) % n]);
        let at = dvec(&core[i]);
        let next = dvec(&core[(i + 1) % n]);
        out.push(position(miter_offset(prev, at, next, distance)));
    }
    if closed {
        out.push(out[0].clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line_offset() {
        let line = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
        let off = offset_open_line(&line, 2.0);
        // Travelling east, positive offsets go down (y-down canvas)
        assert!((off[0][1] - 2.0).abs() < 1e-9);
        assert!((off[1][1] - 2.0).abs() < 1e-9);
        let neg = offset_open_line(&line, -2.0);
        assert!((neg[0][1] + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_angle_miter() {
        let line = vec![vec![0.0, 0.0], vec![10.0, 0.0], vec![10.0, 10.0]];
        let off = offset_open_line(&line, 1.0);
        assert_eq!(off.len(), 3);
        // The corner vertex moves diagonally by sqrt(2) along the miter
        let corner = dvec(&off[1]);
        let expected = DVec2::new(9.0, 1.0);
        assert!(corner.distance(expected) < 1e-9);
    }

    #[test]
    fn test_ring_offset_shrinks_square() {
        let ring = vec![
            vec![0.0, 0.0],
            vec![10.0, 0.0],
            vec![10.0, 10.0],
            vec![0.0, 10.0],
            vec![0.0, 0.0],
        ];
        // A counter-clockwise-on-screen square with a positive (inward here)
        // offset contracts; every vertex moves 1 unit on both axes
        let off = offset_ring(&ring, 1.0);
        assert_eq!(off.len(), ring.len());
        assert!(dvec(&off[0]).distance(DVec2::new(1.0, 1.0)) < 1e-9);
        assert!(dvec(&off[2]).distance(DVec2::new(9.0, 9.0)) < 1e-9);
        // Closing vertex preserved
        assert_eq!(off.first(), off.last());
    }

    #[test]
    fn test_zero_offset_is_identity() {
        let line = vec![vec![0.0, 0.0], vec![5.0, 5.0]];
        assert_eq!(offset_open_line(&line, 0.0), line);
    }
}
