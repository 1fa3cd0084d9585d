//! Well-known mark shape outlines, centered on the origin.

use geojson::Position;

/// 16-point circle of diameter 1.
const CIRCLE_D1: [[f64; 2]; 17] = [
    [0.5, 0.0],
    [0.461_939_766_255_643_4, 0.191_341_716_182_545],
    [0.353_553_390_593_273_8, 0.353_553_390_593_273_8],
    [0.191_341_716_182_545, 0.461_939_766_255_643_4],
    [0.0, 0.5],
    [-0.191_341_716_182_545, 0.461_939_766_255_643_4],
    [-0.353_553_390_593_273_8, 0.353_553_390_593_273_8],
    [-0.461_939_766_255_643_4, 0.191_341_716_182_545],
    [-0.5, 0.0],
    [-0.461_939_766_255_643_4, -0.191_341_716_182_545],
    [-0.353_553_390_593_273_8, -0.353_553_390_593_273_8],
    [-0.191_341_716_182_545, -0.461_939_766_255_643_4],
    [0.0, -0.5],
    [0.191_341_716_182_545, -0.461_939_766_255_643_4],
    [0.353_553_390_593_273_8, -0.353_553_390_593_273_8],
    [0.461_939_766_255_643_4, -0.191_341_716_182_545],
    [0.5, 0.0],
];

/// Parametric ellipse ring with the given number of steps.
pub fn ellipse_ring(width: f64, height: f64, cx: f64, cy: f64, steps: usize) -> Vec<Position> {
    let rx = width / 2.0;
    let ry = height / 2.0;
    let mut ring: Vec<Position> = (0..steps)
        .map(|i| {
            let t = i as f64 / steps as f64 * std::f64::consts::TAU;
            vec![cx + rx * t.cos(), cy + ry * t.sin()]
        })
        .collect();
    ring.push(ring[0].clone());
    ring
}

/// Circle (or ellipse, when the sizes differ) ring centered on `(cx, cy)`.
///
/// Small isotropic circles reuse the precomputed 16-point table.
pub fn circle_ring(width: f64, height: f64, cx: f64, cy: f64) -> Vec<Position> {
    if width == height && width < 30.0 {
        CIRCLE_D1
            .iter()
            .map(|[x, y]| vec![x * width + cx, y * width + cy])
            .collect()
    } else {
        ellipse_ring(width, height, cx, cy, 16)
    }
}

/// Axis-aligned square ring of half-extents `(hw, hh)` around the origin.
pub fn square_ring(hw: f64, hh: f64) -> Vec<Position> {
    vec![
        vec![-hw, -hh],
        vec![hw, -hh],
        vec![hw, hh],
        vec![-hw, hh],
        vec![-hw, -hh],
    ]
}

/// Upward-pointing triangle ring of half-extents `(hw, hh)` around the origin.
pub fn triangle_ring(hw: f64, hh: f64) -> Vec<Position> {
    vec![
        vec![-hw, hh],
        vec![0.0, -hh],
        vec![hw, hh],
        vec![-hw, hh],
    ]
}
