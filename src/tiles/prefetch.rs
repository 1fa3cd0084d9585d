//! Optional proactive tile prefetching.
//!
//! Plans cache-warming requests for the finest tile matrix by recursive
//! quad bisection: a quad of tiles whose ground footprint contains no
//! features is skipped whole, otherwise it is split until single tiles
//! remain. Disabled unless explicitly enabled; the planner only ever
//! returns a request list and never fetches anything itself.

use std::collections::VecDeque;

use crate::error::Result;
use crate::registry::FeatureIndex;
use crate::tiles::{ground_tile_size, TileCache, TileRequest, TiledLayer};
use crate::units::MapUnit;

/// Threshold below which a matrix is small enough to request wholesale.
const SMALL_MATRIX_TILES: u64 = 20;

struct QuadJob {
    n: u64,
    from: (u64, u64),
    to: (u64, u64),
}

/// Plan prefetch requests for the finest matrix of a tiled layer.
pub fn plan_prefetch(
    layer: &TiledLayer,
    features: &FeatureIndex,
    unit: MapUnit,
    enabled: bool,
    cache: &TileCache,
    generation: u64,
) -> Result<Vec<TileRequest>> {
    if !enabled {
        return Ok(Vec::new());
    }
    let Some(matrix) = layer.matrix_set.tile_matrix.last() else {
        return Ok(Vec::new());
    };

    let mut requests = Vec::new();
    let mut push = |col: u64, row: u64, requests: &mut Vec<TileRequest>| {
        let url = layer.tile_url(&matrix.identifier, col, row);
        if !cache.contains(&layer.layer_id, &url) {
            requests.push(TileRequest {
                layer_id: layer.layer_id.clone(),
                url,
                matrix_id: matrix.identifier.clone(),
                col,
                row,
                generation,
            });
        }
    };

    if matrix.matrix_width * matrix.matrix_height < SMALL_MATRIX_TILES {
        for row in 0..matrix.matrix_height {
            for col in 0..matrix.matrix_width {
                push(col, row, &mut requests);
            }
        }
        return Ok(requests);
    }

    let (gw, gh) = ground_tile_size(matrix, unit)?;
    let [x0, y0] = matrix.top_left_corner;

    let min_side = matrix.matrix_width.min(matrix.matrix_height);
    let n = 1u64 << (min_side / 2).max(1).ilog2();

    let mut queue = VecDeque::new();
    queue.push_back(QuadJob {
        n,
        from: (0, 0),
        to: (matrix.matrix_width, matrix.matrix_height),
    });

    while let Some(QuadJob { n, from, to }) = queue.pop_front() {
        let right = to.0.min(matrix.matrix_width);
        let bottom = to.1.min(matrix.matrix_height);
        let mut col = from.0;
        while col < right {
            let mut row = from.1;
            while row < bottom {
                let span_cols = n.min(right - col);
                let span_rows = n.min(bottom - row);
                let left_g = x0 + col as f64 * gw;
                let top_g = y0 - row as f64 * gh;
                let quad = [
                    left_g,
                    top_g - span_rows as f64 * gh,
                    left_g + span_cols as f64 * gw,
                    top_g,
                ];
                if !features.query(&quad).is_empty() {
                    if n == 1 {
                        push(col, row, &mut requests);
                    } else {
                        queue.push_back(QuadJob {
                            n: n / 2,
                            from: (col, row),
                            to: (col + span_cols, row + span_rows),
                        });
                    }
                }
                row += n;
            }
            col += n;
        }
    }

    Ok(requests)
}
