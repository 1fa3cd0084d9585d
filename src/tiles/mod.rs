//! Tiled-imagery compositing: tile-matrix selection, visible index range
//! computation, caching and generation-tagged fetch requests.

mod prefetch;
mod wmts;

pub use prefetch::plan_prefetch;
pub use wmts::{
    Capabilities, CapabilitiesLayer, Contents, Dcp, Dimension, GetEndpoint, HttpDcp,
    OperationMetadata, OperationsMetadata, ResourceUrl, StyleEntry, TileMatrix, TileMatrixSet,
    TileMatrixSetLink, TiledLayer,
};
pub(crate) use wmts::TileUrlSource;

use std::collections::{HashMap, HashSet};

use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::error::{EngineError, Result};
use crate::geom::Extent;
use crate::render::RenderContext;
use crate::units::{pixel_to_ground_factor, MapUnit};

/// The tiling convention assumes one physical pixel is 0.28mm.
pub const WMTS_DPI: f64 = 25.4 / 0.28;

/// A tile the engine wants but does not have, tagged with the render
/// generation that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    pub layer_id: String,
    pub url: String,
    pub matrix_id: String,
    pub col: u64,
    pub row: u64,
    pub generation: u64,
}

/// Host-supplied tile loader. `fetch` is fire-and-forget: the host performs
/// the load however it likes and hands the decoded bitmap back through
/// [`TileCompositor::deliver`].
pub trait TileFetcher {
    fn fetch(&mut self, request: TileRequest);
}

/// A fetcher that drops every request; useful offline and in tests.
pub struct NullFetcher;

impl TileFetcher for NullFetcher {
    fn fetch(&mut self, _request: TileRequest) {}
}

/// Decoded tile bitmaps keyed by layer and URL. Append-only; entries never
/// expire.
#[derive(Default)]
pub struct TileCache {
    entries: HashMap<String, HashMap<String, Pixmap>>,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, layer_id: &str, url: &str) -> Option<&Pixmap> {
        self.entries.get(layer_id).and_then(|layer| layer.get(url))
    }

    pub fn contains(&self, layer_id: &str, url: &str) -> bool {
        self.get(layer_id, url).is_some()
    }

    pub fn insert(&mut self, layer_id: &str, url: &str, tile: Pixmap) {
        self.entries
            .entry(layer_id.to_string())
            .or_default()
            .insert(url.to_string(), tile);
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|layer| layer.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pick the tile matrix for a view scale: scanning in declared order, the
/// matrix with the smallest scale denominator still above the view's wins,
/// falling back to the first matrix at or below it.
pub fn select_tile_matrix(matrices: &[TileMatrix], scale_denom: f64) -> Option<&TileMatrix> {
    let mut tm_min: Option<&TileMatrix> = None;
    let mut tm_max: Option<&TileMatrix> = None;
    for tm in matrices {
        if tm.scale_denominator > scale_denom {
            if tm_min
                .map(|best| tm.scale_denominator < best.scale_denominator)
                .unwrap_or(true)
            {
                tm_min = Some(tm);
            }
        } else if tm_max.is_none() {
            tm_max = Some(tm);
        }
    }
    tm_min.or(tm_max)
}

/// Ground footprint (width, height) of one tile of a matrix, derived from
/// the matrix's own scale denominator at the 0.28mm-per-pixel convention.
pub fn ground_tile_size(matrix: &TileMatrix, unit: MapUnit) -> Result<(f64, f64)> {
    let factor = pixel_to_ground_factor(unit, WMTS_DPI, matrix.scale_denominator)?;
    Ok((
        matrix.tile_width as f64 * factor,
        matrix.tile_height as f64 * factor,
    ))
}

/// Inclusive range of visible tile indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub col_min: u64,
    pub col_max: u64,
    pub row_min: u64,
    pub row_max: u64,
}

/// Project the viewport extent onto the matrix grid, clamped to the matrix
/// bounds. A clamped range that comes out inverted (the extent lies fully
/// off the grid) is an error and the draw is skipped.
pub fn visible_tile_range(
    matrix: &TileMatrix,
    extent: &Extent,
    unit: MapUnit,
) -> Result<TileRange> {
    let (gw, gh) = ground_tile_size(matrix, unit)?;
    let [x0, y0] = matrix.top_left_corner;

    let col_min = ((extent[0] - x0) / gw).floor() as i64;
    let col_max = ((extent[2] - x0) / gw).floor() as i64;
    // Rows count downward from the grid's top edge
    let row_min = ((y0 - extent[3]) / gh).floor() as i64;
    let row_max = ((y0 - extent[1]) / gh).floor() as i64;

    let col_min = col_min.max(0);
    let col_max = col_max.min(matrix.matrix_width as i64 - 1);
    let row_min = row_min.max(0);
    let row_max = row_max.min(matrix.matrix_height as i64 - 1);

    if col_min > col_max || row_min > row_max {
        return Err(EngineError::InvertedTileRange {
            col_min,
            col_max,
            row_min,
            row_max,
        });
    }
    Ok(TileRange {
        col_min: col_min as u64,
        col_max: col_max as u64,
        row_min: row_min as u64,
        row_max: row_max as u64,
    })
}

/// Draws tiled-imagery layers, owning the tile cache and the render
/// generation counter that guards against stale deliveries.
#[derive(Default)]
pub struct TileCompositor {
    cache: TileCache,
    generation: u64,
    requested: HashSet<String>,
}

impl TileCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new render pass: advances the generation (so deliveries for
    /// older viewports are recognized as stale) and forgets which URLs the
    /// previous pass requested.
    pub fn begin_pass(&mut self) -> u64 {
        self.generation += 1;
        self.requested.clear();
        self.generation
    }

    /// Accept a loaded tile. The bitmap is always cached; the return value
    /// says whether it belongs to the current generation, i.e. whether a
    /// re-render would composite it. Stale tiles must not be painted over a
    /// newer viewport.
    pub fn deliver(&mut self, layer_id: &str, url: &str, tile: Pixmap, generation: u64) -> bool {
        self.cache.insert(layer_id, url, tile);
        let fresh = generation == self.generation;
        if !fresh {
            log::debug!(
                "tile {url} arrived for generation {generation}, now at {}",
                self.generation
            );
        }
        fresh
    }

    /// Composite the visible tiles of a layer into `surface`.
    ///
    /// Cached tiles are drawn immediately; misses produce one fetch request
    /// each (per pass) and stay blank this frame. Once the host delivers
    /// them, a follow-up pass composites the full set.
    pub fn render_tiles(
        &mut self,
        layer: &TiledLayer,
        ctx: &RenderContext,
        opacity: f32,
        surface: &mut Pixmap,
        fetcher: &mut dyn TileFetcher,
    ) -> Result<()> {
        let Some(matrix) = select_tile_matrix(&layer.matrix_set.tile_matrix, ctx.scale_denom)
        else {
            log::debug!("layer {}: empty matrix set, nothing to draw", layer.layer_id);
            return Ok(());
        };

        let (gw, gh) = ground_tile_size(matrix, ctx.ground_unit)?;
        let range = visible_tile_range(matrix, &ctx.ground_extent, ctx.ground_unit)?;
        let [x0, y0] = matrix.top_left_corner;
        let g2p = ctx.ground_to_pixel;
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            ..PixmapPaint::default()
        };

        for row in range.row_min..=range.row_max {
            for col in range.col_min..=range.col_max {
                let url = layer.tile_url(&matrix.identifier, col, row);
                if let Some(tile) = self.cache.get(&layer.layer_id, &url) {
                    let gx = x0 + col as f64 * gw;
                    let gy_top = y0 - row as f64 * gh;
                    let [px, py] = ctx.ground_to_media([gx, gy_top]);
                    let sx = (gw * g2p / tile.width() as f64) as f32;
                    let sy = (gh * g2p / tile.height() as f64) as f32;
                    surface.draw_pixmap(
                        0,
                        0,
                        tile.as_ref(),
                        &paint,
                        Transform::from_row(sx, 0.0, 0.0, sy, px as f32, py as f32),
                        None,
                    );
                } else if self.requested.insert(url.clone()) {
                    log::debug!("tile miss {url}");
                    fetcher.fetch(TileRequest {
                        layer_id: layer.layer_id.clone(),
                        url,
                        matrix_id: matrix.identifier.clone(),
                        col,
                        row,
                        generation: self.generation,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Decode PNG bytes into a tile bitmap.
pub fn decode_tile_png(bytes: &[u8]) -> Result<Pixmap> {
    Pixmap::decode_png(bytes).map_err(|e| EngineError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(id: &str, scale: f64, size: u64) -> TileMatrix {
        TileMatrix {
            identifier: id.to_string(),
            scale_denominator: scale,
            top_left_corner: [0.0, 1000.0],
            tile_width: 256,
            tile_height: 256,
            matrix_width: size,
            matrix_height: size,
        }
    }

    fn test_layer(matrices: Vec<TileMatrix>) -> TiledLayer {
        TiledLayer {
            layer_id: "imagery".into(),
            matrix_set: TileMatrixSet {
                identifier: "set".into(),
                supported_crs: "EPSG:3857".into(),
                tile_matrix: matrices,
            },
            url: TileUrlSource::Template("tile://{TileMatrix}/{TileCol}/{TileRow}".into()),
        }
    }

    struct RecordingFetcher(Vec<TileRequest>);

    impl TileFetcher for RecordingFetcher {
        fn fetch(&mut self, request: TileRequest) {
            self.0.push(request);
        }
    }

    #[test]
    fn test_matrix_selection_prefers_next_coarser() {
        let matrices: Vec<TileMatrix> = [100.0, 200.0, 400.0, 800.0]
            .iter()
            .map(|&s| matrix(&format!("{s}"), s, 8))
            .collect();
        let selected = select_tile_matrix(&matrices, 350.0).unwrap();
        assert_eq!(selected.scale_denominator, 400.0);
    }

    #[test]
    fn test_matrix_selection_edges() {
        let matrices: Vec<TileMatrix> = [100.0, 200.0, 400.0, 800.0]
            .iter()
            .map(|&s| matrix(&format!("{s}"), s, 8))
            .collect();
        // Finer than every matrix: fall back to the first at-or-below
        assert_eq!(
            select_tile_matrix(&matrices, 50.0).unwrap().scale_denominator,
            100.0
        );
        // Coarser than every matrix: the coarsest available still above none;
        // first matrix at or below the view wins
        assert_eq!(
            select_tile_matrix(&matrices, 900.0).unwrap().scale_denominator,
            100.0
        );
        // Exact hit is "at or below", not "above"
        assert_eq!(
            select_tile_matrix(&matrices, 400.0).unwrap().scale_denominator,
            800.0
        );
        assert!(select_tile_matrix(&[], 100.0).is_none());
    }

    #[test]
    fn test_ground_tile_size_uses_028mm_convention() {
        let tm = matrix("0", 1000.0, 8);
        let (gw, gh) = ground_tile_size(&tm, MapUnit::M).unwrap();
        // 0.28mm * 1000 = 0.28m per pixel, 256px tiles
        assert!((gw - 0.28 * 1000.0 / 1000.0 * 256.0).abs() < 1e-9);
        assert_eq!(gw, gh);
    }

    #[test]
    fn test_visible_tile_range() {
        // 0.28m/px * 256 = 71.68m tiles at 1:1000, grid top-left (0, 1000)
        let tm = matrix("0", 1000.0, 8);
        let range = visible_tile_range(&tm, &[80.0, 800.0, 220.0, 950.0], MapUnit::M).unwrap();
        assert_eq!(range.col_min, 1);
        assert_eq!(range.col_max, 3);
        // y from 950 down to 800: rows 0..2
        assert_eq!(range.row_min, 0);
        assert_eq!(range.row_max, 2);
    }

    #[test]
    fn test_off_grid_extent_is_inverted_range() {
        let tm = matrix("0", 1000.0, 8);
        // Entirely left of the grid
        let result = visible_tile_range(&tm, &[-500.0, 800.0, -400.0, 900.0], MapUnit::M);
        assert!(matches!(result, Err(EngineError::InvertedTileRange { .. })));
    }

    #[test]
    fn test_render_requests_missing_tiles_once() {
        let layer = test_layer(vec![matrix("0", 1000.0, 8)]);
        let ctx = RenderContext::new(
            [0.0, 860.0, 143.0, 1000.0],
            512,
            512,
            WMTS_DPI,
            1000.0,
            MapUnit::M,
        )
        .unwrap();
        let mut compositor = TileCompositor::new();
        let generation = compositor.begin_pass();
        let mut surface = Pixmap::new(512, 512).unwrap();
        let mut fetcher = RecordingFetcher(Vec::new());

        compositor
            .render_tiles(&layer, &ctx, 1.0, &mut surface, &mut fetcher)
            .unwrap();
        // 2x2 tiles visible, all missing
        assert_eq!(fetcher.0.len(), 4);
        assert!(fetcher.0.iter().all(|r| r.generation == generation));
        // Nothing composited yet
        assert!(surface.pixels().iter().all(|p| p.alpha() == 0));

        // Same pass: no duplicate requests
        compositor
            .render_tiles(&layer, &ctx, 1.0, &mut surface, &mut fetcher)
            .unwrap();
        assert_eq!(fetcher.0.len(), 4);
    }

    #[test]
    fn test_delivered_tiles_composite_on_next_pass() {
        let layer = test_layer(vec![matrix("0", 1000.0, 8)]);
        let ctx = RenderContext::new(
            [0.0, 930.0, 70.0, 1000.0],
            256,
            256,
            WMTS_DPI,
            1000.0,
            MapUnit::M,
        )
        .unwrap();
        let mut compositor = TileCompositor::new();
        let generation = compositor.begin_pass();
        let mut surface = Pixmap::new(256, 256).unwrap();
        let mut fetcher = RecordingFetcher(Vec::new());
        compositor
            .render_tiles(&layer, &ctx, 1.0, &mut surface, &mut fetcher)
            .unwrap();
        assert_eq!(fetcher.0.len(), 1);

        let mut tile = Pixmap::new(256, 256).unwrap();
        tile.fill(tiny_skia::Color::from_rgba8(0, 128, 255, 255));
        let fresh = compositor.deliver(&fetcher.0[0].layer_id, &fetcher.0[0].url, tile, generation);
        assert!(fresh);

        compositor
            .render_tiles(&layer, &ctx, 1.0, &mut surface, &mut fetcher)
            .unwrap();
        let center = surface.pixels()[(128 * 256 + 128) as usize];
        assert_eq!(center.alpha(), 255);
        assert_eq!(center.blue(), 255);
    }

    #[test]
    fn test_stale_delivery_is_flagged() {
        let mut compositor = TileCompositor::new();
        let old_generation = compositor.begin_pass();
        compositor.begin_pass();
        let tile = Pixmap::new(1, 1).unwrap();
        let fresh = compositor.deliver("l", "tile://0/0/0", tile, old_generation);
        assert!(!fresh);
        // Stale tiles still land in the cache for future passes
        assert!(compositor.cache().contains("l", "tile://0/0/0"));
    }

    #[test]
    fn test_empty_matrix_set_renders_nothing() {
        let layer = test_layer(vec![]);
        let ctx = RenderContext::new([0.0, 0.0, 100.0, 100.0], 100, 100, 96.0, 1000.0, MapUnit::M)
            .unwrap();
        let mut compositor = TileCompositor::new();
        compositor.begin_pass();
        let mut surface = Pixmap::new(100, 100).unwrap();
        compositor
            .render_tiles(&layer, &ctx, 1.0, &mut surface, &mut NullFetcher)
            .unwrap();
        assert!(surface.pixels().iter().all(|p| p.alpha() == 0));
    }
}
