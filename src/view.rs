//! View composition: z-ordered per-layer draw surfaces flattened, together
//! with the label surface, into one output frame.

use std::collections::HashMap;

use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};

use crate::error::{EngineError, Result};
use crate::registry::MapRegistry;
use crate::render::{render, FontLibrary, LabelEngine, RenderContext};
use crate::style::Style;
use crate::tiles::{TileCompositor, TileFetcher};

/// What a view layer draws: styled vector features or tiled imagery.
pub enum LayerKind {
    Vector { style: Style },
    Tiled { opacity: f32 },
}

/// One entry in the view's layer stack.
pub struct ViewLayer {
    pub layer_id: String,
    pub kind: LayerKind,
    pub index: i32,
    pub visible: bool,
}

/// Owns the layer stack, the offscreen surfaces, the label engine and the
/// fonts, and drives a full render pass.
pub struct MapView {
    width: u32,
    height: u32,
    layers: Vec<ViewLayer>,
    surfaces: HashMap<String, Pixmap>,
    labels: LabelEngine,
    fonts: FontLibrary,
}

impl MapView {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
            surfaces: HashMap::new(),
            labels: LabelEngine::new(),
            fonts: FontLibrary::new(),
        }
    }

    pub fn fonts_mut(&mut self) -> &mut FontLibrary {
        &mut self.fonts
    }

    pub fn labels(&self) -> &LabelEngine {
        &self.labels
    }

    /// Register (or update) a styled vector layer at a z index.
    pub fn register_styled_layer(&mut self, layer_id: &str, style: Style, index: i32, visible: bool) {
        self.upsert(ViewLayer {
            layer_id: layer_id.to_string(),
            kind: LayerKind::Vector { style },
            index,
            visible,
        });
    }

    /// Register (or update) a tiled-imagery layer at a z index.
    pub fn register_tiled_layer(&mut self, layer_id: &str, index: i32, visible: bool, opacity: f32) {
        self.upsert(ViewLayer {
            layer_id: layer_id.to_string(),
            kind: LayerKind::Tiled { opacity },
            index,
            visible,
        });
    }

    fn upsert(&mut self, layer: ViewLayer) {
        match self.layers.iter_mut().find(|l| l.layer_id == layer.layer_id) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
        self.layers.sort_by_key(|l| l.index);
    }

    pub fn delete_layer(&mut self, layer_id: &str) {
        self.layers.retain(|l| l.layer_id != layer_id);
        self.surfaces.remove(layer_id);
    }

    /// Drop all surfaces so the next pass reallocates at the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.surfaces.clear();
    }

    /// Render every visible layer and flatten the result.
    ///
    /// Vector layers query the registry for the features in the ground
    /// extent and run the style evaluator; tiled layers go through the
    /// compositor. Labels collected across all layers draw once at the end,
    /// on top. A layer whose surface cannot be allocated, or whose tile
    /// range is unusable, is skipped with a log entry rather than failing
    /// the frame.
    pub fn render_frame(
        &mut self,
        registry: &MapRegistry,
        tiles: &mut TileCompositor,
        ctx: &RenderContext,
        fetcher: &mut dyn TileFetcher,
    ) -> Result<Pixmap> {
        let width = self.width;
        let height = self.height;

        for surface in self.surfaces.values_mut() {
            surface.fill(Color::TRANSPARENT);
        }
        self.labels.clear();
        tiles.begin_pass();

        let Self {
            layers,
            surfaces,
            labels,
            ..
        } = self;

        for layer in layers.iter().filter(|l| l.visible) {
            if !surfaces.contains_key(&layer.layer_id) {
                match Pixmap::new(width, height) {
                    Some(pixmap) => {
                        surfaces.insert(layer.layer_id.clone(), pixmap);
                    }
                    None => {
                        log::warn!(
                            "no usable draw surface for layer {}, skipping",
                            layer.layer_id
                        );
                        continue;
                    }
                }
            }
            let Some(surface) = surfaces.get_mut(&layer.layer_id) else {
                continue;
            };

            match &layer.kind {
                LayerKind::Vector { style } => {
                    let data = registry.get_features(&layer.layer_id, &ctx.ground_extent);
                    render(&data, style, ctx, surface, labels);
                }
                LayerKind::Tiled { opacity } => {
                    let Some(tiled) = registry.get_tiled_layer(&layer.layer_id) else {
                        log::warn!("tiled layer {} is not registered", layer.layer_id);
                        continue;
                    };
                    if let Err(e) = tiles.render_tiles(tiled, ctx, *opacity, surface, fetcher) {
                        log::error!("tiled layer {}: {e}", layer.layer_id);
                    }
                }
            }
        }

        // All layers registered their candidates; place and draw the labels
        let mut label_surface =
            Pixmap::new(width, height).ok_or(EngineError::SurfaceAllocation { width, height })?;
        self.labels.draw(&mut label_surface, &self.fonts);

        // Flatten in z order, labels on top
        let mut output =
            Pixmap::new(width, height).ok_or(EngineError::SurfaceAllocation { width, height })?;
        let paint = PixmapPaint::default();
        for layer in self.layers.iter().filter(|l| l.visible) {
            if let Some(surface) = self.surfaces.get(&layer.layer_id) {
                if surface.width() == width && surface.height() == height {
                    output.draw_pixmap(0, 0, surface.as_ref(), &paint, Transform::identity(), None);
                }
            }
        }
        output.draw_pixmap(
            0,
            0,
            label_surface.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
        Ok(output)
    }
}
