//! Collision-avoidant label placement.
//!
//! Candidates accumulate across every layer of a render pass, then one draw
//! pass places them against a fresh collision index: eight placements are
//! tried around each anchor in a fixed order and the first free rectangle
//! wins; a label whose eight placements all collide is dropped.

use geojson::{Feature, Value};
use rstar::{RTree, RTreeObject, AABB};
use tiny_skia::{Color, Pixmap};

use crate::geom::{anchor_points, Extent};
use crate::style::{Fill, Label, Stroke};

use super::fonts::{draw_text_run, FontLibrary};
use super::RenderContext;

const PADDING: f64 = 2.0;
const DEFAULT_FONT_SIZE: f64 = 12.0;

/// A label registered during the layer pass, carrying everything needed to
/// resolve and draw it later.
pub struct LabelCandidate {
    pub geometry: Value,
    pub feature: Feature,
    pub label: Label,
    pub context: RenderContext,
}

#[derive(Debug, Clone, Copy)]
struct PlacedRect {
    min: [f64; 2],
    max: [f64; 2],
}

impl RTreeObject for PlacedRect {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// The eight placement rectangles around an anchor, in preference order:
/// above-right, above-center, right-center, above-left, below-right,
/// left-center, below-center, below-left.
pub fn placement_candidates(ax: f64, ay: f64, w: f64, h: f64) -> [Extent; 8] {
    [
        [ax, ay - h, ax + w, ay],
        [ax - w / 2.0, ay - h, ax + w / 2.0, ay],
        [ax, ay - h / 2.0, ax + w, ay + h / 2.0],
        [ax - w, ay - h, ax, ay],
        [ax, ay, ax + w, ay + h],
        [ax - w, ay - h / 2.0, ax, ay + h / 2.0],
        [ax - w / 2.0, ay, ax + w / 2.0, ay + h],
        [ax - w, ay, ax, ay + h],
    ]
}

fn solid_color(fill: &Fill, fallback: Color) -> Color {
    match fill {
        Fill::SolidFill(solid) => {
            crate::style::resolve_color(&solid.color, solid.opacity.unwrap_or(1.0))
        }
        Fill::HatchedFill(_) => fallback,
    }
}

/// Stamp a text run at offsets on a ring of the given radius, used for both
/// halos and label strokes.
fn stamp_ring(
    surface: &mut Pixmap,
    font: &rusttype::Font,
    text: &str,
    x: f64,
    baseline: f64,
    size: f64,
    radius: f64,
    color: Color,
) {
    if radius <= 0.0 {
        return;
    }
    for step in 0..8 {
        let angle = step as f64 / 8.0 * std::f64::consts::TAU;
        draw_text_run(
            surface,
            font,
            text,
            x + radius * angle.cos(),
            baseline + radius * angle.sin(),
            size,
            color,
        );
    }
}

/// Per-render-pass label store and placement engine.
#[derive(Default)]
pub struct LabelEngine {
    candidates: Vec<LabelCandidate>,
}

impl LabelEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all candidates; called at the start of each render pass.
    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    pub fn register(&mut self, candidate: LabelCandidate) {
        self.candidates.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[LabelCandidate] {
        &self.candidates
    }

    /// Place and draw every candidate against a fresh collision index.
    pub fn draw(&self, surface: &mut Pixmap, fonts: &FontLibrary) {
        let mut placed: RTree<PlacedRect> = RTree::new();

        for candidate in &self.candidates {
            let ctx = &candidate.context;
            let label = &candidate.label;

            let Some(text) = label.text_label.resolve(&candidate.feature) else {
                continue;
            };
            if text.is_empty() {
                continue;
            }

            let family = label
                .font
                .as_ref()
                .and_then(|f| f.font_family.as_ref())
                .and_then(|pv| pv.resolve(&candidate.feature));
            let Some(font) = fonts.face(family.as_deref()) else {
                log::warn!("no usable font face for label {text:?}, skipping");
                continue;
            };

            let font_ctx = ctx.scoped(label.font.as_ref().and_then(|f| f.uom));
            let font_size = label
                .font
                .as_ref()
                .and_then(|f| f.font_size.as_ref())
                .and_then(|pv| pv.resolve(&candidate.feature))
                .map(|v| font_ctx.to_pixel(v))
                .unwrap_or(DEFAULT_FONT_SIZE)
                .max(1.0);

            let metrics = fonts.measure(font, &text, font_size);
            let w = metrics.width + 2.0 * PADDING;
            let h = metrics.height() + 2.0 * PADDING;

            let halo = label.halo.as_ref().map(|halo| {
                let halo_ctx = ctx.scoped(halo.uom);
                let radius = halo
                    .radius
                    .as_ref()
                    .and_then(|pv| pv.resolve(&candidate.feature))
                    .map(|v| halo_ctx.to_pixel_with_reference(v, font_size))
                    .unwrap_or(1.0);
                (radius, solid_color(&halo.fill, Color::WHITE))
            });

            for anchor in anchor_points(&candidate.geometry, false) {
                let rects = placement_candidates(anchor.x, anchor.y, w, h);
                let Some(rect) = rects.iter().find(|r| {
                    placed
                        .locate_in_envelope_intersecting(&AABB::from_corners(
                            [r[0], r[1]],
                            [r[2], r[3]],
                        ))
                        .next()
                        .is_none()
                }) else {
                    log::debug!("label {text:?} dropped: all placements collide");
                    continue;
                };
                placed.insert(PlacedRect {
                    min: [rect[0], rect[1]],
                    max: [rect[2], rect[3]],
                });

                let tx = rect[0] + PADDING;
                let baseline = rect[1] + PADDING + metrics.ascent;

                if let Some((radius, color)) = halo {
                    stamp_ring(surface, font, &text, tx, baseline, font_size, radius, color);
                }
                if let Some(Stroke::PenStroke(pen)) = label.stroke.as_deref() {
                    let color = solid_color(&pen.fill, Color::BLACK);
                    let width = super::stroke::stroke_width(pen, &candidate.feature, ctx);
                    stamp_ring(
                        surface,
                        font,
                        &text,
                        tx,
                        baseline,
                        font_size,
                        (width / 2.0).max(0.5),
                        color,
                    );
                }

                let fill_color = label
                    .fill
                    .as_ref()
                    .map(|f| solid_color(f, Color::BLACK))
                    .unwrap_or(Color::BLACK);
                draw_text_run(surface, font, &text, tx, baseline, font_size, fill_color);
            }
        }
    }
}
