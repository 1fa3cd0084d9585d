//! Text symbolizer drawing.
//!
//! Text is never painted during the layer pass: a text symbolizer registers
//! a label candidate with the label engine, and placement plus the actual
//! glyph drawing happen once after all layers have rendered.

use geojson::{Feature, Value};

use crate::style::Label;

use super::labels::{LabelCandidate, LabelEngine};
use super::RenderContext;

/// Register a label candidate for later collision-avoidant placement.
pub fn draw_text(
    label: &Label,
    geometry: &Value,
    feature: &Feature,
    ctx: &RenderContext,
    labels: &mut LabelEngine,
) {
    let scoped = ctx.scoped(label.uom);
    labels.register(LabelCandidate {
        geometry: geometry.clone(),
        feature: feature.clone(),
        label: label.clone(),
        context: scoped,
    });
}
