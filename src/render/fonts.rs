//! Font registry, text measurement and glyph rasterization.
//!
//! Font bytes are supplied by the host (asset loading lives outside the
//! engine). A label whose face cannot be resolved degrades to a skipped
//! draw, never an error.

use std::collections::HashMap;

use rusttype::{point, Font, Scale};
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

use crate::error::{EngineError, Result};

/// Pixel-space text measurements.
#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub ascent: f64,
    pub descent: f64,
}

impl TextMetrics {
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// Named font faces; the first registered face doubles as the default.
#[derive(Default)]
pub struct FontLibrary {
    faces: HashMap<String, Font<'static>>,
    default_face: Option<String>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face from raw font bytes.
    pub fn register(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        let font =
            Font::try_from_vec(data).ok_or_else(|| EngineError::FontLoad(name.to_string()))?;
        if self.default_face.is_none() {
            self.default_face = Some(name.to_string());
        }
        self.faces.insert(name.to_string(), font);
        Ok(())
    }

    pub fn set_default(&mut self, name: &str) {
        if self.faces.contains_key(name) {
            self.default_face = Some(name.to_string());
        }
    }

    /// Face by family name, falling back to the default face.
    pub fn face(&self, family: Option<&str>) -> Option<&Font<'static>> {
        family
            .and_then(|name| self.faces.get(name))
            .or_else(|| self.default_face.as_ref().and_then(|d| self.faces.get(d)))
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Measure a single-line text at the given pixel size.
    pub fn measure(&self, font: &Font, text: &str, size_px: f64) -> TextMetrics {
        let scale = Scale::uniform(size_px as f32);
        let v = font.v_metrics(scale);
        let width = font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        TextMetrics {
            width: width as f64,
            ascent: v.ascent as f64,
            descent: (-v.descent) as f64,
        }
    }
}

/// Rasterize a text run with its baseline at `(x, baseline_y)`.
pub fn draw_text_run(
    surface: &mut Pixmap,
    font: &Font,
    text: &str,
    x: f64,
    baseline_y: f64,
    size_px: f64,
    color: Color,
) {
    let scale = Scale::uniform(size_px as f32);
    for glyph in font.layout(text, scale, point(x as f32, baseline_y as f32)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                blend_pixel(
                    surface,
                    bb.min.x + gx as i32,
                    bb.min.y + gy as i32,
                    color,
                    coverage,
                );
            });
        }
    }
}

/// Source-over blend of one covered pixel into a premultiplied surface.
fn blend_pixel(surface: &mut Pixmap, x: i32, y: i32, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x >= surface.width() as i32 || y >= surface.height() as i32 {
        return;
    }
    let alpha = color.alpha() * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let idx = y as usize * surface.width() as usize + x as usize;
    let pixels = surface.pixels_mut();
    let dst = pixels[idx];
    let inv = 1.0 - alpha;

    let r = color.red() * alpha + dst.red() as f32 / 255.0 * inv;
    let g = color.green() * alpha + dst.green() as f32 / 255.0 * inv;
    let b = color.blue() * alpha + dst.blue() as f32 / 255.0 * inv;
    let a = alpha + dst.alpha() as f32 / 255.0 * inv;

    let au = (a * 255.0).round().clamp(0.0, 255.0) as u8;
    let ru = ((r * 255.0).round() as u8).min(au);
    let gu = ((g * 255.0).round() as u8).min(au);
    let bu = ((b * 255.0).round() as u8).min(au);
    if let Some(px) = PremultipliedColorU8::from_rgba(ru, gu, bu, au) {
        pixels[idx] = px;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_library_resolves_nothing() {
        let fonts = FontLibrary::new();
        assert!(fonts.is_empty());
        assert!(fonts.face(None).is_none());
        assert!(fonts.face(Some("Roboto")).is_none());
    }

    #[test]
    fn test_bad_font_data_is_rejected() {
        let mut fonts = FontLibrary::new();
        let result = fonts.register("broken", vec![0u8; 16]);
        assert!(matches!(result, Err(EngineError::FontLoad(_))));
        assert!(fonts.is_empty());
    }

    #[test]
    fn test_blend_pixel_accumulates_alpha() {
        let mut surface = Pixmap::new(4, 4).unwrap();
        let red = Color::from_rgba8(255, 0, 0, 255);
        blend_pixel(&mut surface, 1, 1, red, 1.0);
        let px = surface.pixels()[5];
        assert_eq!(px.alpha(), 255);
        assert_eq!(px.red(), 255);
        // Half coverage over the solid red shifts nothing but keeps bounds
        blend_pixel(&mut surface, 1, 1, Color::from_rgba8(0, 0, 255, 255), 0.5);
        let px = surface.pixels()[5];
        assert_eq!(px.alpha(), 255);
        assert!(px.blue() > 100 && px.red() > 100);
    }

    #[test]
    fn test_blend_pixel_ignores_out_of_bounds() {
        let mut surface = Pixmap::new(2, 2).unwrap();
        let c = Color::from_rgba8(255, 255, 255, 255);
        blend_pixel(&mut surface, -1, 0, c, 1.0);
        blend_pixel(&mut surface, 2, 0, c, 1.0);
        blend_pixel(&mut surface, 0, 5, c, 1.0);
        assert!(surface.pixels().iter().all(|p| p.alpha() == 0));
    }
}
