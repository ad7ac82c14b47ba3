//! Overlay text rasterization.
//!
//! Renders the configured mark (e.g. `"@gatefold."`) to a transparent RGBA
//! image using a font supplied at startup. Rendering is deterministic for a
//! fixed font and spec, which keeps the whole watermark pipeline
//! byte-reproducible.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::error::WatermarkError;

/// White fill used for the mark.
const MARK_COLOR: [u8; 3] = [255, 255, 255];

/// Fixed spec for the overlay mark.
#[derive(Debug, Clone)]
pub struct OverlaySpec {
    /// Text composited onto each photo
    pub text: String,

    /// Font size in pixels
    pub font_size: f32,

    /// Opacity in (0, 1]
    pub opacity: f32,

    /// Margin from the image corner in pixels
    pub margin: u32,
}

impl Default for OverlaySpec {
    fn default() -> Self {
        Self {
            text: "@gatefold.".to_string(),
            font_size: 45.0,
            opacity: 0.8,
            margin: 20,
        }
    }
}

/// Measure the rendered text, returning (width, height) in pixels.
fn measure(font: &FontArc, text: &str, font_size: f32) -> (u32, u32) {
    let scale = PxScale::from(font_size);
    let scaled = font.as_scaled(scale);

    let mut width = 0.0f32;
    let mut prev: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }

    // one pixel of slack keeps the last glyph's antialiased edge on-canvas
    (width.ceil() as u32 + 2, scaled.height().ceil() as u32 + 2)
}

/// Render the mark to a transparent RGBA image.
pub fn render_mark(font: &FontArc, spec: &OverlaySpec) -> Result<RgbaImage, WatermarkError> {
    if spec.text.is_empty() {
        return Err(WatermarkError::Render("empty overlay text".to_string()));
    }

    let scale = PxScale::from(spec.font_size);
    let scaled = font.as_scaled(scale);

    let (width, height) = measure(font, &spec.text, spec.font_size);
    let mut canvas = RgbaImage::new(width.max(1), height.max(1));

    let max_alpha = (spec.opacity.clamp(0.0, 1.0) * 255.0) as u8;
    let baseline_y = scaled.ascent();

    let mut cursor_x = 0.0f32;
    let mut prev: Option<ab_glyph::GlyphId> = None;

    for c in spec.text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            cursor_x += scaled.kern(prev, id);
        }

        let glyph = id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();

            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;

                if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height()
                {
                    let alpha = (coverage * max_alpha as f32) as u8;
                    let pixel = Rgba([MARK_COLOR[0], MARK_COLOR[1], MARK_COLOR[2], alpha]);

                    // glyphs can overlap at their antialiased edges
                    let existing = canvas.get_pixel(x as u32, y as u32);
                    let merged = if existing[3] >= pixel[3] { *existing } else { pixel };
                    canvas.put_pixel(x as u32, y as u32, merged);
                }
            });
        }

        cursor_x += scaled.h_advance(id);
        prev = Some(id);
    }

    Ok(canvas)
}
