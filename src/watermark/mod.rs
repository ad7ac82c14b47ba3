//! Photo watermarking.
//!
//! Downloads are released only as watermarked copies: the photo is fetched
//! by its signed URL, the configured text mark is composited near the
//! top-right corner, and the result is re-encoded as a maximum-quality
//! JPEG. The pipeline is a pure function of the input bytes and the overlay
//! spec; there is no state and no caching of results.
//!
//! Encoder parameters are fixed so identical input produces byte-identical
//! output.

mod text;

pub use text::{render_mark, OverlaySpec};

use std::path::Path;

use ab_glyph::FontArc;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::{ConfigError, WatermarkError};

/// Output JPEG quality. Maximum: the watermark is the only loss the
/// download path is allowed to introduce.
pub const JPEG_QUALITY: u8 = 100;

/// Load the overlay font from disk.
///
/// Called once at startup; an unreadable or unparseable font is a
/// configuration error, not a per-request failure.
pub fn load_font(path: &Path) -> Result<FontArc, ConfigError> {
    let data = std::fs::read(path)
        .map_err(|e| ConfigError::FontUnusable(format!("{}: {e}", path.display())))?;
    FontArc::try_from_vec(data)
        .map_err(|e| ConfigError::FontUnusable(format!("{}: {e}", path.display())))
}

/// Top-right placement for a mark on an image, honoring the margin.
///
/// Coordinates may be negative when the mark is larger than the image;
/// compositing clamps to the visible region.
pub fn corner_position(image_width: u32, mark_width: u32, margin: u32) -> (i64, i64) {
    let x = image_width as i64 - mark_width as i64 - margin as i64;
    let y = margin as i64;
    (x, y)
}

/// Composite a mark onto the target with src-over alpha blending.
///
/// Regions of the mark falling outside the target are clipped.
pub fn composite_mark(target: &mut RgbaImage, mark: &RgbaImage, x: i64, y: i64) {
    let target_w = target.width() as i64;
    let target_h = target.height() as i64;

    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + mark.width() as i64).min(target_w);
    let y_end = (y + mark.height() as i64).min(target_h);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let mx = (tx - x) as u32;
            let my = (ty - y) as u32;

            let top = *mark.get_pixel(mx, my);
            if top[3] == 0 {
                continue;
            }

            let bottom = *target.get_pixel(tx as u32, ty as u32);
            target.put_pixel(tx as u32, ty as u32, blend_over(bottom, top));
        }
    }
}

/// Src-over blend of `top` onto `bottom`.
fn blend_over(bottom: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let ta = top[3] as f32 / 255.0;
    let ba = bottom[3] as f32 / 255.0;

    let out_a = ta + ba * (1.0 - ta);
    if out_a < f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |t: u8, b: u8| -> u8 {
        let t = t as f32 / 255.0;
        let b = b as f32 / 255.0;
        let v = (t * ta + b * ba * (1.0 - ta)) / out_a;
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(top[0], bottom[0]),
        channel(top[1], bottom[1]),
        channel(top[2], bottom[2]),
        (out_a * 255.0).round() as u8,
    ])
}

/// Decode a photo, composite the mark near the top-right corner, and
/// re-encode as a maximum-quality JPEG.
pub fn composite_and_encode(
    source: &[u8],
    mark: &RgbaImage,
    margin: u32,
) -> Result<Bytes, WatermarkError> {
    let photo = image::load_from_memory(source)
        .map_err(|e| WatermarkError::Decode(e.to_string()))?;

    let mut rgba = photo.to_rgba8();
    let (x, y) = corner_position(rgba.width(), mark.width(), margin);
    composite_mark(&mut rgba, mark, x, y);

    // JPEG carries no alpha; drop it after compositing
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| WatermarkError::Encode(e.to_string()))?;

    Ok(Bytes::from(output))
}

// =============================================================================
// Watermarker
// =============================================================================

/// Fetches photos and releases watermarked copies.
pub struct Watermarker {
    http: reqwest::Client,
    mark: RgbaImage,
    margin: u32,
}

impl Watermarker {
    /// Build a watermarker from a loaded font and overlay spec.
    ///
    /// The mark is rendered once here; per-request work is fetch,
    /// composite, encode.
    pub fn new(
        http: reqwest::Client,
        font: &FontArc,
        spec: &OverlaySpec,
    ) -> Result<Self, WatermarkError> {
        let mark = render_mark(font, spec)?;
        Ok(Self::with_mark(http, mark, spec.margin))
    }

    /// Build a watermarker from an already-rendered mark.
    pub fn with_mark(http: reqwest::Client, mark: RgbaImage, margin: u32) -> Self {
        Self { http, mark, margin }
    }

    /// Fetch the photo at `photo_url` and return watermarked JPEG bytes.
    pub async fn watermark_url(&self, photo_url: &str) -> Result<Bytes, WatermarkError> {
        let response = self
            .http
            .get(photo_url)
            .send()
            .await
            .map_err(|e| WatermarkError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatermarkError::Fetch(format!("status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| WatermarkError::Fetch(e.to_string()))?;

        self.watermark_bytes(&body)
    }

    /// Watermark already-fetched photo bytes.
    pub fn watermark_bytes(&self, source: &[u8]) -> Result<Bytes, WatermarkError> {
        composite_and_encode(source, &self.mark, self.margin)
    }
}

// =============================================================================
// Tests
// =============================================================================
