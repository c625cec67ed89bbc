//! Surface to encoded bytes.

use std::io::Cursor;

use anyhow::Context;
use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;

use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::model::{ExportFormat, ExportOptions, check_quality};
use crate::render::surface::Surface;

/// Encode the surface's current pixels.
///
/// `quality` is in `(0, 1]` and affects JPEG and WebP; `None` uses the default of 0.92. PNG is
/// lossless, and so is WebP at quality 1. JPEG has no alpha channel, so translucent pixels are
/// flattened onto black.
pub fn encode(
    surface: &Surface,
    format: ExportFormat,
    quality: Option<f32>,
) -> OvermarkResult<Vec<u8>> {
    let (w, h) = (surface.width(), surface.height());
    let mut out = Vec::new();

    let quality = check_quality(quality.unwrap_or(ExportOptions::default().quality));
    let res = match format {
        ExportFormat::Png => PngEncoder::new(Cursor::new(&mut out))
            .write_image(&surface.to_rgba8(), w, h, image::ExtendedColorType::Rgba8)
            .context("png encode"),
        ExportFormat::Jpeg => {
            let q = (quality? * 100.0).round().clamp(1.0, 100.0) as u8;
            let rgb = flatten_premul_to_rgb8(surface.data_premul());
            JpegEncoder::new_with_quality(Cursor::new(&mut out), q)
                .write_image(&rgb, w, h, image::ExtendedColorType::Rgb8)
                .context("jpeg encode")
        }
        ExportFormat::Webp => {
            let q = quality?;
            let rgba = surface.to_rgba8();
            if q >= 1.0 {
                WebPEncoder::new_lossless(Cursor::new(&mut out))
                    .write_image(&rgba, w, h, image::ExtendedColorType::Rgba8)
                    .context("webp encode")
            } else {
                webp::Encoder::from_rgba(&rgba, w, h)
                    .encode_simple(false, q * 100.0)
                    .map(|mem| out.extend_from_slice(&mem))
                    .map_err(|e| anyhow::anyhow!("{e:?}"))
                    .context("webp encode")
            }
        }
    };
    res.map_err(|e| OvermarkError::encode(format!("{e:#}")))?;

    tracing::debug!(format = format.extension(), bytes = out.len(), "surface encoded");
    Ok(out)
}

/// Encode with export options.
pub fn encode_with(surface: &Surface, options: &ExportOptions) -> OvermarkResult<Vec<u8>> {
    encode(surface, options.format, options.effective_quality())
}

/// Download name for an exported file: `<stem>-watermarked.<ext>`.
///
/// A trailing `.ext` (at least one character, no `/`) is dropped; anything else is kept whole,
/// so `.env` leaves an empty stem and `file.` keeps its dot.
pub fn watermarked_filename(original: &str, format: ExportFormat) -> String {
    let stem = match original.rfind('.') {
        Some(i) if i + 1 < original.len() && !original[i + 1..].contains('/') => &original[..i],
        _ => original,
    };
    format!("{stem}-watermarked.{}", format.extension())
}

// Premultiplied color over black is the premultiplied color itself.
fn flatten_premul_to_rgb8(premul: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(premul.len() / 4 * 3);
    for px in premul.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}

#[cfg(test)]
#[path = "../tests/unit/encode.rs"]
mod tests;
