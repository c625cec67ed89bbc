use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::math::{Fnv1a64, premultiply_rgba8_in_place};

/// Stable content-derived identifier for a decoded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(pub(crate) u64);

impl AssetId {
    /// Access the raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Decoded raster image in premultiplied RGBA8 form, at its natural size.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Content hash of dimensions and pixels.
    pub id: AssetId,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap premultiplied RGBA8 pixels, checking the buffer length.
    pub fn from_premul_rgba8(
        width: u32,
        height: u32,
        rgba8_premul: Vec<u8>,
    ) -> OvermarkResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| OvermarkError::decode("image dimensions overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(OvermarkError::decode(format!(
                "image byte length {} does not match {width}x{height}",
                rgba8_premul.len()
            )));
        }

        let mut hasher = Fnv1a64::new_default();
        hasher.write_u32(width);
        hasher.write_u32(height);
        hasher.write_bytes(&rgba8_premul);

        Ok(Self {
            id: AssetId(hasher.finish()),
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// `true` when the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Decode encoded image bytes (PNG, JPEG, WebP, ...) and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> OvermarkResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| OvermarkError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(OvermarkError::decode("image has zero width or height"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    PreparedImage::from_premul_rgba8(width, height, rgba8_premul)
}

/// Sniff whether `bytes` look like an image format the decoder understands.
pub fn is_supported_image(bytes: &[u8]) -> bool {
    image::guess_format(bytes).is_ok_and(|f| f.reading_enabled())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
