use crate::assets::WatermarkAsset;
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::model::{WatermarkKind, WatermarkSpec};

/// Normalizes image watermark scale against the shorter surface side, so image and text
/// watermarks look comparable at any resolution.
pub const IMAGE_SCALE_REFERENCE_PX: f64 = 500.0;

/// Unrotated content box and its axis-aligned bounds after rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Content width before rotation.
    pub content_w: f64,
    /// Content height before rotation.
    pub content_h: f64,
    /// Width of the rotated content's bounding box.
    pub rotated_w: f64,
    /// Height of the rotated content's bounding box.
    pub rotated_h: f64,
}

/// Compute watermark geometry for a `surface_w` x `surface_h` surface.
///
/// The rotated box only feeds tile spacing; drawing rotates the unrotated content box.
/// Fails with [`OvermarkError::Precondition`] when the asset matching `spec.kind` is not ready.
pub fn compute_dimensions(
    spec: &WatermarkSpec,
    surface_w: u32,
    surface_h: u32,
    asset: Option<&WatermarkAsset>,
) -> OvermarkResult<Dimensions> {
    let (content_w, content_h) = match (&spec.kind, asset) {
        (WatermarkKind::Text(text), Some(WatermarkAsset::Text(block))) => {
            if !block.matches(text) {
                return Err(OvermarkError::precondition(
                    "text layout is stale for the current text settings",
                ));
            }
            (block.max_width(), block.total_height())
        }
        (WatermarkKind::Image(image), Some(WatermarkAsset::Image(asset))) => {
            let scale = image.size_percent / 100.0
                * f64::from(surface_w.min(surface_h))
                / IMAGE_SCALE_REFERENCE_PX;
            (
                f64::from(asset.width) * scale,
                f64::from(asset.height) * scale,
            )
        }
        (WatermarkKind::Text(_), _) => {
            return Err(OvermarkError::precondition("text layout is not ready"));
        }
        (WatermarkKind::Image(_), _) => {
            return Err(OvermarkError::precondition("watermark image is not loaded"));
        }
    };

    let (rotated_w, rotated_h) = rotated_bounds(content_w, content_h, spec.rotation_deg);
    Ok(Dimensions {
        content_w,
        content_h,
        rotated_w,
        rotated_h,
    })
}

/// Axis-aligned bounding box of a `w` x `h` box rotated by `rotation_deg`.
pub fn rotated_bounds(w: f64, h: f64, rotation_deg: f64) -> (f64, f64) {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    (w * cos + h * sin, w * sin + h * cos)
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
