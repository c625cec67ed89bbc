//! Watermark and export configuration.

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{OvermarkError, OvermarkResult};

/// Accepted text font size range, in pixels.
pub const FONT_SIZE_RANGE_PX: (f64, f64) = (12.0, 200.0);
/// Accepted image watermark size range, in percent.
pub const IMAGE_SIZE_RANGE_PERCENT: (f64, f64) = (10.0, 200.0);
/// Accepted tile spacing range, in pixels.
pub const TILE_SPACING_RANGE_PX: (f64, f64) = (50.0, 500.0);

/// Immutable description of one watermark, consumed per render call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSpec {
    /// Text or image content.
    pub kind: WatermarkKind,
    /// Global alpha in `[0, 1]`.
    pub opacity: f64,
    /// Clockwise rotation in degrees, normalized into `[0, 360)` by [`WatermarkSpec::validate`].
    pub rotation_deg: f64,
    /// Single placement or grid repeat.
    pub tiling: Tiling,
    /// Gap between repeated instances, in surface pixels. Only used when tiling is on.
    pub tile_spacing_px: f64,
}

/// Watermark content variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatermarkKind {
    /// A block of (possibly multi-line) text.
    Text(TextWatermark),
    /// A raster image supplied separately as a decoded asset.
    Image(ImageWatermark),
}

/// Text watermark parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextWatermark {
    /// Text content; `\n` separates lines.
    pub content: String,
    /// Font size in pixels.
    pub font_size_px: f64,
    /// Fill color.
    pub color: Rgba8,
}

/// Image watermark parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageWatermark {
    /// Scale in percent of the normalized natural size.
    pub size_percent: f64,
}

/// Placement mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tiling {
    /// One instance, anchored at the position.
    #[default]
    Off,
    /// A periodic grid covering the surface.
    On,
}

impl Default for TextWatermark {
    fn default() -> Self {
        Self {
            content: "Watermark".to_string(),
            font_size_px: 48.0,
            color: Rgba8::WHITE,
        }
    }
}

impl Default for ImageWatermark {
    fn default() -> Self {
        Self {
            size_percent: 100.0,
        }
    }
}

impl Default for WatermarkKind {
    fn default() -> Self {
        Self::Text(TextWatermark::default())
    }
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            kind: WatermarkKind::default(),
            opacity: 0.8,
            rotation_deg: 0.0,
            tiling: Tiling::Off,
            tile_spacing_px: 200.0,
        }
    }
}

impl WatermarkSpec {
    /// Parse a spec from JSON; missing fields take their defaults. The result is validated.
    pub fn from_json(s: &str) -> OvermarkResult<Self> {
        let spec: Self = serde_json::from_str(s)
            .map_err(|e| OvermarkError::validation(format!("watermark spec json: {e}")))?;
        spec.validate()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> OvermarkResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| OvermarkError::Other(anyhow::Error::new(e)))
    }

    /// Check ranges and normalize rotation into `[0, 360)`.
    pub fn validate(mut self) -> OvermarkResult<Self> {
        check_range("opacity", self.opacity, (0.0, 1.0))?;
        if !self.rotation_deg.is_finite() {
            return Err(OvermarkError::validation("rotation_deg must be finite"));
        }
        self.rotation_deg = self.rotation_deg.rem_euclid(360.0);
        check_range("tile_spacing_px", self.tile_spacing_px, TILE_SPACING_RANGE_PX)?;

        match &self.kind {
            WatermarkKind::Text(t) => {
                check_range("font_size_px", t.font_size_px, FONT_SIZE_RANGE_PX)?;
            }
            WatermarkKind::Image(i) => {
                check_range("size_percent", i.size_percent, IMAGE_SIZE_RANGE_PERCENT)?;
            }
        }
        Ok(self)
    }

    /// `true` when repeat placement is active.
    pub fn is_tiled(&self) -> bool {
        self.tiling == Tiling::On
    }

    /// Text parameters, if this is a text watermark.
    pub fn text(&self) -> Option<&TextWatermark> {
        match &self.kind {
            WatermarkKind::Text(t) => Some(t),
            WatermarkKind::Image(_) => None,
        }
    }

    /// Rotation in radians.
    pub fn rotation_rad(&self) -> f64 {
        self.rotation_deg.to_radians()
    }
}

fn check_range(name: &str, v: f64, (lo, hi): (f64, f64)) -> OvermarkResult<()> {
    if !v.is_finite() || v < lo || v > hi {
        return Err(OvermarkError::validation(format!(
            "{name} must be within [{lo}, {hi}], got {v}"
        )));
    }
    Ok(())
}

/// Output encoding for exported surfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Lossy JPEG; alpha is flattened.
    Jpeg,
    /// WebP; lossy below quality 1, lossless at 1.
    Webp,
}

impl ExportFormat {
    /// MIME type for the format.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }

    /// Whether the encoder honors a quality setting (JPEG and lossy WebP).
    pub fn needs_quality(self) -> bool {
        !matches!(self, Self::Png)
    }
}

/// Export settings shared by single downloads and batch runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Output encoding.
    pub format: ExportFormat,
    /// Encoder quality in `(0, 1]`; ignored for PNG.
    pub quality: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: 0.92,
        }
    }
}

impl ExportOptions {
    /// The quality to hand the encoder, `None` when the format ignores it.
    pub fn effective_quality(&self) -> Option<f32> {
        self.format.needs_quality().then_some(self.quality)
    }

    /// Reject a quality outside `(0, 1]` for formats that use it.
    pub fn validate(self) -> OvermarkResult<Self> {
        if let Some(q) = self.effective_quality() {
            check_quality(q)?;
        }
        Ok(self)
    }
}

pub(crate) fn check_quality(q: f32) -> OvermarkResult<f32> {
    if !q.is_finite() || q <= 0.0 || q > 1.0 {
        return Err(OvermarkError::validation(format!(
            "quality must be within (0, 1], got {q}"
        )));
    }
    Ok(q)
}

#[cfg(test)]
#[path = "../tests/unit/model.rs"]
mod tests;
