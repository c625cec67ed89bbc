use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::font::ResolvedFont;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::foundation::math::Fnv1a64;
use crate::model::TextWatermark;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// One shaped line of a text watermark.
#[derive(Clone)]
pub struct TextLine {
    /// Shaped layout; `None` for empty lines.
    pub layout: Option<Arc<parley::Layout<TextBrushRgba8>>>,
    /// Advance width in pixels.
    pub width: f64,
    /// Natural layout height (ascent + descent + leading) in pixels.
    pub height: f64,
}

/// A text watermark measured and shaped once, drawn many times.
///
/// Measurement and drawing share this value, so both always see the same face and size.
#[derive(Clone)]
pub struct TextBlock {
    content: String,
    font_size_px: f64,
    color: Rgba8,
    lines: Vec<TextLine>,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for TextBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBlock")
            .field("content", &self.content)
            .field("font_size_px", &self.font_size_px)
            .field("lines", &self.lines.len())
            .field("max_width", &self.max_width())
            .finish()
    }
}

impl TextBlock {
    /// Shaped lines, top to bottom.
    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    /// Widest line advance.
    pub fn max_width(&self) -> f64 {
        self.lines.iter().map(|l| l.width).fold(0.0, f64::max)
    }

    /// Font size the block was shaped at.
    pub fn font_size_px(&self) -> f64 {
        self.font_size_px
    }

    /// Vertical distance between consecutive line centers.
    pub fn line_height(&self) -> f64 {
        self.font_size_px * LINE_HEIGHT_FACTOR
    }

    /// Height of the whole block.
    pub fn total_height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height()
    }

    /// Fill color.
    pub fn color(&self) -> Rgba8 {
        self.color
    }

    /// `true` when this block was shaped from exactly these text parameters.
    pub fn matches(&self, text: &TextWatermark) -> bool {
        self.content == text.content
            && self.font_size_px == text.font_size_px
            && self.color == text.color
    }

    pub(crate) fn font_data(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families_by_font: HashMap<u64, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families_by_font: HashMap::new(),
        }
    }

    /// Shape every `\n`-separated line of `text` with `font`.
    pub fn layout_block(
        &mut self,
        text: &TextWatermark,
        font: &ResolvedFont,
    ) -> OvermarkResult<TextBlock> {
        let size_px = text.font_size_px as f32;
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(OvermarkError::validation(
                "text font_size_px must be finite and > 0",
            ));
        }

        let family_name = self.family_for(font)?;
        let brush = TextBrushRgba8::from(text.color);

        let mut lines = Vec::new();
        for raw in text.content.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                lines.push(TextLine {
                    layout: None,
                    width: 0.0,
                    height: 0.0,
                });
                continue;
            }

            let mut builder = self
                .layout_ctx
                .ranged_builder(&mut self.font_ctx, line, 1.0, true);
            builder.push_default(parley::style::StyleProperty::FontStack(
                parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name.clone())),
            ));
            builder.push_default(parley::style::StyleProperty::FontSize(size_px));
            builder.push_default(parley::style::StyleProperty::Brush(brush));

            let mut layout: parley::Layout<TextBrushRgba8> = builder.build(line);
            layout.break_all_lines(None);

            lines.push(TextLine {
                width: f64::from(layout.width()),
                height: f64::from(layout.height()),
                layout: Some(Arc::new(layout)),
            });
        }

        let font_data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
            font.index,
        );

        Ok(TextBlock {
            content: text.content.clone(),
            font_size_px: text.font_size_px,
            color: text.color,
            lines,
            font: font_data,
        })
    }

    fn family_for(&mut self, font: &ResolvedFont) -> OvermarkResult<String> {
        let mut hasher = Fnv1a64::new_default();
        hasher.write_u32(font.index);
        hasher.write_bytes(font.bytes.as_slice());
        let key = hasher.finish();
        if let Some(name) = self.families_by_font.get(&key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            OvermarkError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| OvermarkError::validation("registered font family has no name"))?
            .to_string();
        self.families_by_font.insert(key, family_name.clone());
        Ok(family_name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
