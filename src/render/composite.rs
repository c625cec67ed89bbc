use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::WatermarkAsset;
use crate::assets::decode::{AssetId, PreparedImage};
use crate::foundation::core::Position;
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::model::WatermarkSpec;
use crate::render::geometry::compute_dimensions;
use crate::render::item::{ItemPaint, draw_item};
use crate::render::planner::plan_anchors;
use crate::render::surface::Surface;

/// Draws a background plus watermark instances onto a [`Surface`].
///
/// Keeps converted image paints between calls, keyed by [`AssetId`]; only the most recent
/// background and watermark stay cached.
#[derive(Default)]
pub struct Compositor {
    image_cache: HashMap<AssetId, vello_cpu::Image>,
    last_anchor_count: usize,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("cached_images", &self.image_cache.len())
            .field("last_anchor_count", &self.last_anchor_count)
            .finish()
    }
}

impl Compositor {
    /// Empty compositor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Watermark instances drawn by the last successful call.
    pub fn last_anchor_count(&self) -> usize {
        self.last_anchor_count
    }

    /// Composite `background` and the watermark described by `spec` onto `surface`.
    ///
    /// Everything that can fail (background validity, surface size, watermark readiness, tile
    /// planning) is checked before the first pixel is written, so an error leaves `surface`
    /// untouched. The surface is resized only when its size differs from the background's
    /// natural size.
    #[tracing::instrument(
        skip_all,
        fields(w = background.width, h = background.height, tiled = spec.is_tiled())
    )]
    pub fn composite<'s>(
        &mut self,
        surface: &'s mut Surface,
        background: &PreparedImage,
        spec: &WatermarkSpec,
        position: Position,
        watermark: Option<&WatermarkAsset>,
    ) -> OvermarkResult<&'s mut Surface> {
        if background.is_empty() {
            return Err(OvermarkError::precondition("background image has no pixels"));
        }
        let bg_paint = self.image_paint_for(background)?;

        let dims = compute_dimensions(spec, background.width, background.height, watermark)?;
        let anchors = plan_anchors(
            spec.tiling,
            position,
            background.width,
            background.height,
            dims.rotated_w,
            dims.rotated_h,
            spec.tile_spacing_px,
        )?;

        let item_paint = match watermark {
            Some(WatermarkAsset::Text(block)) => ItemPaint::Text(block),
            Some(WatermarkAsset::Image(image)) => ItemPaint::Image {
                paint: self.image_paint_for(image)?,
                natural_w: f64::from(image.width),
                natural_h: f64::from(image.height),
            },
            None => {
                return Err(OvermarkError::precondition("watermark asset is not ready"));
            }
        };

        if surface.ensure_size(background.width, background.height)? {
            tracing::debug!("surface resized to background");
        }
        surface.clear();

        let (w, h) = surface.dims_u16();
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(bg_paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(background.width),
            f64::from(background.height),
        ));

        for anchor in &anchors {
            draw_item(&mut ctx, spec, *anchor, &dims, &item_paint);
        }

        ctx.flush();
        ctx.render_to_pixmap(surface.pixmap_mut());

        self.last_anchor_count = anchors.len();
        let keep = [Some(background.id), watermark.and_then(|w| w.as_image()).map(|i| i.id)];
        self.image_cache.retain(|id, _| keep.contains(&Some(*id)));

        Ok(surface)
    }

    fn image_paint_for(&mut self, img: &PreparedImage) -> OvermarkResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(&img.id) {
            return Ok(paint.clone());
        }

        let pixmap =
            image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.image_cache.insert(img.id, paint.clone());
        Ok(paint)
    }
}

/// Composite with a fresh [`Compositor`]; the entry point for one-off and batch rendering.
pub fn composite<'s>(
    surface: &'s mut Surface,
    background: &PreparedImage,
    spec: &WatermarkSpec,
    position: Position,
    watermark: Option<&WatermarkAsset>,
) -> OvermarkResult<&'s mut Surface> {
    Compositor::new().composite(surface, background, spec, position, watermark)
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> OvermarkResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| OvermarkError::precondition("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| OvermarkError::precondition("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(OvermarkError::precondition(
            "prepared image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
