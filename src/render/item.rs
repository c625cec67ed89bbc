use crate::assets::text::TextBlock;
use crate::foundation::core::{Affine, Point, Vec2};
use crate::model::WatermarkSpec;
use crate::render::geometry::Dimensions;

/// What one watermark instance paints with, resolved once per composite.
pub(crate) enum ItemPaint<'a> {
    Text(&'a TextBlock),
    Image {
        paint: vello_cpu::Image,
        natural_w: f64,
        natural_h: f64,
    },
}

/// Local drawing state for one instance: transform, opacity layer.
///
/// Dropping the scope pops the layer and resets transforms, so the next instance (or the caller)
/// never inherits them, whichever way drawing exits.
struct ItemScope<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
    layered: bool,
}

impl<'a> ItemScope<'a> {
    fn enter(ctx: &'a mut vello_cpu::RenderContext, opacity: f32) -> Self {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let layered = opacity < 1.0;
        if layered {
            ctx.push_opacity_layer(opacity);
        }
        Self { ctx, layered }
    }
}

impl Drop for ItemScope<'_> {
    fn drop(&mut self) {
        if self.layered {
            self.ctx.pop_layer();
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

/// Draw one watermark instance centered on `anchor`, rotated by `spec.rotation_deg`.
pub(crate) fn draw_item(
    ctx: &mut vello_cpu::RenderContext,
    spec: &WatermarkSpec,
    anchor: Point,
    dims: &Dimensions,
    paint: &ItemPaint<'_>,
) {
    let opacity = spec.opacity.clamp(0.0, 1.0) as f32;
    if opacity <= 0.0 {
        return;
    }

    let base = Affine::translate(anchor.to_vec2()) * Affine::rotate(spec.rotation_rad());
    let scope = ItemScope::enter(ctx, opacity);

    match paint {
        ItemPaint::Text(block) => draw_text_lines(&mut *scope.ctx, base, block),
        ItemPaint::Image {
            paint,
            natural_w,
            natural_h,
        } => {
            if *natural_w <= 0.0 || *natural_h <= 0.0 {
                return;
            }
            let transform = base
                * Affine::translate(Vec2::new(-dims.content_w / 2.0, -dims.content_h / 2.0))
                * Affine::scale_non_uniform(dims.content_w / natural_w, dims.content_h / natural_h);
            scope.ctx.set_transform(affine_to_cpu(transform));
            scope.ctx.set_paint(paint.clone());
            scope
                .ctx
                .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, *natural_w, *natural_h));
        }
    }
}

/// Each line is centered horizontally; the block is centered vertically on the anchor.
fn draw_text_lines(ctx: &mut vello_cpu::RenderContext, base: Affine, block: &TextBlock) {
    let line_height = block.line_height();
    let first_center_y = -(block.total_height() - line_height) / 2.0;

    for (i, line) in block.lines().iter().enumerate() {
        let Some(layout) = &line.layout else {
            continue;
        };
        let center_y = first_center_y + i as f64 * line_height;
        let origin = Vec2::new(-line.width / 2.0, center_y - line.height / 2.0);
        ctx.set_transform(affine_to_cpu(base * Affine::translate(origin)));

        for layout_line in layout.lines() {
            for item in layout_line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(block.font_data())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}
