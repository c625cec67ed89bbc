use std::sync::Arc;

use crate::assets::WatermarkAsset;
use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::font::{FontSource, ResolvedFont, resolve_font};
use crate::assets::slot::{AssetSlot, LoadOutcome, LoadTicket, SlotKind};
use crate::assets::text::{TextBlock, TextLayoutEngine};
use crate::encode::encode_with;
use crate::foundation::core::{Point, Position};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::model::{ExportOptions, WatermarkKind, WatermarkSpec};
use crate::render::composite::Compositor;
use crate::render::surface::Surface;
use crate::session::drag::{DragController, SurfaceRect};
use crate::session::scheduler::{FrameScheduler, Redraw};

/// Handle returned by [`EditorSession::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What one [`EditorSession::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing was pending.
    Idle,
    /// A redraw is pending but a required asset is missing; it stays pending.
    Deferred,
    /// An intermediate frame was drawn; subscribers were not notified.
    Drawn,
    /// A committed frame was drawn and subscribers were notified.
    Committed,
}

type SurfaceListener = Box<dyn FnMut(&Surface)>;

/// Interactive editing state: the single owner of the watermark spec, committed position,
/// decoded assets and the shared surface.
///
/// Mutators only update state and mark a redraw; pixels change exclusively inside
/// [`EditorSession::tick`], which the host calls once per display frame.
pub struct EditorSession {
    spec: WatermarkSpec,
    position: Position,

    background: AssetSlot<PreparedImage>,
    watermark_image: AssetSlot<PreparedImage>,

    font_source: FontSource,
    font: Option<ResolvedFont>,
    text_engine: TextLayoutEngine,
    text_block: Option<Arc<TextBlock>>,

    surface: Option<Surface>,
    surface_ready: bool,
    compositor: Compositor,

    drag: DragController,
    display_rect: Option<SurfaceRect>,
    scheduler: FrameScheduler,

    listeners: Vec<(SubscriptionId, SurfaceListener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("spec", &self.spec)
            .field("position", &self.position)
            .field("surface", &self.surface)
            .field("dragging", &self.drag.is_dragging())
            .field("pending", &self.scheduler.pending())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EditorSession {
    /// Session with the default watermark spec.
    pub fn new(font_source: FontSource) -> Self {
        Self {
            spec: WatermarkSpec::default(),
            position: Position::CENTER,
            background: AssetSlot::new(SlotKind::Background),
            watermark_image: AssetSlot::new(SlotKind::Watermark),
            font_source,
            font: None,
            text_engine: TextLayoutEngine::new(),
            text_block: None,
            surface: None,
            surface_ready: false,
            compositor: Compositor::new(),
            drag: DragController::new(),
            display_rect: None,
            scheduler: FrameScheduler::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Session starting from `spec` (validated).
    pub fn with_spec(font_source: FontSource, spec: WatermarkSpec) -> OvermarkResult<Self> {
        let mut session = Self::new(font_source);
        session.spec = spec.validate()?;
        Ok(session)
    }

    /// Replace the watermark spec.
    ///
    /// Turning tiling on cancels an active drag. Text settings are re-laid out right away; a
    /// layout failure is returned but the spec is kept, and the next tick retries.
    pub fn set_spec(&mut self, spec: WatermarkSpec) -> OvermarkResult<()> {
        let spec = spec.validate()?;
        if spec.is_tiled() && self.drag.cancel() {
            tracing::debug!("tiling enabled, active drag cancelled");
        }
        self.spec = spec;
        self.scheduler.request(Redraw::Committed);
        self.relayout_text()
    }

    /// Switch the font used for text watermarks.
    pub fn set_font(&mut self, font_source: FontSource) -> OvermarkResult<()> {
        self.font_source = font_source;
        self.font = None;
        self.text_block = None;
        self.scheduler.request(Redraw::Committed);
        self.relayout_text()
    }

    /// Move the committed position directly, ending any drag.
    pub fn set_position(&mut self, position: Position) {
        self.drag.cancel();
        self.position = position.clamped();
        self.scheduler.request(Redraw::Committed);
    }

    /// Start loading a background image; any load still in flight becomes stale.
    pub fn begin_background_load(&mut self) -> LoadTicket {
        self.background.begin()
    }

    /// Hand a decoded background back to the session.
    ///
    /// A current load resets the position to the center, ends any drag and sizes the surface to
    /// the image once. Stale results are dropped.
    pub fn finish_background_load(
        &mut self,
        ticket: LoadTicket,
        image: PreparedImage,
    ) -> OvermarkResult<LoadOutcome> {
        if !self.background.is_current(ticket) {
            return Ok(self.background.finish(ticket, image));
        }

        let sized = match self.surface.as_mut() {
            Some(surface) => surface.ensure_size(image.width, image.height).map(|_| ()),
            None => Surface::for_image(&image).map(|s| self.surface = Some(s)),
        };
        if let Err(e) = sized {
            self.background.fail(ticket);
            return Err(e);
        }

        let outcome = self.background.finish(ticket, image);
        self.position = Position::CENTER;
        self.drag.cancel();
        self.surface_ready = false;
        self.scheduler.request(Redraw::Committed);
        tracing::debug!(generation = ticket.generation(), "background applied");
        Ok(outcome)
    }

    /// Report a failed background decode. Returns `false` for stale tickets.
    pub fn fail_background_load(&mut self, ticket: LoadTicket) -> bool {
        let failed = self.background.fail(ticket);
        if failed {
            self.drag.cancel();
            self.surface_ready = false;
        }
        failed
    }

    /// Decode `bytes` and apply them as the background in one step.
    pub fn load_background(&mut self, bytes: &[u8]) -> OvermarkResult<LoadOutcome> {
        let ticket = self.begin_background_load();
        match decode_image(bytes) {
            Ok(image) => self.finish_background_load(ticket, image),
            Err(e) => {
                self.fail_background_load(ticket);
                Err(e)
            }
        }
    }

    /// Start loading a watermark image; any load still in flight becomes stale.
    pub fn begin_watermark_load(&mut self) -> LoadTicket {
        self.watermark_image.begin()
    }

    /// Hand a decoded watermark image back to the session. Stale results are dropped.
    pub fn finish_watermark_load(
        &mut self,
        ticket: LoadTicket,
        image: PreparedImage,
    ) -> LoadOutcome {
        let outcome = self.watermark_image.finish(ticket, image);
        if outcome == LoadOutcome::Applied {
            self.scheduler.request(Redraw::Committed);
        }
        outcome
    }

    /// Report a failed watermark decode. Returns `false` for stale tickets.
    pub fn fail_watermark_load(&mut self, ticket: LoadTicket) -> bool {
        let failed = self.watermark_image.fail(ticket);
        if failed {
            self.surface_ready = false;
            self.scheduler.request(Redraw::Committed);
        }
        failed
    }

    /// Decode `bytes` and apply them as the watermark image in one step.
    pub fn load_watermark(&mut self, bytes: &[u8]) -> OvermarkResult<LoadOutcome> {
        let ticket = self.begin_watermark_load();
        match decode_image(bytes) {
            Ok(image) => Ok(self.finish_watermark_load(ticket, image)),
            Err(e) => {
                self.fail_watermark_load(ticket);
                Err(e)
            }
        }
    }

    /// Drop the watermark image and invalidate its in-flight loads.
    pub fn release_watermark(&mut self) {
        self.watermark_image.release();
        self.surface_ready = false;
        self.scheduler.request(Redraw::Committed);
    }

    /// Drop every held asset and the surface; in-flight loads become stale.
    pub fn release(&mut self) {
        self.drag.cancel();
        self.background.release();
        self.watermark_image.release();
        self.text_block = None;
        self.surface = None;
        self.surface_ready = false;
        self.scheduler.cancel();
    }

    /// Where the surface is currently displayed. Captured by the next pointer-down.
    pub fn set_display_rect(&mut self, rect: SurfaceRect) {
        self.display_rect = Some(rect);
    }

    /// Start dragging. No-op while tiling is on, before a background exists, or without a
    /// display rect.
    pub fn on_pointer_down(&mut self, point: Point) -> bool {
        let Some(rect) = self.display_rect else {
            return false;
        };
        if self.background.get().is_none() {
            return false;
        }
        self.drag
            .pointer_down(point, rect, self.position, self.spec.tiling)
    }

    /// Update the live drag position and schedule a preview frame.
    pub fn on_pointer_move(&mut self, point: Point) {
        if self.drag.pointer_move(point).is_some() {
            self.scheduler.request(Redraw::Preview);
        }
    }

    /// Commit the live position and schedule the committed frame.
    pub fn on_pointer_up(&mut self) {
        self.end_drag();
    }

    /// Same as [`EditorSession::on_pointer_up`].
    pub fn on_pointer_leave(&mut self) {
        self.end_drag();
    }

    fn end_drag(&mut self) {
        let Some(release) = self.drag.release() else {
            return;
        };
        if let Some(live) = release.live {
            self.position = live;
        }
        tracing::debug!(x = self.position.x, y = self.position.y, "drag committed");
        self.scheduler.request(Redraw::Committed);
    }

    /// Register a callback invoked with the surface after every committed frame.
    pub fn subscribe(&mut self, listener: impl FnMut(&Surface) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a callback. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(i, _)| *i != id);
        self.listeners.len() != before
    }

    /// Run one display frame: redraw if something is pending and the assets are ready.
    ///
    /// A failed frame is dropped (the error is returned) and the next mutation schedules a fresh
    /// one, so the loop keeps running.
    pub fn tick(&mut self) -> OvermarkResult<FrameOutcome> {
        let Some(kind) = self.scheduler.pending() else {
            return Ok(FrameOutcome::Idle);
        };
        if self.background.get().is_none() || self.surface.is_none() {
            return Ok(FrameOutcome::Deferred);
        }

        let asset = if self.spec.text().is_some() {
            if let Err(e) = self.relayout_text() {
                return Err(self.drop_frame(e));
            }
            match &self.text_block {
                Some(block) => WatermarkAsset::Text(Arc::clone(block)),
                None => return Ok(FrameOutcome::Deferred),
            }
        } else {
            match self.watermark_image.get() {
                Some(image) => WatermarkAsset::Image(image.clone()),
                None => return Ok(FrameOutcome::Deferred),
            }
        };

        let position = self.drag.live().unwrap_or(self.position);
        let (Some(background), Some(surface)) = (self.background.get(), self.surface.as_mut())
        else {
            return Ok(FrameOutcome::Deferred);
        };
        let drawn = self
            .compositor
            .composite(surface, background, &self.spec, position, Some(&asset))
            .map(|_| ());
        if let Err(e) = drawn {
            return Err(self.drop_frame(e));
        }
        self.scheduler.complete();
        self.surface_ready = true;

        if kind == Redraw::Committed && !self.drag.is_dragging() {
            if let Some(surface) = self.surface.as_ref() {
                for (_, listener) in &mut self.listeners {
                    listener(surface);
                }
            }
            tracing::debug!(anchors = self.compositor.last_anchor_count(), "committed frame");
            return Ok(FrameOutcome::Committed);
        }
        Ok(FrameOutcome::Drawn)
    }

    fn drop_frame(&mut self, e: OvermarkError) -> OvermarkError {
        tracing::warn!(error = %e, "frame failed");
        self.scheduler.cancel();
        e
    }

    /// Encode the shared surface. Refused while a drag is active or before anything was drawn;
    /// a pending redraw is flushed first.
    pub fn export_current(&mut self, options: &ExportOptions) -> OvermarkResult<Vec<u8>> {
        if self.drag.is_dragging() {
            return Err(OvermarkError::precondition(
                "cannot export while a drag is in progress",
            ));
        }
        if self.scheduler.pending().is_some() {
            self.tick()?;
        }
        match self.surface.as_ref() {
            Some(surface) if self.surface_ready && self.scheduler.pending().is_none() => {
                encode_with(surface, options)
            }
            _ => Err(OvermarkError::precondition("surface is not ready for export")),
        }
    }

    fn relayout_text(&mut self) -> OvermarkResult<()> {
        let WatermarkKind::Text(text) = &self.spec.kind else {
            return Ok(());
        };
        if self.text_block.as_ref().is_some_and(|b| b.matches(text)) {
            return Ok(());
        }
        self.text_block = None;

        let font = match &self.font {
            Some(font) => font.clone(),
            None => {
                let font = resolve_font(&self.font_source)?;
                self.font = Some(font.clone());
                font
            }
        };
        let block = self.text_engine.layout_block(text, &font)?;
        self.text_block = Some(Arc::new(block));
        Ok(())
    }

    /// Current watermark spec.
    pub fn spec(&self) -> &WatermarkSpec {
        &self.spec
    }

    /// Committed position (not affected by an in-progress drag).
    pub fn position(&self) -> Position {
        self.position
    }

    /// Live drag position, if a drag has moved.
    pub fn live_position(&self) -> Option<Position> {
        self.drag.live()
    }

    /// `true` while a drag is active.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// `true` when a redraw is waiting for the next tick.
    pub fn has_pending_redraw(&self) -> bool {
        self.scheduler.pending().is_some()
    }

    /// Frames actually drawn so far.
    pub fn frame_count(&self) -> u64 {
        self.scheduler.frame_count()
    }

    /// The shared surface, once a background has been applied.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Current background image.
    pub fn background(&self) -> Option<&PreparedImage> {
        self.background.get()
    }

    /// Current watermark image.
    pub fn watermark_image(&self) -> Option<&PreparedImage> {
        self.watermark_image.get()
    }

    /// Shaped text for the current text spec, if laid out.
    pub fn text_block(&self) -> Option<&TextBlock> {
        self.text_block.as_deref()
    }

    /// Compositor statistics for the last frame.
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
