//! Overmark is a watermark compositing and interactive placement engine.
//!
//! It draws a text or image watermark over a raster background, either once at a chosen position
//! or as a rotated, periodic grid, and exports the result as PNG, JPEG or WebP.
//!
//! # Pipeline overview
//!
//! 1. **Prepare**: decode images ([`decode_image`]) and shape text ([`TextLayoutEngine`]) once.
//! 2. **Plan**: measure the watermark ([`compute_dimensions`]) and place anchors
//!    ([`plan_anchors`]).
//! 3. **Composite**: draw background and instances onto a [`Surface`] ([`Compositor`]).
//! 4. **Encode**: turn the surface into file bytes ([`encode`]).
//!
//! Interactive editing goes through [`EditorSession`], which owns all mutable state and redraws
//! only from its frame-gated [`EditorSession::tick`]. Whole folders go through [`process_batch`],
//! which gives each file a private surface and reports per-file failures.
//!
//! Pixels are premultiplied RGBA8 end to end; encoders receive straight alpha.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod batch;
mod encode;
mod foundation;
mod model;
mod render;
mod session;

pub use assets::WatermarkAsset;
pub use assets::decode::{AssetId, PreparedImage, decode_image, is_supported_image};
pub use assets::font::{FontSource, ResolvedFont, resolve_font};
pub use assets::slot::{AssetSlot, LoadOutcome, LoadTicket, SlotKind};
pub use assets::text::{
    LINE_HEIGHT_FACTOR, TextBlock, TextBrushRgba8, TextLayoutEngine, TextLine,
};
pub use batch::packager::{BatchPackager, InMemoryPackager};
pub use batch::pipeline::{
    BatchFailure, BatchInput, BatchJob, BatchOptions, BatchOutput, BatchReport,
    partition_supported, process_batch, process_file,
};
pub use encode::{encode, encode_with, watermarked_filename};
pub use foundation::core::{Affine, Point, Position, Rect, Rgba8, Vec2};
pub use foundation::error::{OvermarkError, OvermarkResult};
pub use model::{
    ExportFormat, ExportOptions, FONT_SIZE_RANGE_PX, IMAGE_SIZE_RANGE_PERCENT, ImageWatermark,
    TILE_SPACING_RANGE_PX, TextWatermark, Tiling, WatermarkKind, WatermarkSpec,
};
pub use render::composite::{Compositor, composite};
pub use render::geometry::{
    Dimensions, IMAGE_SCALE_REFERENCE_PX, compute_dimensions, rotated_bounds,
};
pub use render::planner::{MAX_ANCHORS, plan_anchors};
pub use render::surface::Surface;
pub use session::drag::{DragController, DragRelease, SurfaceRect};
pub use session::editor::{EditorSession, FrameOutcome, SubscriptionId};
pub use session::scheduler::{FrameScheduler, Redraw};
