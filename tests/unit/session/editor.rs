use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::model::{ExportFormat, ImageWatermark, Tiling};

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> PreparedImage {
    PreparedImage::from_premul_rgba8(w, h, rgba.repeat((w * h) as usize)).unwrap()
}

fn image_spec() -> WatermarkSpec {
    WatermarkSpec {
        kind: WatermarkKind::Image(ImageWatermark {
            size_percent: 100.0,
        }),
        opacity: 1.0,
        ..WatermarkSpec::default()
    }
}

fn ready_session() -> EditorSession {
    let mut s = EditorSession::with_spec(FontSource::System, image_spec()).unwrap();
    let t = s.begin_background_load();
    s.finish_background_load(t, solid(100, 100, [200, 0, 0, 255]))
        .unwrap();
    let t = s.begin_watermark_load();
    s.finish_watermark_load(t, solid(20, 20, [0, 0, 200, 255]));
    s.set_display_rect(SurfaceRect::new(0.0, 0.0, 100.0, 100.0));
    s
}

fn near(px: Option<[u8; 4]>, want: [u8; 4]) -> bool {
    px.is_some_and(|px| px.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= 2))
}

fn counter(s: &mut EditorSession) -> (Rc<Cell<u32>>, SubscriptionId) {
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    let id = s.subscribe(move |_| c.set(c.get() + 1));
    (count, id)
}

#[test]
fn drag_frames_do_not_notify_until_release() {
    let mut s = ready_session();
    let (count, _) = counter(&mut s);
    assert_eq!(s.tick().unwrap(), FrameOutcome::Committed);
    assert_eq!(count.get(), 1);

    assert!(s.on_pointer_down(Point::new(50.0, 50.0)));
    s.on_pointer_move(Point::new(60.0, 50.0));
    assert_eq!(s.tick().unwrap(), FrameOutcome::Drawn);
    s.on_pointer_move(Point::new(70.0, 40.0));
    assert_eq!(s.tick().unwrap(), FrameOutcome::Drawn);
    assert_eq!(count.get(), 1);
    assert_eq!(s.position(), Position::CENTER);

    s.on_pointer_up();
    assert_eq!(s.tick().unwrap(), FrameOutcome::Committed);
    assert_eq!(count.get(), 2);
    let p = s.position();
    assert!((p.x - 70.0).abs() < 1e-9 && (p.y - 40.0).abs() < 1e-9, "{p:?}");

    assert_eq!(s.tick().unwrap(), FrameOutcome::Idle);
    assert_eq!(count.get(), 2);
}

#[test]
fn committed_frame_reflects_released_position() {
    let mut s = ready_session();
    s.tick().unwrap();
    // The watermark (4x4 after scaling) sits at the center before dragging.
    assert!(near(s.surface().unwrap().pixel(50, 50), [0, 0, 200, 255]));

    s.on_pointer_down(Point::new(50.0, 50.0));
    s.on_pointer_move(Point::new(20.0, 20.0));
    s.on_pointer_leave();
    s.tick().unwrap();

    let surface = s.surface().unwrap();
    assert!(near(surface.pixel(20, 20), [0, 0, 200, 255]));
    assert!(near(surface.pixel(50, 50), [200, 0, 0, 255]));
}

#[test]
fn pointer_move_bursts_coalesce_into_one_frame() {
    let mut s = ready_session();
    s.tick().unwrap();
    let frames = s.frame_count();

    s.on_pointer_down(Point::new(50.0, 50.0));
    for i in 0..200 {
        s.on_pointer_move(Point::new(50.0 + f64::from(i) * 0.1, 50.0));
    }
    assert!(s.has_pending_redraw());
    s.tick().unwrap();
    assert_eq!(s.frame_count(), frames + 1);
    assert_eq!(s.tick().unwrap(), FrameOutcome::Idle);
}

#[test]
fn enabling_tiling_cancels_drag_and_blocks_new_ones() {
    let mut s = ready_session();
    s.tick().unwrap();
    s.on_pointer_down(Point::new(50.0, 50.0));
    s.on_pointer_move(Point::new(60.0, 60.0));

    s.set_spec(WatermarkSpec {
        tiling: Tiling::On,
        ..image_spec()
    })
    .unwrap();
    assert!(!s.is_dragging());
    assert_eq!(s.live_position(), None);

    s.on_pointer_move(Point::new(90.0, 90.0));
    assert_eq!(s.live_position(), None);
    assert_eq!(s.tick().unwrap(), FrameOutcome::Committed);
    assert_eq!(s.position(), Position::CENTER);

    assert!(!s.on_pointer_down(Point::new(50.0, 50.0)));
}

#[test]
fn stale_background_load_is_discarded() {
    let mut s = EditorSession::with_spec(FontSource::System, image_spec()).unwrap();
    let first = s.begin_background_load();
    let second = s.begin_background_load();

    let late = s
        .finish_background_load(first, solid(10, 10, [1, 1, 1, 255]))
        .unwrap();
    assert_eq!(late, LoadOutcome::Stale);
    assert!(s.background().is_none());
    assert!(s.surface().is_none());

    let applied = s
        .finish_background_load(second, solid(30, 20, [2, 2, 2, 255]))
        .unwrap();
    assert_eq!(applied, LoadOutcome::Applied);
    assert_eq!(s.background().map(|b| (b.width, b.height)), Some((30, 20)));
    assert!(!s.fail_background_load(first));
}

#[test]
fn new_background_recenters_and_resizes_once() {
    let mut s = ready_session();
    s.set_position(Position::new(10.0, 90.0));
    s.tick().unwrap();

    let t = s.begin_background_load();
    s.finish_background_load(t, solid(64, 48, [0, 200, 0, 255]))
        .unwrap();
    assert_eq!(s.position(), Position::CENTER);
    s.tick().unwrap();

    let surface = s.surface().unwrap();
    assert_eq!((surface.width(), surface.height()), (64, 48));
    assert_eq!(surface.resize_count(), 1);
}

#[test]
fn missing_watermark_image_defers_the_frame() {
    let mut s = EditorSession::with_spec(FontSource::System, image_spec()).unwrap();
    assert_eq!(s.tick().unwrap(), FrameOutcome::Idle);

    s.load_background(&png(8, 8)).unwrap();
    assert_eq!(s.tick().unwrap(), FrameOutcome::Deferred);
    assert!(s.has_pending_redraw());

    s.load_watermark(&png(2, 2)).unwrap();
    assert_eq!(s.tick().unwrap(), FrameOutcome::Committed);
}

#[test]
fn bad_background_bytes_report_decode_error() {
    let mut s = ready_session();
    s.tick().unwrap();
    let before = s.surface().unwrap().data_premul().to_vec();

    let err = s.load_background(b"definitely not an image").unwrap_err();
    assert!(matches!(err, OvermarkError::Decode(_)));
    assert!(s.background().is_none());
    assert_eq!(s.surface().unwrap().data_premul(), before.as_slice());
    assert_eq!(s.tick().unwrap(), FrameOutcome::Idle);
}

#[test]
fn export_is_refused_while_dragging() {
    let mut s = ready_session();
    s.tick().unwrap();
    s.on_pointer_down(Point::new(50.0, 50.0));

    let opts = ExportOptions {
        format: ExportFormat::Png,
        quality: 0.92,
    };
    let err = s.export_current(&opts).unwrap_err();
    assert!(matches!(err, OvermarkError::Precondition(_)));

    s.on_pointer_up();
    let bytes = s.export_current(&opts).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    assert!(!s.has_pending_redraw());
}

#[test]
fn export_before_any_background_is_refused() {
    let mut s = EditorSession::new(FontSource::System);
    let err = s.export_current(&ExportOptions::default()).unwrap_err();
    assert!(matches!(err, OvermarkError::Precondition(_)));
}

#[test]
fn unsubscribed_listeners_are_not_called() {
    let mut s = ready_session();
    let (count, id) = counter(&mut s);
    assert!(s.unsubscribe(id));
    assert!(!s.unsubscribe(id));
    s.tick().unwrap();
    assert_eq!(count.get(), 0);
}

#[test]
fn release_drops_assets_and_surface() {
    let mut s = ready_session();
    s.tick().unwrap();
    s.release();
    assert!(s.background().is_none());
    assert!(s.watermark_image().is_none());
    assert!(s.surface().is_none());
    assert!(!s.on_pointer_down(Point::new(50.0, 50.0)));
}

#[test]
fn invalid_spec_is_rejected_and_previous_kept() {
    let mut s = ready_session();
    let err = s
        .set_spec(WatermarkSpec {
            opacity: 2.0,
            ..image_spec()
        })
        .unwrap_err();
    assert!(matches!(err, OvermarkError::Validation(_)));
    assert_eq!(s.spec(), &image_spec());
}

#[test]
fn failed_watermark_load_is_not_exported_as_current() {
    let mut s = ready_session();
    s.tick().unwrap();
    assert!(near(s.surface().unwrap().pixel(50, 50), [0, 0, 200, 255]));

    let err = s.load_watermark(b"not an image").unwrap_err();
    assert!(matches!(err, OvermarkError::Decode(_)));
    assert!(s.watermark_image().is_none());
    assert!(s.has_pending_redraw());
    assert_eq!(s.tick().unwrap(), FrameOutcome::Deferred);

    let err = s.export_current(&ExportOptions::default()).unwrap_err();
    assert!(matches!(err, OvermarkError::Precondition(_)));

    s.load_watermark(&png(2, 2)).unwrap();
    assert!(s.export_current(&ExportOptions::default()).is_ok());
}

#[test]
fn text_watermark_session_draws_centered_text() {
    if crate::assets::font::resolve_font(&FontSource::System).is_err() {
        return;
    }
    let spec = WatermarkSpec {
        kind: WatermarkKind::Text(crate::model::TextWatermark {
            content: "MMMM".to_string(),
            font_size_px: 40.0,
            color: crate::foundation::core::Rgba8::WHITE,
        }),
        opacity: 1.0,
        rotation_deg: 0.0,
        ..WatermarkSpec::default()
    };
    let mut s = EditorSession::with_spec(FontSource::System, spec).unwrap();
    let (count, _) = counter(&mut s);
    let t = s.begin_background_load();
    s.finish_background_load(t, solid(400, 200, [0, 0, 0, 255]))
        .unwrap();
    assert_eq!(s.tick().unwrap(), FrameOutcome::Committed);
    assert_eq!(count.get(), 1);

    let surface = s.surface().unwrap();
    let (mut min_x, mut max_x) = (u32::MAX, 0);
    for y in 0..surface.height() {
        for x in 0..surface.width() {
            if surface.pixel(x, y).is_some_and(|px| px[0] >= 128) {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
            }
        }
    }
    assert!(min_x < max_x, "no text ink");
    assert!(max_x - min_x > 60, "glyphs overlap: {min_x}..{max_x}");
    let cx = f64::from(min_x + max_x) / 2.0;
    assert!((cx - 200.0).abs() <= 6.0, "center x = {cx}");
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}
