use super::*;
use crate::assets::font::{FontSource, resolve_font};

fn system_font() -> Option<ResolvedFont> {
    resolve_font(&FontSource::System).ok()
}

fn text(content: &str, size: f64) -> TextWatermark {
    TextWatermark {
        content: content.to_string(),
        font_size_px: size,
        color: Rgba8::WHITE,
    }
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut engine = TextLayoutEngine::new();
    let font = ResolvedFont {
        bytes: Arc::new(vec![0u8; 32]),
        index: 0,
    };
    assert!(engine.layout_block(&text("x", 48.0), &font).is_err());
}

#[test]
fn block_has_one_line_per_newline_segment() {
    let Some(font) = system_font() else {
        return;
    };
    let mut engine = TextLayoutEngine::new();
    let block = engine
        .layout_block(&text("Hello\n\nWorld!!", 40.0), &font)
        .unwrap();

    assert_eq!(block.lines().len(), 3);
    assert!(block.lines()[1].layout.is_none());
    assert_eq!(block.lines()[1].width, 0.0);
    assert!((block.line_height() - 48.0).abs() < 1e-9);
    assert!((block.total_height() - 144.0).abs() < 1e-9);
    assert!(block.max_width() >= block.lines()[0].width);
    assert!(block.lines()[2].width > 0.0);
}

#[test]
fn wider_text_measures_wider() {
    let Some(font) = system_font() else {
        return;
    };
    let mut engine = TextLayoutEngine::new();
    let short = engine.layout_block(&text("ab", 48.0), &font).unwrap();
    let long = engine.layout_block(&text("abababab", 48.0), &font).unwrap();
    let bigger = engine.layout_block(&text("ab", 96.0), &font).unwrap();
    assert!(long.max_width() > short.max_width());
    assert!(bigger.max_width() > short.max_width());
}

#[test]
fn matches_tracks_all_text_parameters() {
    let Some(font) = system_font() else {
        return;
    };
    let mut engine = TextLayoutEngine::new();
    let params = text("mark", 48.0);
    let block = engine.layout_block(&params, &font).unwrap();
    assert!(block.matches(&params));
    assert!(!block.matches(&text("mark", 49.0)));
    assert!(!block.matches(&text("Mark", 48.0)));
    let recolored = TextWatermark {
        color: Rgba8::rgb(0, 0, 0),
        ..params
    };
    assert!(!block.matches(&recolored));
}
