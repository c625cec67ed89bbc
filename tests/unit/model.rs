use super::*;

#[test]
fn defaults_match_editor_defaults() {
    let spec = WatermarkSpec::default();
    let text = spec.text().unwrap();
    assert_eq!(text.content, "Watermark");
    assert_eq!(text.font_size_px, 48.0);
    assert_eq!(text.color, Rgba8::WHITE);
    assert_eq!(spec.opacity, 0.8);
    assert_eq!(spec.tiling, Tiling::Off);
    assert_eq!(spec.tile_spacing_px, 200.0);

    let export = ExportOptions::default();
    assert_eq!(export.format, ExportFormat::Png);
    assert_eq!(export.quality, 0.92);
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let spec = WatermarkSpec::from_json(
        r##"{"kind":{"type":"text","content":"A\nB","color":"#ff0000"},"tiling":"on"}"##,
    )
    .unwrap();
    let text = spec.text().unwrap();
    assert_eq!(text.content, "A\nB");
    assert_eq!(text.font_size_px, 48.0);
    assert_eq!(text.color, Rgba8::rgb(255, 0, 0));
    assert!(spec.is_tiled());
    assert_eq!(spec.opacity, 0.8);
}

#[test]
fn json_roundtrips_image_kind() {
    let spec = WatermarkSpec {
        kind: WatermarkKind::Image(ImageWatermark { size_percent: 150.0 }),
        rotation_deg: 45.0,
        ..WatermarkSpec::default()
    };
    let json = spec.to_json().unwrap();
    assert!(json.contains("\"type\": \"image\""));
    assert_eq!(WatermarkSpec::from_json(&json).unwrap(), spec);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let bad_opacity = WatermarkSpec {
        opacity: 1.5,
        ..WatermarkSpec::default()
    };
    assert!(matches!(
        bad_opacity.validate(),
        Err(OvermarkError::Validation(_))
    ));

    let bad_spacing = WatermarkSpec {
        tile_spacing_px: 10.0,
        ..WatermarkSpec::default()
    };
    assert!(bad_spacing.validate().is_err());

    let bad_font = WatermarkSpec {
        kind: WatermarkKind::Text(TextWatermark {
            font_size_px: 300.0,
            ..TextWatermark::default()
        }),
        ..WatermarkSpec::default()
    };
    assert!(bad_font.validate().is_err());

    let bad_size = WatermarkSpec {
        kind: WatermarkKind::Image(ImageWatermark { size_percent: 5.0 }),
        ..WatermarkSpec::default()
    };
    assert!(bad_size.validate().is_err());
}

#[test]
fn validate_normalizes_rotation() {
    let spec = WatermarkSpec {
        rotation_deg: -90.0,
        ..WatermarkSpec::default()
    }
    .validate()
    .unwrap();
    assert_eq!(spec.rotation_deg, 270.0);

    let spec = WatermarkSpec {
        rotation_deg: 360.0,
        ..WatermarkSpec::default()
    }
    .validate()
    .unwrap();
    assert_eq!(spec.rotation_deg, 0.0);

    let nan = WatermarkSpec {
        rotation_deg: f64::NAN,
        ..WatermarkSpec::default()
    };
    assert!(nan.validate().is_err());
}

#[test]
fn export_format_metadata() {
    assert_eq!(ExportFormat::Png.mime_type(), "image/png");
    assert_eq!(ExportFormat::Jpeg.extension(), "jpeg");
    assert!(!ExportFormat::Png.needs_quality());
    assert!(ExportFormat::Webp.needs_quality());

    let png = ExportOptions::default();
    assert_eq!(png.effective_quality(), None);
    let jpeg = ExportOptions {
        format: ExportFormat::Jpeg,
        quality: 0.5,
    };
    assert_eq!(jpeg.effective_quality(), Some(0.5));
}

#[test]
fn export_quality_is_checked_only_where_it_is_used() {
    let bad_jpeg = ExportOptions {
        format: ExportFormat::Jpeg,
        quality: 1.5,
    };
    assert!(matches!(
        bad_jpeg.validate(),
        Err(OvermarkError::Validation(_))
    ));
    let bad_webp = ExportOptions {
        format: ExportFormat::Webp,
        quality: 0.0,
    };
    assert!(bad_webp.validate().is_err());

    let png = ExportOptions {
        format: ExportFormat::Png,
        quality: f32::NAN,
    };
    assert!(png.validate().is_ok());
}
