use super::*;
use serde_json::json;

#[test]
fn position_clamps_each_axis() {
    let p = Position::new(-5.0, 140.0);
    assert_eq!(p, Position { x: 0.0, y: 100.0 });

    let p = Position::new(f64::NAN, f64::INFINITY);
    assert_eq!(p, Position { x: 0.0, y: 0.0 });
}

#[test]
fn position_offset_applies_delta_then_clamps() {
    let base = Position::new(40.0, 90.0);
    let moved = base.offset(Vec2::new(15.0, 25.0));
    assert_eq!(moved, Position { x: 55.0, y: 100.0 });

    let origin = Position::new(10.0, 10.0);
    assert_eq!(
        Position::new(30.0, 5.0).delta_from(origin),
        Vec2::new(20.0, -5.0)
    );
}

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Rgba8 = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Rgba8::rgb(255, 0, 0));

    let c: Rgba8 = serde_json::from_value(json!("0000FF80")).unwrap();
    assert_eq!(
        c,
        Rgba8 {
            r: 0,
            g: 0,
            b: 255,
            a: 128
        }
    );
}

#[test]
fn rejects_malformed_hex() {
    assert!(Rgba8::parse_hex("#fff").is_err());
    assert!(Rgba8::parse_hex("#gg0000").is_err());
    assert!(serde_json::from_value::<Rgba8>(json!("#12345")).is_err());
}

#[test]
fn hex_serialization_omits_opaque_alpha() {
    assert_eq!(
        serde_json::to_value(Rgba8::WHITE).unwrap(),
        json!("#ffffff")
    );
    let translucent = Rgba8 {
        r: 1,
        g: 2,
        b: 3,
        a: 4,
    };
    assert_eq!(translucent.to_hex(), "#01020304");
}
