use super::*;

#[test]
fn fnv_hash_is_stable_across_split_writes() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"overmark");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"over");
    b.write_bytes(b"mark");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_u32(1);
    assert_ne!(c.finish(), Fnv1a64::OFFSET_BASIS);
}

#[test]
fn premultiply_zeroes_transparent_pixels() {
    let mut px = [200u8, 100, 50, 0, 100, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[0, 0, 0, 0]);
    assert_eq!(
        &px[4..],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
}

#[test]
fn opaque_pixels_survive_premul_roundtrip() {
    let src = [12u8, 34, 56, 255, 255, 0, 128, 255];
    let mut px = src;
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, src);
}

#[test]
fn unpremultiply_restores_half_alpha_within_one() {
    let mut px = [100u8, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    for (got, want) in px[..3].iter().zip([100u8, 50, 200]) {
        assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
    }
}
