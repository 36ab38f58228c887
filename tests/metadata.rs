//! Technical metadata tests.

use framecut::{Predicate, TechnicalMetadata, fields};

fn depth(pixel_format: &str) -> Option<u8> {
    TechnicalMetadata::new()
        .with(fields::PIXEL_FORMAT, pixel_format)
        .bit_depth()
}

// ── Bit depth ──────────────────────────────────────────────────────

#[test]
fn high_bit_depth_formats() {
    assert_eq!(depth("yuv420p10le"), Some(10));
    assert_eq!(depth("yuv422p12be"), Some(12));
    assert_eq!(depth("p010le"), Some(10));
    assert_eq!(depth("gray16le"), Some(16));
    assert_eq!(depth("YUV420P10LE"), Some(10));
}

#[test]
fn digits_in_the_format_family_are_not_depth() {
    assert_eq!(depth("nv12"), Some(8));
    assert_eq!(depth("yuv410p"), Some(8));
    assert_eq!(depth("yuv420p"), Some(8));
    assert_eq!(depth("rgb24"), Some(8));
}

#[test]
fn unknown_pixel_format_has_no_depth() {
    assert_eq!(TechnicalMetadata::new().bit_depth(), None);
}

#[test]
fn eight_bit_semi_planar_fails_ten_bit_rule() {
    let rule = Predicate::MinBitDepth(10);
    let nv12 = TechnicalMetadata::new().with(fields::PIXEL_FORMAT, "nv12");
    let p010 = TechnicalMetadata::new().with(fields::PIXEL_FORMAT, "p010le");
    assert!(!rule.matches(&nv12));
    assert!(rule.matches(&p010));
}
