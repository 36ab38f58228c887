//! Device and profile resolution tests.

use framecut::{
    Catalog, ColorProfile, FramecutError, TechnicalMetadata, fields, match_device, resolve, synthesize,
};

fn mavic(pixel_format: &str) -> TechnicalMetadata {
    TechnicalMetadata::new()
        .with(fields::MAKE, "DJI")
        .with(fields::MODEL, "Mavic 2 Pro")
        .with(fields::PIXEL_FORMAT, pixel_format)
}

fn action(pixel_format: &str) -> TechnicalMetadata {
    TechnicalMetadata::new()
        .with(fields::ENCODER, "DJI OsmoAction5 Pro")
        .with(fields::PIXEL_FORMAT, pixel_format)
}

// ── Device matching ────────────────────────────────────────────────

#[test]
fn matches_model_tag() {
    let catalog = Catalog::builtin();
    let device = match_device(&catalog, &mavic("yuv420p")).expect("Mavic should match");
    assert_eq!(device.identifier(), "DJI Mavic 2 Pro");
}

#[test]
fn matches_encoder_tag() {
    let catalog = Catalog::builtin();
    let device = match_device(&catalog, &action("yuv420p10le")).expect("Action should match");
    assert_eq!(device.identifier(), "DJI Osmo Action 5 Pro");
}

#[test]
fn matches_make_and_model_combined() {
    let catalog = Catalog::builtin();
    let technical = TechnicalMetadata::new()
        .with(fields::MAKE, "DJI")
        .with(fields::MODEL, "Osmo Action 5 Pro");
    let device = match_device(&catalog, &technical).expect("Action should match");
    assert_eq!(device.identifier(), "DJI Osmo Action 5 Pro");
}

#[test]
fn substring_in_the_middle_does_not_match() {
    let catalog = Catalog::builtin();
    let technical = TechnicalMetadata::new().with(fields::MODEL, "Not a Mini 3 Pro");
    assert!(match_device(&catalog, &technical).is_none());
}

#[test]
fn unknown_footage_has_no_device() {
    let catalog = Catalog::builtin();
    let technical = TechnicalMetadata::new()
        .with(fields::MAKE, "Apple")
        .with(fields::MODEL, "iPhone 15 Pro");
    assert!(match_device(&catalog, &technical).is_none());
}

// ── Resolution ─────────────────────────────────────────────────────

#[test]
fn unknown_footage_falls_back_to_generic_normal() {
    let catalog = Catalog::builtin();
    let context = resolve(&catalog, &TechnicalMetadata::new(), None, None).expect("resolve");
    assert!(context.is_generic());
    assert_eq!(context.profile(), ColorProfile::Normal);
    assert_eq!(context.make(), None);
    assert_eq!(context.model(), None);
    assert_eq!(context.parameters(), catalog.base_parameters());
}

#[test]
fn generic_accepts_any_profile_override() {
    let catalog = Catalog::builtin();
    let context =
        resolve(&catalog, &TechnicalMetadata::new(), None, Some("d_log")).expect("resolve");
    assert!(context.is_generic());
    assert_eq!(context.profile(), ColorProfile::DLog);
    assert_eq!(context.parameters().get("color_trc"), Some("log"));
}

#[test]
fn ten_bit_mini_is_d_cinelike() {
    let catalog = Catalog::builtin();
    let technical = TechnicalMetadata::new()
        .with(fields::MODEL, "Mini 3 Pro")
        .with(fields::PIXEL_FORMAT, "yuv420p10le");
    let context = resolve(&catalog, &technical, None, None).expect("resolve");
    assert_eq!(context.device(), "DJI Mini 3 Pro");
    assert_eq!(context.profile(), ColorProfile::DCinelike);
    assert_eq!(context.make(), Some("DJI"));
    assert_eq!(context.model(), Some("Mini 3 Pro"));
}

#[test]
fn eight_bit_saturated_mini_is_normal() {
    let catalog = Catalog::builtin();
    let technical = TechnicalMetadata::new()
        .with(fields::MODEL, "Mini 3 Pro")
        .with(fields::PIXEL_FORMAT, "yuv420p")
        .with(fields::STAT_SATAVG, "0.4");
    let context = resolve(&catalog, &technical, None, None).expect("resolve");
    assert_eq!(context.profile(), ColorProfile::Normal);
}

#[test]
fn colour_tags_select_hlg() {
    let catalog = Catalog::builtin();
    let technical = mavic("yuv420p10le")
        .with(fields::COLOR_PRIMARIES, "bt2020")
        .with(fields::COLOR_TRANSFER, "arib-std-b67");
    let context = resolve(&catalog, &technical, None, None).expect("resolve");
    assert_eq!(context.profile(), ColorProfile::Hlg);
    assert_eq!(context.parameters().get("color_trc"), Some("arib-std-b67"));
    // Base entries survive the profile overlay.
    assert_eq!(context.parameters().get("pix_fmt"), Some("rgb48le"));
}

#[test]
fn descriptive_mention_wins_over_statistics() {
    let catalog = Catalog::builtin();
    let technical = mavic("yuv420p10le")
        .with(fields::COMMENT, "Shot in D-Log")
        .with(fields::STAT_P90Y, "0.95");
    let context = resolve(&catalog, &technical, None, None).expect("resolve");
    assert_eq!(context.profile(), ColorProfile::DLog);
}

#[test]
fn telemetry_colour_mode_is_a_mention() {
    let catalog = Catalog::builtin();
    let technical = action("yuv420p10le").with(fields::COLOR_MODE, "hlg");
    let context = resolve(&catalog, &technical, None, None).expect("resolve");
    assert_eq!(context.profile(), ColorProfile::Hlg);
}

#[test]
fn bright_ten_bit_mavic_is_hlg() {
    let catalog = Catalog::builtin();
    let technical = mavic("yuv420p10le").with(fields::STAT_P90Y, "0.9");
    let context = resolve(&catalog, &technical, None, None).expect("resolve");
    assert_eq!(context.profile(), ColorProfile::Hlg);
}

#[test]
fn ten_bit_mavic_without_signals_is_d_log() {
    let catalog = Catalog::builtin();
    let context = resolve(&catalog, &mavic("yuv420p10le"), None, None).expect("resolve");
    assert_eq!(context.profile(), ColorProfile::DLog);
}

#[test]
fn action_statistics_select_profile() {
    let catalog = Catalog::builtin();

    let flat = action("yuv420p10le")
        .with(fields::STAT_P90Y, "0.70")
        .with(fields::STAT_SATAVG, "0.30")
        .with(fields::STAT_YAVG, "0.40");
    let context = resolve(&catalog, &flat, None, None).expect("resolve");
    assert_eq!(context.profile(), ColorProfile::DLog);

    let vivid = action("yuv420p10le")
        .with(fields::STAT_P90Y, "0.90")
        .with(fields::STAT_SATAVG, "0.50");
    let context = resolve(&catalog, &vivid, None, None).expect("resolve");
    assert_eq!(context.profile(), ColorProfile::Hlg);
}

#[test]
fn eight_bit_action_without_signals_uses_default() {
    let catalog = Catalog::builtin();
    let context = resolve(&catalog, &action("yuv420p"), None, None).expect("resolve");
    assert_eq!(context.profile(), ColorProfile::Normal);
}

// ── Overrides ──────────────────────────────────────────────────────

#[test]
fn device_override_bypasses_matching() {
    let catalog = Catalog::builtin();
    let context = resolve(
        &catalog,
        &TechnicalMetadata::new(),
        Some("dji mini 3 pro"),
        None,
    )
    .expect("resolve");
    assert_eq!(context.device(), "DJI Mini 3 Pro");
}

#[test]
fn profile_override_bypasses_detection() {
    let catalog = Catalog::builtin();
    let technical = mavic("yuv420p10le").with(fields::STAT_P90Y, "0.9");
    let context = resolve(&catalog, &technical, None, Some("normal")).expect("resolve");
    assert_eq!(context.profile(), ColorProfile::Normal);
    assert_eq!(context.parameters().get("color_trc"), Some("bt709"));
}

#[test]
fn unknown_device_override_lists_catalog() {
    let catalog = Catalog::builtin();
    let error = resolve(&catalog, &TechnicalMetadata::new(), Some("DJI Phantom 4"), None)
        .expect_err("unknown device");
    match &error {
        FramecutError::UnknownDevice { device, available } => {
            assert_eq!(device, "DJI Phantom 4");
            assert_eq!(available.len(), 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(error.to_string().contains("DJI Mavic 2 Pro"));
}

#[test]
fn unsupported_profile_override_is_rejected() {
    let catalog = Catalog::builtin();
    let technical = TechnicalMetadata::new().with(fields::MODEL, "Mini 3 Pro");
    let error = resolve(&catalog, &technical, None, Some("d_log")).expect_err("unsupported");
    match error {
        FramecutError::UnsupportedProfile {
            profile,
            device,
            supported,
        } => {
            assert_eq!(profile, "d_log");
            assert_eq!(device, "DJI Mini 3 Pro");
            assert_eq!(supported, vec!["normal", "d_cinelike"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unrecognised_profile_name_is_rejected() {
    let catalog = Catalog::builtin();
    let result = resolve(&catalog, &TechnicalMetadata::new(), None, Some("rec2100"));
    assert!(matches!(result, Err(FramecutError::UnsupportedProfile { .. })));
}

#[test]
fn overrides_resolve_every_supported_pair() {
    let catalog = Catalog::builtin();
    let technical = TechnicalMetadata::new();

    for device in catalog.devices() {
        for profile in device.supported_profiles() {
            let context = resolve(
                &catalog,
                &technical,
                Some(device.identifier()),
                Some(profile.name()),
            )
            .unwrap_or_else(|error| panic!("{} / {}: {error}", device.identifier(), profile.name()));

            let expected = synthesize(
                catalog.base_parameters(),
                device.parameters(),
                device.profile_parameters(profile).expect("supported profile"),
            );
            assert_eq!(context.device(), device.identifier());
            assert_eq!(context.profile(), profile);
            assert_eq!(context.parameters(), &expected, "{} / {}", device.identifier(), profile.name());
        }
    }
}
