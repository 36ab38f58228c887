//! Device catalog integration tests.

use framecut::{
    Catalog, ColorProfile, DeviceProfile, GENERIC_DEVICE, ParameterFragment, Predicate,
    standard_profile_parameters,
};

// ── Built-in table ─────────────────────────────────────────────────

#[test]
fn builtin_lists_dji_devices_in_order() {
    let catalog = Catalog::builtin();
    assert_eq!(
        catalog.identifiers(),
        vec!["DJI Mini 3 Pro", "DJI Mavic 2 Pro", "DJI Osmo Action 5 Pro"],
    );
}

#[test]
fn find_is_case_insensitive() {
    let catalog = Catalog::builtin();
    let device = catalog.find("dji mavic 2 pro").expect("Mavic should be found");
    assert_eq!(device.identifier(), "DJI Mavic 2 Pro");
    assert_eq!(device.make(), "DJI");
    assert_eq!(device.model(), "Mavic 2 Pro");
    assert!(catalog.find("DJI Phantom 4").is_none());
}

#[test]
fn mini_3_pro_profiles() {
    let catalog = Catalog::builtin();
    let mini = catalog.find("DJI Mini 3 Pro").expect("Mini should be found");
    assert_eq!(mini.supported_profile_names(), vec!["normal", "d_cinelike"]);
    assert_eq!(mini.default_profile(), ColorProfile::Normal);
    assert!(!mini.supports(ColorProfile::DLog));
    assert!(!mini.supports(ColorProfile::Hlg));
}

#[test]
fn wide_gamut_profiles_retag_colour() {
    let catalog = Catalog::builtin();
    let mavic = catalog.find("DJI Mavic 2 Pro").expect("Mavic should be found");

    let dlog = mavic
        .profile_parameters(ColorProfile::DLog)
        .expect("Mavic supports D-Log");
    assert_eq!(dlog.get("color_primaries"), Some("bt2020"));
    assert_eq!(dlog.get("color_trc"), Some("log"));

    let hlg = mavic
        .profile_parameters(ColorProfile::Hlg)
        .expect("Mavic supports HLG");
    assert_eq!(hlg.get("color_trc"), Some("arib-std-b67"));
    assert_eq!(hlg.get("colorspace"), Some("bt2020nc"));
}

#[test]
fn base_parameters_request_16_bit_tiff() {
    let catalog = Catalog::builtin();
    let base = catalog.base_parameters();
    assert_eq!(base.get("c:v"), Some("tiff"));
    assert_eq!(base.get("pix_fmt"), Some("rgb48le"));
    assert_eq!(base.get("color_range"), Some("pc"));
    assert!(base.get("sws_flags").is_some_and(|flags| flags.contains("lanczos")));
}

#[test]
fn every_rule_targets_a_supported_profile() {
    let catalog = Catalog::builtin();
    for device in catalog.devices() {
        assert!(!device.rules().is_empty(), "{} has no rules", device.identifier());
        for rule in device.rules() {
            assert!(
                device.supports(rule.profile),
                "{} has a rule for unsupported {}",
                device.identifier(),
                rule.profile,
            );
        }
    }
}

// ── Generic device ─────────────────────────────────────────────────

#[test]
fn generic_supports_every_profile() {
    let catalog = Catalog::builtin();
    let generic = catalog.generic();
    assert!(generic.is_generic());
    assert_eq!(generic.identifier(), GENERIC_DEVICE);
    for profile in ColorProfile::ALL {
        assert!(generic.supports(profile), "generic should support {profile}");
    }
    assert!(generic.rules().is_empty());
    assert!(generic.parameters().is_empty());
}

// ── Custom devices ─────────────────────────────────────────────────

#[test]
fn rule_for_unsupported_profile_is_dropped() {
    let device = DeviceProfile::new("Acme Cam", "Acme", "Cam")
        .with_profile(ColorProfile::Normal, ParameterFragment::new())
        .with_rule(Predicate::MinBitDepth(10), ColorProfile::DLog);
    assert!(device.rules().is_empty());
}

#[test]
fn readding_a_profile_keeps_its_position() {
    let device = DeviceProfile::new("Acme Cam", "Acme", "Cam")
        .with_profile(ColorProfile::Normal, ParameterFragment::new())
        .with_profile(ColorProfile::Hlg, ParameterFragment::new())
        .with_profile(
            ColorProfile::Normal,
            ParameterFragment::new().with("color_trc", "gamma22"),
        );

    let profiles: Vec<ColorProfile> = device.supported_profiles().collect();
    assert_eq!(profiles, vec![ColorProfile::Normal, ColorProfile::Hlg]);
    assert_eq!(
        device
            .profile_parameters(ColorProfile::Normal)
            .and_then(|fragment| fragment.get("color_trc")),
        Some("gamma22"),
    );
}

#[test]
fn matching_identifiers_are_lowercased_and_unique() {
    let device = DeviceProfile::new("Acme Cam", "Acme", "Cam").matching(&["ACME CAM", " cam x ", ""]);
    assert_eq!(device.match_identifiers(), &["acme cam".to_string(), "cam x".to_string()]);
}

#[test]
fn device_without_profiles_defaults_to_normal() {
    let device = DeviceProfile::new("Bare", "Acme", "Bare");
    assert_eq!(device.default_profile(), ColorProfile::Normal);
    assert!(device.supported_profile_names().is_empty());
}

#[test]
fn custom_catalog_keeps_its_base() {
    let base = ParameterFragment::new().with("c:v", "png");
    let catalog = Catalog::new(base.clone(), Vec::new());
    assert_eq!(catalog.base_parameters(), &base);
    assert!(catalog.devices().is_empty());
    assert!(catalog.generic().supports(ColorProfile::Hlg));
}

#[test]
fn standard_fragments() {
    assert!(standard_profile_parameters(ColorProfile::Normal).is_empty());
    assert!(standard_profile_parameters(ColorProfile::DCinelike).is_empty());
    assert_eq!(standard_profile_parameters(ColorProfile::DLog).len(), 3);
}
