//! The device and colour-profile catalog.
//!
//! A [`Catalog`] is built once at start-up and only read afterwards. It
//! holds the base decoder parameters shared by every device, one
//! [`DeviceProfile`] per supported camera, and a generic fallback device
//! used when the footage matches no known camera.
//!
//! # Example
//!
//! ```
//! use framecut::{Catalog, ColorProfile};
//!
//! let catalog = Catalog::builtin();
//! let mavic = catalog.find("dji mavic 2 pro").unwrap();
//! assert!(mavic.supports(ColorProfile::DLog));
//! assert!(!mavic.supports(ColorProfile::DCinelike));
//! ```

use crate::detection::{DetectionRule, Predicate};
use crate::metadata::fields;
use crate::parameters::ParameterFragment;
use crate::profile::ColorProfile;

/// Identifier of the fallback device.
pub const GENERIC_DEVICE: &str = "generic";

/// One supported camera.
///
/// The supported-profile set and the per-profile fragments are the same
/// list, so a fragment can never exist for a profile the device does not
/// advertise.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    identifier: String,
    make: String,
    model: String,
    match_identifiers: Vec<String>,
    parameters: ParameterFragment,
    profiles: Vec<(ColorProfile, ParameterFragment)>,
    rules: Vec<DetectionRule>,
}

impl DeviceProfile {
    /// Start describing a device. `identifier` is the catalog key
    /// (`DJI Mini 3 Pro`); `make` and `model` are written to EXIF.
    pub fn new(identifier: &str, make: &str, model: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            make: make.to_string(),
            model: model.to_string(),
            match_identifiers: vec![identifier.to_ascii_lowercase()],
            parameters: ParameterFragment::new(),
            profiles: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Additional identifiers matched against make/model/encoder tags.
    #[must_use]
    pub fn matching(mut self, identifiers: &[&str]) -> Self {
        for identifier in identifiers {
            let identifier = identifier.trim().to_ascii_lowercase();
            if !identifier.is_empty() && !self.match_identifiers.contains(&identifier) {
                self.match_identifiers.push(identifier);
            }
        }
        self
    }

    /// Device-specific decoder parameters, applied after the base fragment.
    #[must_use]
    pub fn with_parameters(mut self, parameters: ParameterFragment) -> Self {
        self.parameters = parameters;
        self
    }

    /// Advertise a colour profile with its parameter fragment. Re-adding a
    /// profile replaces its fragment and keeps its position.
    #[must_use]
    pub fn with_profile(mut self, profile: ColorProfile, parameters: ParameterFragment) -> Self {
        match self.profiles.iter_mut().find(|(existing, _)| *existing == profile) {
            Some((_, slot)) => *slot = parameters,
            None => self.profiles.push((profile, parameters)),
        }
        self
    }

    /// Append a detection rule. Rules naming a profile the device does not
    /// advertise are dropped.
    #[must_use]
    pub fn with_rule(mut self, when: Predicate, profile: ColorProfile) -> Self {
        if self.supports(profile) {
            self.rules.push(DetectionRule::new(when, profile));
        } else {
            log::warn!(
                "Ignoring detection rule for {profile}: not supported by {}",
                self.identifier
            );
        }
        self
    }

    /// Catalog key.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// EXIF make.
    pub fn make(&self) -> &str {
        &self.make
    }

    /// EXIF model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lower-cased identifiers used for metadata matching.
    pub fn match_identifiers(&self) -> &[String] {
        &self.match_identifiers
    }

    /// Device-specific fragment.
    pub fn parameters(&self) -> &ParameterFragment {
        &self.parameters
    }

    /// Supported profiles, in declaration order.
    pub fn supported_profiles(&self) -> impl Iterator<Item = ColorProfile> + '_ {
        self.profiles.iter().map(|(profile, _)| *profile)
    }

    /// Supported profile names, for error messages.
    pub fn supported_profile_names(&self) -> Vec<String> {
        self.supported_profiles()
            .map(|profile| profile.name().to_string())
            .collect()
    }

    /// The first supported profile, used when detection finds nothing.
    pub fn default_profile(&self) -> ColorProfile {
        self.profiles
            .first()
            .map(|(profile, _)| *profile)
            .unwrap_or(ColorProfile::Normal)
    }

    /// Returns `true` if the device advertises `profile`.
    pub fn supports(&self, profile: ColorProfile) -> bool {
        self.profile_parameters(profile).is_some()
    }

    /// Fragment for one supported profile.
    pub fn profile_parameters(&self, profile: ColorProfile) -> Option<&ParameterFragment> {
        self.profiles
            .iter()
            .find(|(existing, _)| *existing == profile)
            .map(|(_, parameters)| parameters)
    }

    /// Ordered detection rules.
    pub fn rules(&self) -> &[DetectionRule] {
        &self.rules
    }

    /// Returns `true` for the fallback device.
    pub fn is_generic(&self) -> bool {
        self.identifier == GENERIC_DEVICE
    }
}

/// Immutable table of known devices.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    base: ParameterFragment,
    devices: Vec<DeviceProfile>,
    generic: DeviceProfile,
}

impl Catalog {
    /// Build a catalog from a base fragment and device entries.
    ///
    /// The generic device is derived from the base fragment: it has no
    /// device-specific parameters, no detection rules, and advertises every
    /// standard profile so explicit profile overrides work on unknown
    /// footage.
    pub fn new(base: ParameterFragment, devices: Vec<DeviceProfile>) -> Self {
        let generic = ColorProfile::ALL.into_iter().fold(
            DeviceProfile::new(GENERIC_DEVICE, "", ""),
            |device, profile| device.with_profile(profile, standard_profile_parameters(profile)),
        );
        Self {
            base,
            devices,
            generic,
        }
    }

    /// The built-in table of DJI cameras.
    pub fn builtin() -> Self {
        Catalog::new(base_parameters(), builtin_devices())
    }

    /// Parameters shared by every device.
    pub fn base_parameters(&self) -> &ParameterFragment {
        &self.base
    }

    /// Known devices, in declaration order.
    pub fn devices(&self) -> &[DeviceProfile] {
        &self.devices
    }

    /// The fallback device.
    pub fn generic(&self) -> &DeviceProfile {
        &self.generic
    }

    /// Find a device by catalog identifier, case-insensitively.
    pub fn find(&self, identifier: &str) -> Option<&DeviceProfile> {
        let identifier = identifier.trim();
        self.devices
            .iter()
            .find(|device| device.identifier.eq_ignore_ascii_case(identifier))
    }

    /// Catalog identifiers, for error messages and listings.
    pub fn identifiers(&self) -> Vec<String> {
        self.devices
            .iter()
            .map(|device| device.identifier.clone())
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}

/// Lossless 16-bit TIFF output with full-chroma Lanczos upsampling and
/// BT.709 tags, correct for Normal and D-Cinelike footage.
fn base_parameters() -> ParameterFragment {
    ParameterFragment::from_pairs([
        ("sws_flags", "lanczos+full_chroma_int+accurate_rnd"),
        ("c:v", "tiff"),
        ("pix_fmt", "rgb48le"),
        ("color_range", "pc"),
        ("color_primaries", "bt709"),
        ("color_trc", "bt709"),
        ("colorspace", "bt709"),
    ])
}

/// Colour-tag overrides for one profile. Wide-gamut profiles only replace
/// the tags that actually change.
pub fn standard_profile_parameters(profile: ColorProfile) -> ParameterFragment {
    match profile {
        ColorProfile::Normal | ColorProfile::DCinelike => ParameterFragment::new(),
        ColorProfile::DLog => ParameterFragment::from_pairs([
            ("color_primaries", "bt2020"),
            ("colorspace", "bt2020nc"),
            ("color_trc", "log"),
        ]),
        ColorProfile::Hlg => ParameterFragment::from_pairs([
            ("color_primaries", "bt2020"),
            ("colorspace", "bt2020nc"),
            ("color_trc", "arib-std-b67"),
        ]),
    }
}

fn with_standard_profiles(device: DeviceProfile, profiles: &[ColorProfile]) -> DeviceProfile {
    profiles.iter().fold(device, |device, &profile| {
        device.with_profile(profile, standard_profile_parameters(profile))
    })
}

fn ten_bit_and(predicates: Vec<Predicate>) -> Predicate {
    let mut all = vec![Predicate::MinBitDepth(10)];
    all.extend(predicates);
    Predicate::All(all)
}

/// Tag-based rules shared by the wide-gamut cameras.
fn wide_gamut_tag_rules(device: DeviceProfile) -> DeviceProfile {
    device
        .with_rule(Predicate::mentions(&["d-log", "d_log", "dlog"]), ColorProfile::DLog)
        .with_rule(Predicate::mentions(&["hlg"]), ColorProfile::Hlg)
        .with_rule(
            Predicate::color_tags("bt2020", "arib-std-b67"),
            ColorProfile::Hlg,
        )
        .with_rule(Predicate::color_tags("bt2020", "log"), ColorProfile::DLog)
}

fn builtin_devices() -> Vec<DeviceProfile> {
    let mini_3_pro = with_standard_profiles(
        DeviceProfile::new("DJI Mini 3 Pro", "DJI", "Mini 3 Pro").matching(&["mini 3 pro"]),
        &[ColorProfile::Normal, ColorProfile::DCinelike],
    )
    .with_rule(
        Predicate::mentions(&["d-cinelike", "d_cinelike"]),
        ColorProfile::DCinelike,
    )
    // 10-bit recording on this camera is only available in D-Cinelike.
    .with_rule(Predicate::MinBitDepth(10), ColorProfile::DCinelike)
    .with_rule(
        Predicate::All(vec![
            Predicate::MaxBitDepth(8),
            Predicate::at_most(fields::STAT_SATAVG, 0.25),
        ]),
        ColorProfile::DCinelike,
    );

    let mavic_2_pro = wide_gamut_tag_rules(with_standard_profiles(
        DeviceProfile::new("DJI Mavic 2 Pro", "DJI", "Mavic 2 Pro").matching(&["mavic 2 pro"]),
        &[ColorProfile::Normal, ColorProfile::DLog, ColorProfile::Hlg],
    ))
    .with_rule(
        ten_bit_and(vec![Predicate::at_least(fields::STAT_P90Y, 0.88)]),
        ColorProfile::Hlg,
    )
    .with_rule(
        ten_bit_and(vec![
            Predicate::at_most(fields::STAT_P90Y, 0.80),
            Predicate::at_most(fields::STAT_SATAVG, 0.30),
        ]),
        ColorProfile::DLog,
    )
    .with_rule(Predicate::MinBitDepth(10), ColorProfile::DLog);

    let action_5_pro = wide_gamut_tag_rules(with_standard_profiles(
        DeviceProfile::new("DJI Osmo Action 5 Pro", "DJI", "Osmo Action 5 Pro").matching(&[
            "osmo action 5 pro",
            "dji osmoaction5 pro",
            "osmoaction5 pro",
            "action 5",
        ]),
        &[ColorProfile::Normal, ColorProfile::DLog, ColorProfile::Hlg],
    ))
    .with_rule(
        ten_bit_and(vec![
            Predicate::at_least(fields::STAT_P90Y, 0.85),
            Predicate::at_least(fields::STAT_SATAVG, 0.45),
        ]),
        ColorProfile::Hlg,
    )
    .with_rule(
        ten_bit_and(vec![
            Predicate::between(fields::STAT_P90Y, 0.45, 0.80),
            Predicate::between(fields::STAT_SATAVG, 0.25, 0.45),
            Predicate::at_most(fields::STAT_YAVG, 0.50),
        ]),
        ColorProfile::DLog,
    )
    // Underexposed D-Log footage.
    .with_rule(
        ten_bit_and(vec![
            Predicate::between(fields::STAT_P90Y, 0.40, 0.82),
            Predicate::between(fields::STAT_YAVG, 0.30, 0.50),
            Predicate::at_least(fields::STAT_SATAVG, 0.20),
        ]),
        ColorProfile::DLog,
    );

    vec![mini_3_pro, mavic_2_pro, action_5_pro]
}
