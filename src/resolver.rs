//! Device and colour-profile resolution.
//!
//! [`resolve`] turns technical metadata plus optional user overrides into a
//! [`ResolvedContext`]: the device, the colour profile and the composed
//! decoder parameters. The context is computed once per video and reused
//! for every extraction instant.
//!
//! # Example
//!
//! ```
//! use framecut::{Catalog, ColorProfile, TechnicalMetadata, fields, resolve};
//!
//! let catalog = Catalog::builtin();
//! let technical = TechnicalMetadata::new()
//!     .with(fields::MODEL, "DJI Mavic 2 Pro")
//!     .with(fields::COLOR_PRIMARIES, "bt2020")
//!     .with(fields::COLOR_TRANSFER, "arib-std-b67");
//!
//! let context = resolve(&catalog, &technical, None, None).unwrap();
//! assert_eq!(context.device(), "DJI Mavic 2 Pro");
//! assert_eq!(context.profile(), ColorProfile::Hlg);
//! assert_eq!(context.parameters().get("color_trc"), Some("arib-std-b67"));
//! ```

use crate::catalog::{Catalog, DeviceProfile};
use crate::error::FramecutError;
use crate::metadata::{TechnicalMetadata, fields};
use crate::parameters::{ParameterFragment, synthesize};
use crate::profile::ColorProfile;

/// The finalized `(device, profile, parameters)` tuple for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContext {
    device: String,
    make: Option<String>,
    model: Option<String>,
    profile: ColorProfile,
    parameters: ParameterFragment,
}

impl ResolvedContext {
    /// Device identifier, or `generic`.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Catalog make, absent for the generic device.
    pub fn make(&self) -> Option<&str> {
        self.make.as_deref()
    }

    /// Catalog model, absent for the generic device.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Selected colour profile.
    pub fn profile(&self) -> ColorProfile {
        self.profile
    }

    /// Composed decoder parameters.
    pub fn parameters(&self) -> &ParameterFragment {
        &self.parameters
    }

    /// Returns `true` when no catalog device matched.
    pub fn is_generic(&self) -> bool {
        self.make.is_none()
    }
}

/// Resolve the device and colour profile for one video.
///
/// # Errors
///
/// - [`FramecutError::UnknownDevice`] when `device_override` names no
///   catalog device.
/// - [`FramecutError::UnsupportedProfile`] when `profile_override` is not
///   advertised by the resolved device.
pub fn resolve(
    catalog: &Catalog,
    technical: &TechnicalMetadata,
    device_override: Option<&str>,
    profile_override: Option<&str>,
) -> Result<ResolvedContext, FramecutError> {
    let device = match device_override {
        Some(requested) => {
            catalog
                .find(requested)
                .ok_or_else(|| FramecutError::UnknownDevice {
                    device: requested.to_string(),
                    available: catalog.identifiers(),
                })?
        }
        None => match match_device(catalog, technical) {
            Some(device) => {
                log::info!("Detected device: {}", device.identifier());
                device
            }
            None => {
                log::info!("No known device matched, using generic parameters");
                catalog.generic()
            }
        },
    };

    let profile = match profile_override {
        Some(requested) => select_profile(device, requested)?,
        None if device.is_generic() => ColorProfile::Normal,
        None => detect_profile(device, technical),
    };

    let profile_parameters = device
        .profile_parameters(profile)
        .cloned()
        .unwrap_or_default();
    let parameters = synthesize(
        catalog.base_parameters(),
        device.parameters(),
        &profile_parameters,
    );

    log::debug!(
        "Resolved {} / {}: {parameters}",
        device.identifier(),
        profile.display_name()
    );

    Ok(ResolvedContext {
        device: device.identifier().to_string(),
        make: (!device.is_generic()).then(|| device.make().to_string()),
        model: (!device.is_generic()).then(|| device.model().to_string()),
        profile,
        parameters,
    })
}

/// Find the catalog device whose longest match identifier is an exact or
/// prefix match of the video's model, encoder, or `make model` string.
pub fn match_device<'a>(
    catalog: &'a Catalog,
    technical: &TechnicalMetadata,
) -> Option<&'a DeviceProfile> {
    let model = technical.get(fields::MODEL);
    let make_model = match (technical.get(fields::MAKE), model) {
        (Some(make), Some(model)) => Some(format!("{make} {model}")),
        _ => None,
    };
    let candidates: Vec<String> = [model, technical.get(fields::ENCODER), make_model.as_deref()]
        .into_iter()
        .flatten()
        .map(|candidate| candidate.trim().to_ascii_lowercase())
        .filter(|candidate| !candidate.is_empty())
        .collect();

    let mut best: Option<(&DeviceProfile, usize)> = None;
    for device in catalog.devices() {
        for identifier in device.match_identifiers() {
            let matched = candidates
                .iter()
                .any(|candidate| candidate.starts_with(identifier.as_str()));
            if matched && best.is_none_or(|(_, length)| identifier.len() > length) {
                best = Some((device, identifier.len()));
            }
        }
    }
    best.map(|(device, _)| device)
}

fn select_profile(device: &DeviceProfile, requested: &str) -> Result<ColorProfile, FramecutError> {
    ColorProfile::from_name(requested)
        .filter(|profile| device.supports(*profile))
        .ok_or_else(|| FramecutError::UnsupportedProfile {
            profile: requested.to_string(),
            device: device.identifier().to_string(),
            supported: device.supported_profile_names(),
        })
}

fn detect_profile(device: &DeviceProfile, technical: &TechnicalMetadata) -> ColorProfile {
    match device.rules().iter().find(|rule| rule.matches(technical)) {
        Some(rule) => {
            log::info!("Detected color profile: {}", rule.profile.display_name());
            rule.profile
        }
        None => {
            let fallback = device.default_profile();
            log::info!(
                "No detection rule matched for {}, using {}",
                device.identifier(),
                fallback.display_name()
            );
            fallback
        }
    }
}
