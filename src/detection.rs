//! Colour-profile detection rules.
//!
//! Each catalog device carries an ordered list of [`DetectionRule`]s. The
//! resolver evaluates them top-to-bottom against the video's
//! [`TechnicalMetadata`] and picks the profile of the first rule whose
//! [`Predicate`] holds.
//!
//! # Example
//!
//! ```
//! use framecut::{ColorProfile, DetectionRule, Predicate, TechnicalMetadata, fields};
//!
//! let rule = DetectionRule::new(
//!     Predicate::color_tags("bt2020", "arib-std-b67"),
//!     ColorProfile::Hlg,
//! );
//! let technical = TechnicalMetadata::new()
//!     .with(fields::COLOR_PRIMARIES, "bt2020")
//!     .with(fields::COLOR_TRANSFER, "arib-std-b67");
//! assert!(rule.matches(&technical));
//! ```

use crate::metadata::{TechnicalMetadata, fields};
use crate::profile::ColorProfile;

/// A condition over technical metadata.
///
/// A predicate that needs a field the metadata lacks evaluates to `false`.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Any descriptive field contains any of the needles (case-insensitive).
    Mentions(Vec<String>),
    /// Colour primaries and transfer characteristic both equal the given tags.
    ColorTags {
        /// Expected primaries (`bt2020`).
        primaries: String,
        /// Expected transfer characteristic (`log`).
        transfer: String,
    },
    /// Bit depth is at least the given value.
    MinBitDepth(u8),
    /// Bit depth is at most the given value.
    MaxBitDepth(u8),
    /// A numeric field lies within an inclusive range.
    Statistic {
        /// Field key, usually one of the `fields::STAT_*` constants.
        field: String,
        /// Inclusive lower bound.
        min: Option<f64>,
        /// Inclusive upper bound.
        max: Option<f64>,
    },
    /// Every inner predicate holds.
    All(Vec<Predicate>),
}

impl Predicate {
    /// Text mention of any of `needles`.
    pub fn mentions(needles: &[&str]) -> Self {
        Predicate::Mentions(
            needles
                .iter()
                .map(|needle| needle.to_ascii_lowercase())
                .collect(),
        )
    }

    /// Exact colour-tag pair.
    pub fn color_tags(primaries: &str, transfer: &str) -> Self {
        Predicate::ColorTags {
            primaries: primaries.to_ascii_lowercase(),
            transfer: transfer.to_ascii_lowercase(),
        }
    }

    /// `field >= min`.
    pub fn at_least(field: &str, min: f64) -> Self {
        Predicate::Statistic {
            field: field.to_string(),
            min: Some(min),
            max: None,
        }
    }

    /// `field <= max`.
    pub fn at_most(field: &str, max: f64) -> Self {
        Predicate::Statistic {
            field: field.to_string(),
            min: None,
            max: Some(max),
        }
    }

    /// `min <= field <= max`.
    pub fn between(field: &str, min: f64, max: f64) -> Self {
        Predicate::Statistic {
            field: field.to_string(),
            min: Some(min),
            max: Some(max),
        }
    }

    /// Evaluate against the technical metadata of one video.
    pub fn matches(&self, technical: &TechnicalMetadata) -> bool {
        match self {
            Predicate::Mentions(needles) => fields::DESCRIPTIVE.iter().any(|field| {
                technical.get(field).is_some_and(|text| {
                    let text = text.to_ascii_lowercase();
                    needles.iter().any(|needle| text.contains(needle.as_str()))
                })
            }),
            Predicate::ColorTags {
                primaries,
                transfer,
            } => {
                let tag_equals = |field: &str, expected: &str| {
                    technical
                        .get(field)
                        .is_some_and(|value| value.eq_ignore_ascii_case(expected))
                };
                tag_equals(fields::COLOR_PRIMARIES, primaries)
                    && tag_equals(fields::COLOR_TRANSFER, transfer)
            }
            Predicate::MinBitDepth(depth) => {
                technical.bit_depth().is_some_and(|actual| actual >= *depth)
            }
            Predicate::MaxBitDepth(depth) => {
                technical.bit_depth().is_some_and(|actual| actual <= *depth)
            }
            Predicate::Statistic { field, min, max } => match technical.get_f64(field) {
                Some(value) => {
                    let above_min = min.is_none_or(|min| value >= min);
                    let below_max = max.is_none_or(|max| value <= max);
                    if !(above_min && below_max) {
                        log::trace!("Condition failed: {field}={value:.3} outside {min:?}..{max:?}");
                    }
                    above_min && below_max
                }
                None => false,
            },
            Predicate::All(predicates) => predicates
                .iter()
                .all(|predicate| predicate.matches(technical)),
        }
    }
}

/// A `(predicate, profile)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRule {
    /// Condition to test.
    pub when: Predicate,
    /// Profile selected when the condition holds.
    pub profile: ColorProfile,
}

impl DetectionRule {
    /// Create a rule.
    pub fn new(when: Predicate, profile: ColorProfile) -> Self {
        Self { when, profile }
    }

    /// Returns `true` if the rule's predicate holds.
    pub fn matches(&self, technical: &TechnicalMetadata) -> bool {
        self.when.matches(technical)
    }
}
