//! Flat metadata mappings consumed by the resolver and the fusion engine.
//!
//! Two mappings are read once per video and never mutated afterwards:
//!
//! - [`TechnicalMetadata`] describes the stream: make/model identifiers,
//!   colour tags, pixel format and optional content statistics. The resolver
//!   reads it to pick a device and colour profile. Keys are the constants in
//!   [`fields`].
//! - [`VideoMetadata`] holds container-level tags as reported by exiftool
//!   (`ISO`, `GPSLatitude`, `CreateDate`, ...). The fusion engine falls back
//!   to it when telemetry is missing or incomplete.

use std::collections::BTreeMap;

/// Well-known [`TechnicalMetadata`] keys.
pub mod fields {
    /// Camera manufacturer (`DJI`).
    pub const MAKE: &str = "make";
    /// Camera model (`Mini 3 Pro`, `FC3582`).
    pub const MODEL: &str = "model";
    /// Encoder string written by the camera firmware.
    pub const ENCODER: &str = "encoder";
    /// Free-form comment tag.
    pub const COMMENT: &str = "comment";
    /// Free-form description tag.
    pub const DESCRIPTION: &str = "description";
    /// Free-form category tag.
    pub const CATEGORY: &str = "category";
    /// Colour mode reported by the camera (SRT `color_md`).
    pub const COLOR_MODE: &str = "color_mode";
    /// Colour primaries tag, normalized (`bt709`, `bt2020`).
    pub const COLOR_PRIMARIES: &str = "color_primaries";
    /// Transfer characteristic tag, normalized (`bt709`, `arib-std-b67`, `log`).
    pub const COLOR_TRANSFER: &str = "color_transfer";
    /// Matrix coefficients tag, normalized (`bt709`, `bt2020nc`).
    pub const COLOR_SPACE: &str = "color_space";
    /// Decoder pixel format (`yuv420p10le`).
    pub const PIXEL_FORMAT: &str = "pixel_format";
    /// 90th percentile of per-frame average luma, normalized to 0..1.
    pub const STAT_P90Y: &str = "stats.p90y";
    /// Mean per-frame average saturation, normalized to 0..1.
    pub const STAT_SATAVG: &str = "stats.satavg";
    /// Mean per-frame average luma, normalized to 0..1.
    pub const STAT_YAVG: &str = "stats.yavg";

    /// Fields searched by text-mention detection rules.
    pub const DESCRIPTIVE: [&str; 5] = [COMMENT, DESCRIPTION, CATEGORY, ENCODER, COLOR_MODE];
}

/// exiftool tags that carry the same meaning as technical fields.
const EXIF_TECHNICAL_TAGS: [(&str, &str); 6] = [
    ("Make", fields::MAKE),
    ("Model", fields::MODEL),
    ("Encoder", fields::ENCODER),
    ("Comment", fields::COMMENT),
    ("Description", fields::DESCRIPTION),
    ("Category", fields::CATEGORY),
];

/// Stream-level metadata used for device and profile resolution.
///
/// # Example
///
/// ```
/// use framecut::{TechnicalMetadata, fields};
///
/// let technical = TechnicalMetadata::new()
///     .with(fields::MODEL, "DJI Mini 3 Pro")
///     .with(fields::PIXEL_FORMAT, "yuv420p10le");
/// assert_eq!(technical.bit_depth(), Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechnicalMetadata {
    values: BTreeMap<String, String>,
}

impl TechnicalMetadata {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](TechnicalMetadata::insert).
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a field. Empty values are ignored so "present" always means
    /// "has content".
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if !value.is_empty() {
            self.values.insert(key.to_string(), value.to_string());
        }
    }

    /// Set a field only when it is not already present.
    pub fn insert_if_absent(&mut self, key: &str, value: impl Into<String>) {
        if !self.values.contains_key(key) {
            self.insert(key, value);
        }
    }

    /// Raw field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Field value parsed as a number.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.parse().ok()
    }

    /// Bit depth implied by the pixel format, read from the component depth
    /// FFmpeg puts before the endianness suffix (`yuv420p10le`, `p010le`,
    /// `gray12be`). Formats without one (`yuv420p`, `nv12`) are 8-bit.
    /// `None` when the pixel format is unknown.
    pub fn bit_depth(&self) -> Option<u8> {
        let format = self.get(fields::PIXEL_FORMAT)?.to_ascii_lowercase();
        let Some(stem) = format.strip_suffix("le").or_else(|| format.strip_suffix("be")) else {
            return Some(8);
        };
        let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let depth = stem[stem.len() - digits..].parse::<u8>().ok();
        Some(depth.filter(|depth| (9..=16).contains(depth)).unwrap_or(8))
    }

    /// Copy descriptive tags from exiftool output when the probe did not
    /// already provide them.
    pub fn absorb(&mut self, video: &VideoMetadata) {
        for (tag, field) in EXIF_TECHNICAL_TAGS {
            if let Some(value) = video.get(tag) {
                self.insert_if_absent(field, value);
            }
        }
    }

    /// Iterate over all fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Container-level tags keyed by exiftool tag name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoMetadata {
    tags: BTreeMap<String, String>,
}

impl VideoMetadata {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](VideoMetadata::insert).
    #[must_use]
    pub fn with(mut self, tag: &str, value: impl Into<String>) -> Self {
        self.insert(tag, value);
        self
    }

    /// Set a tag. Blank values are dropped.
    pub fn insert(&mut self, tag: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.tags.insert(tag.to_string(), value);
        }
    }

    /// Tag value, if present.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    /// Iterate over all tags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(tag, value)| (tag.as_str(), value.as_str()))
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if no tag is set.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VideoMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = VideoMetadata::new();
        for (tag, value) in iter {
            let tag: String = tag.into();
            metadata.insert(&tag, value);
        }
        metadata
    }
}
