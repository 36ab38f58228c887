//! Per-instant metadata fusion.
//!
//! For each extraction instant the [`FusionEngine`] picks the telemetry
//! record nearest in time and fills the fields that record lacks from the
//! video-level metadata. The result is a [`MetadataRecord`] keyed by
//! exiftool tag names, ready to be embedded into the extracted frame.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use framecut::{
//!     ExtractionInstant, FusionEngine, Offset, TelemetryRecord, TelemetrySequence, VideoMetadata,
//! };
//!
//! let telemetry = TelemetrySequence::new(vec![
//!     TelemetryRecord::at(Duration::from_secs(1)).with_position(46.2, -6.1, Some(410.0)),
//!     TelemetryRecord::at(Duration::from_secs(2)).with_position(46.3, -6.2, Some(420.0)),
//! ]);
//! let video = VideoMetadata::new().with("ISO", "200");
//! let instant = ExtractionInstant { offset: Offset::from_millis(1_400), index: 0 };
//!
//! let record = FusionEngine::new().fuse(&instant, Some(&telemetry), Some(&video));
//! assert_eq!(record.get("GPSLatitude"), Some("46.2"));
//! assert_eq!(record.get("GPSLongitudeRef"), Some("W"));
//! assert_eq!(record.get("ISO"), Some("200"));
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use crate::metadata::VideoMetadata;
use crate::plan::ExtractionInstant;
use crate::telemetry::{TelemetryRecord, TelemetrySequence, tags};

/// exiftool GPS tag names.
pub mod gps {
    /// Absolute latitude in decimal degrees.
    pub const LATITUDE: &str = "GPSLatitude";
    /// `N` or `S`.
    pub const LATITUDE_REF: &str = "GPSLatitudeRef";
    /// Absolute longitude in decimal degrees.
    pub const LONGITUDE: &str = "GPSLongitude";
    /// `E` or `W`.
    pub const LONGITUDE_REF: &str = "GPSLongitudeRef";
    /// Absolute altitude in metres.
    pub const ALTITUDE: &str = "GPSAltitude";
    /// `Above Sea Level` or `Below Sea Level`.
    pub const ALTITUDE_REF: &str = "GPSAltitudeRef";
}

/// Tags copied from the video when the telemetry record lacks them.
const FALLBACK_TAGS: [&str; 11] = [
    tags::ISO,
    tags::EXPOSURE_TIME,
    tags::F_NUMBER,
    tags::EXPOSURE_COMPENSATION,
    tags::FOCAL_LENGTH,
    gps::LATITUDE,
    gps::LATITUDE_REF,
    gps::LONGITUDE,
    gps::LONGITUDE_REF,
    gps::ALTITUDE,
    gps::ALTITUDE_REF,
];

const CREATE_DATE: &str = "CreateDate";

/// Metadata to embed into one frame, keyed by exiftool tag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    tags: BTreeMap<String, String>,
}

impl MetadataRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag value, if present.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    /// Returns `true` if `tag` is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Set `tag`. Blank values are dropped.
    pub fn insert(&mut self, tag: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.tags.insert(tag.to_string(), value);
        }
    }

    fn insert_if_absent(&mut self, tag: &str, value: &str) {
        if !self.contains(tag) {
            self.insert(tag, value);
        }
    }

    /// Iterate over tags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(tag, value)| (tag.as_str(), value.as_str()))
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if the record holds no tag.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Builds [`MetadataRecord`]s from telemetry and video metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FusionEngine {
    max_distance: Option<Duration>,
}

impl FusionEngine {
    /// An engine that always uses the nearest record, however far.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore telemetry whose nearest record is farther than `window` from
    /// the instant.
    #[must_use]
    pub fn with_max_distance(mut self, window: Duration) -> Self {
        self.max_distance = Some(window);
        self
    }

    /// The configured tolerance, if any.
    pub fn max_distance(&self) -> Option<Duration> {
        self.max_distance
    }

    /// Fuse metadata for one valid instant.
    ///
    /// Telemetry fields take precedence; video fields fill the gaps. A
    /// field absent from both sources is omitted.
    pub fn fuse(
        &self,
        instant: &ExtractionInstant,
        telemetry: Option<&TelemetrySequence>,
        video: Option<&VideoMetadata>,
    ) -> MetadataRecord {
        let mut record = MetadataRecord::new();

        if let Some(nearest) = telemetry.and_then(|telemetry| self.nearest(instant, telemetry)) {
            apply_telemetry(&mut record, nearest);
        }

        if let Some(video) = video {
            apply_video(&mut record, video);
        }

        log::debug!(
            "Fused {} metadata fields for frame {} at {}",
            record.len(),
            instant.index,
            instant.offset
        );
        record
    }

    fn nearest<'a>(
        &self,
        instant: &ExtractionInstant,
        telemetry: &'a TelemetrySequence,
    ) -> Option<&'a TelemetryRecord> {
        let at = instant.offset.to_duration()?;
        let nearest = telemetry.nearest(at)?;
        let distance = nearest.timestamp.abs_diff(at);
        if self.max_distance.is_some_and(|window| distance > window) {
            log::warn!(
                "No telemetry within {:?} of {}, nearest is {distance:?} away",
                self.max_distance.unwrap_or_default(),
                instant.offset
            );
            return None;
        }
        log::trace!("Using telemetry at {:?} for {}", nearest.timestamp, instant.offset);
        Some(nearest)
    }
}

fn apply_telemetry(record: &mut MetadataRecord, telemetry: &TelemetryRecord) {
    for (tag, value) in &telemetry.fields {
        record.insert(tag, value.as_str());
    }
    if let Some(latitude) = telemetry.latitude {
        record.insert(gps::LATITUDE, latitude.abs().to_string());
        record.insert(gps::LATITUDE_REF, if latitude < 0.0 { "S" } else { "N" });
    }
    if let Some(longitude) = telemetry.longitude {
        record.insert(gps::LONGITUDE, longitude.abs().to_string());
        record.insert(gps::LONGITUDE_REF, if longitude < 0.0 { "W" } else { "E" });
    }
    if let Some(altitude) = telemetry.altitude {
        record.insert(gps::ALTITUDE, altitude.abs().to_string());
        record.insert(
            gps::ALTITUDE_REF,
            if altitude < 0.0 {
                "Below Sea Level"
            } else {
                "Above Sea Level"
            },
        );
    }
}

fn apply_video(record: &mut MetadataRecord, video: &VideoMetadata) {
    for tag in FALLBACK_TAGS {
        if let Some(value) = video.get(tag) {
            record.insert_if_absent(tag, value);
        }
    }
    let capture_date = video
        .get(tags::DATE_TIME_ORIGINAL)
        .or_else(|| video.get(CREATE_DATE));
    if let Some(date) = capture_date {
        // QuickTime dates may use `YYYY-MM-DD`; EXIF wants `YYYY:MM:DD`.
        let normalized = match date.get(..10) {
            Some(day) => format!("{}{}", day.replace('-', ":"), &date[10..]),
            None => date.to_string(),
        };
        record.insert_if_absent(tags::DATE_TIME_ORIGINAL, &normalized);
    }
}
