//! Per-frame telemetry from DJI SRT side-car files.
//!
//! DJI cameras write a subtitle file next to each clip. Every cue carries
//! a capture date line and a bracketed telemetry line:
//!
//! ```text
//! 12
//! 00:00:00,400 --> 00:00:00,433
//! <font size="28">FrameCnt: 12, DiffTime: 33ms
//! 2024-05-01 14:03:27.512
//! [iso: 100] [shutter: 1/500.0] [fnum: 170] [ev: 0] [focal_len: 240] [latitude: 46.2044] [longitude: 6.1432] [rel_alt: 1.2 abs_alt: 412.8] </font>
//! ```
//!
//! [`parse_srt`] turns such a file into a [`TelemetrySequence`] ordered by
//! cue start time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::FramecutError;

/// Exposure tags carried in [`TelemetryRecord::fields`], named as exiftool
/// names them.
pub mod tags {
    /// ISO sensitivity.
    pub const ISO: &str = "ISO";
    /// Shutter speed (`1/500`).
    pub const EXPOSURE_TIME: &str = "ExposureTime";
    /// Aperture (`1.7`).
    pub const F_NUMBER: &str = "FNumber";
    /// Exposure compensation in EV.
    pub const EXPOSURE_COMPENSATION: &str = "ExposureCompensation";
    /// Focal length in millimetres.
    pub const FOCAL_LENGTH: &str = "FocalLength";
    /// Capture date (`YYYY:MM:DD HH:MM:SS`).
    pub const DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
}

/// Lines after a cue header searched for its telemetry.
const CUE_LOOKAHEAD: usize = 5;

/// Compile a literal pattern once.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new($re).unwrap())
    }};
}

fn cue_re() -> &'static Regex {
    regex!(r"^\s*(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})\s*-->")
}

fn date_re() -> &'static Regex {
    regex!(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}")
}

fn bracket_re() -> &'static Regex {
    regex!(r"\[([^\]]*)\]")
}

fn pair_re() -> &'static Regex {
    regex!(r"([A-Za-z_]+)\s*:\s*([^\s,\]]+)")
}

/// One telemetry sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryRecord {
    /// Cue start time, relative to the start of the media.
    pub timestamp: Duration,
    /// Signed decimal degrees, north positive.
    pub latitude: Option<f64>,
    /// Signed decimal degrees, east positive.
    pub longitude: Option<f64>,
    /// Absolute altitude in metres.
    pub altitude: Option<f64>,
    /// Remaining scalar fields, keyed by the names in [`tags`].
    pub fields: BTreeMap<String, String>,
    /// Colour mode reported by the camera (`default`, `d_log`).
    pub color_mode: Option<String>,
}

impl TelemetryRecord {
    /// An empty record at `timestamp`.
    pub fn at(timestamp: Duration) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    /// Builder for a position.
    #[must_use]
    pub fn with_position(mut self, latitude: f64, longitude: f64, altitude: Option<f64>) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self.altitude = altitude;
        self
    }

    /// Builder for a scalar field.
    #[must_use]
    pub fn with_field(mut self, tag: &str, value: impl Into<String>) -> Self {
        self.fields.insert(tag.to_string(), value.into());
        self
    }

    /// Scalar field by tag name.
    pub fn field(&self, tag: &str) -> Option<&str> {
        self.fields.get(tag).map(String::as_str)
    }
}

/// Telemetry records in strictly increasing timestamp order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySequence {
    records: Vec<TelemetryRecord>,
}

impl TelemetrySequence {
    /// Sort `records` by timestamp. Of several records sharing a timestamp
    /// only the first is kept.
    pub fn new(mut records: Vec<TelemetryRecord>) -> Self {
        records.sort_by_key(|record| record.timestamp);
        records.dedup_by_key(|record| record.timestamp);
        Self { records }
    }

    /// Records in timestamp order.
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the sequence holds no record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record closest to `at`. Ties go to the earlier record.
    pub fn nearest(&self, at: Duration) -> Option<&TelemetryRecord> {
        let split = self.records.partition_point(|record| record.timestamp < at);
        let before = split.checked_sub(1).and_then(|index| self.records.get(index));
        let after = self.records.get(split);
        match (before, after) {
            (Some(before), Some(after)) => {
                if after.timestamp - at < at - before.timestamp {
                    Some(after)
                } else {
                    Some(before)
                }
            }
            (before, after) => before.or(after),
        }
    }

    /// The first colour mode found in the sequence.
    pub fn color_mode(&self) -> Option<&str> {
        self.records
            .iter()
            .find_map(|record| record.color_mode.as_deref())
    }
}

/// Look for `<stem>.SRT` or `<stem>.srt` next to the video.
pub fn find_sidecar<P: AsRef<Path>>(video: P) -> Option<PathBuf> {
    let video = video.as_ref();
    let found = ["SRT", "srt"]
        .into_iter()
        .map(|extension| video.with_extension(extension))
        .find(|candidate| candidate.is_file());
    match &found {
        Some(path) => log::debug!("Found telemetry side-car: {}", path.display()),
        None => log::debug!("No telemetry side-car for {}", video.display()),
    }
    found
}

/// Read and parse an SRT file.
///
/// # Errors
///
/// Returns [`FramecutError::IoError`] if the file cannot be read, or
/// [`FramecutError::TelemetryParse`] if it contains no subtitle cue.
pub fn load_srt<P: AsRef<Path>>(path: P) -> Result<TelemetrySequence, FramecutError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let sequence = parse_srt(&text)?;
    log::debug!(
        "Read {} telemetry records from {}",
        sequence.len(),
        path.as_ref().display()
    );
    Ok(sequence)
}

/// Parse SRT text. Cues without a telemetry line are skipped.
///
/// # Errors
///
/// Returns [`FramecutError::TelemetryParse`] if the text has no cue at all.
pub fn parse_srt(text: &str) -> Result<TelemetrySequence, FramecutError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut records = Vec::new();
    let mut cues = 0usize;

    for (index, line) in lines.iter().enumerate() {
        let Some(timestamp) = parse_cue_start(line) else {
            continue;
        };
        cues += 1;

        let mut date_line = None;
        let mut telemetry_line = None;
        for candidate in lines.iter().skip(index + 1).take(CUE_LOOKAHEAD) {
            let candidate = candidate.trim();
            if date_re().is_match(candidate) {
                date_line = Some(candidate);
            }
            if candidate.to_ascii_lowercase().contains("[iso") {
                telemetry_line = Some(candidate);
                break;
            }
        }

        match telemetry_line {
            Some(telemetry_line) => {
                records.push(parse_record(timestamp, telemetry_line, date_line));
            }
            None => log::trace!("Cue at {timestamp:?} carries no telemetry"),
        }
    }

    if cues == 0 {
        return Err(FramecutError::TelemetryParse(
            "no subtitle cues found".to_string(),
        ));
    }
    Ok(TelemetrySequence::new(records))
}

fn parse_cue_start(line: &str) -> Option<Duration> {
    let captures = cue_re().captures(line)?;
    let number = |index: usize| -> Option<u64> { captures.get(index)?.as_str().parse().ok() };
    let hours = number(1)?;
    let minutes = number(2)?;
    let seconds = number(3)?;
    let fraction = captures.get(4)?.as_str();
    // `5` means 500 ms, `05` means 50 ms.
    let millis = fraction.parse::<u64>().ok()? * 10u64.pow(3 - fraction.len() as u32);
    Some(Duration::from_millis(
        ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis,
    ))
}

fn parse_record(timestamp: Duration, telemetry_line: &str, date_line: Option<&str>) -> TelemetryRecord {
    let mut record = TelemetryRecord::at(timestamp);

    let pairs = bracket_re()
        .captures_iter(telemetry_line)
        .filter_map(|bracket| bracket.get(1))
        .flat_map(|contents| pair_re().captures_iter(contents.as_str()))
        .filter_map(|pair| Some((pair.get(1)?.as_str().to_ascii_lowercase(), pair.get(2)?.as_str())));

    for (key, value) in pairs {
        match key.as_str() {
            "iso" => insert(&mut record, tags::ISO, value.to_string()),
            "shutter" => {
                let shutter = value.split('.').next().unwrap_or(value);
                insert(&mut record, tags::EXPOSURE_TIME, shutter.to_string());
            }
            "fnum" => {
                if let Some(fnum) = parse_number(&key, value) {
                    insert(&mut record, tags::F_NUMBER, (fnum / 100.0).to_string());
                }
            }
            "ev" => insert(&mut record, tags::EXPOSURE_COMPENSATION, value.to_string()),
            "focal_len" => {
                if let Some(focal) = parse_number(&key, value) {
                    insert(&mut record, tags::FOCAL_LENGTH, (focal / 10.0).to_string());
                }
            }
            "latitude" | "lat" => record.latitude = parse_number(&key, value),
            "longitude" | "lon" | "long" => record.longitude = parse_number(&key, value),
            "abs_alt" => record.altitude = parse_number(&key, value),
            "altitude" if record.altitude.is_none() => {
                record.altitude = parse_number(&key, value);
            }
            "color_md" if record.color_mode.is_none() => {
                record.color_mode = Some(value.to_string());
            }
            _ => {}
        }
    }

    if let Some(date) = date_line.and_then(format_capture_date) {
        insert(&mut record, tags::DATE_TIME_ORIGINAL, date);
    }
    record
}

fn insert(record: &mut TelemetryRecord, tag: &str, value: String) {
    record.fields.insert(tag.to_string(), value);
}

fn parse_number(key: &str, value: &str) -> Option<f64> {
    let parsed = value.parse::<f64>().ok();
    if parsed.is_none() {
        log::debug!("Ignoring unparseable telemetry value {key}={value}");
    }
    parsed
}

/// `2024-05-01 14:03:27.512` → `2024:05:01 14:03:27`.
fn format_capture_date(line: &str) -> Option<String> {
    let seconds_precision = line.get(..19)?;
    let parsed = NaiveDateTime::parse_from_str(seconds_precision, "%Y-%m-%d %H:%M:%S").ok()?;
    Some(parsed.format("%Y:%m:%d %H:%M:%S").to_string())
}
