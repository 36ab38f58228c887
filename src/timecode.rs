//! Signed media offsets and timestamp parsing.
//!
//! Extraction instants are measured relative to the start of the media and
//! may be negative while a bracket is being computed, so they are held as a
//! signed microsecond count ([`Offset`]) rather than a [`Duration`].
//!
//! # Example
//!
//! ```
//! use framecut::Offset;
//!
//! let offset: Offset = "00:01:23.500".parse()?;
//! assert_eq!(offset.as_millis(), 83_500);
//! assert_eq!(offset.to_string(), "00:01:23.500");
//! assert_eq!(offset.filename_stamp(), "000123.500");
//! # Ok::<(), framecut::FramecutError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use std::time::Duration;

use crate::error::FramecutError;

const MICROS_PER_MILLI: i64 = 1_000;
const MICROS_PER_SECOND: i64 = 1_000_000;

/// A signed offset from the start of the media, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Offset(i64);

impl Offset {
    /// The start of the media.
    pub const ZERO: Offset = Offset(0);

    /// Create an offset from a microsecond count.
    pub const fn from_micros(micros: i64) -> Self {
        Offset(micros)
    }

    /// Create an offset from a millisecond count.
    pub const fn from_millis(millis: i64) -> Self {
        Offset(millis * MICROS_PER_MILLI)
    }

    /// Create an offset from fractional seconds, rounded to the nearest
    /// microsecond. Out-of-range values saturate.
    pub fn from_secs_f64(seconds: f64) -> Self {
        Offset((seconds * MICROS_PER_SECOND as f64).round() as i64)
    }

    /// Like [`from_secs_f64`](Offset::from_secs_f64), but `None` when the
    /// value is not finite or does not fit in a microsecond count.
    pub fn try_from_secs_f64(seconds: f64) -> Option<Self> {
        let micros = (seconds * MICROS_PER_SECOND as f64).round();
        // i64::MAX as f64 rounds up to 2^63, which itself does not fit.
        (micros.is_finite() && micros >= i64::MIN as f64 && micros < i64::MAX as f64)
            .then(|| Offset(micros as i64))
    }

    /// Addition that returns `None` on overflow.
    pub const fn checked_add(self, rhs: Offset) -> Option<Offset> {
        match self.0.checked_add(rhs.0) {
            Some(micros) => Some(Offset(micros)),
            None => None,
        }
    }

    /// Microsecond count.
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Millisecond count, truncated toward zero.
    pub const fn as_millis(self) -> i64 {
        self.0 / MICROS_PER_MILLI
    }

    /// Fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / MICROS_PER_SECOND as f64
    }

    /// Returns `true` if the offset lies before the start of the media.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Convert to a [`Duration`], or `None` for negative offsets.
    pub fn to_duration(self) -> Option<Duration> {
        u64::try_from(self.0).ok().map(Duration::from_micros)
    }

    /// Absolute distance between two offsets.
    pub fn distance(self, other: Offset) -> Duration {
        Duration::from_micros(self.0.abs_diff(other.0))
    }

    /// Seconds with microsecond precision, as passed to `ffmpeg -ss`.
    pub fn to_seek_argument(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        format!(
            "{sign}{}.{:06}",
            magnitude / MICROS_PER_SECOND as u64,
            magnitude % MICROS_PER_SECOND as u64
        )
    }

    /// File-name friendly stamp, `HHMMSS.mmm`. Offsets with sub-millisecond
    /// digits get `HHMMSS.mmmuuu`, so distinct offsets never share a stamp.
    pub fn filename_stamp(self) -> String {
        let (sign, hours, minutes, seconds, millis) = self.components();
        let micros = self.0.unsigned_abs() % MICROS_PER_MILLI as u64;
        if micros == 0 {
            format!("{sign}{hours:02}{minutes:02}{seconds:02}.{millis:03}")
        } else {
            format!("{sign}{hours:02}{minutes:02}{seconds:02}.{millis:03}{micros:03}")
        }
    }

    fn components(self) -> (&'static str, u64, u64, u64, u64) {
        let sign = if self.0 < 0 { "-" } else { "" };
        let total_millis = self.0.unsigned_abs() / MICROS_PER_MILLI as u64;
        let millis = total_millis % 1_000;
        let total_seconds = total_millis / 1_000;
        (
            sign,
            total_seconds / 3_600,
            (total_seconds / 60) % 60,
            total_seconds % 60,
            millis,
        )
    }
}

impl From<Duration> for Offset {
    fn from(duration: Duration) -> Self {
        Offset(i64::try_from(duration.as_micros()).unwrap_or(i64::MAX))
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset(self.0.saturating_neg())
    }
}

impl Display for Offset {
    /// Formats as `HH:MM:SS.mmm`, with a leading `-` for negative offsets.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let (sign, hours, minutes, seconds, millis) = self.components();
        write!(f, "{sign}{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    }
}

impl FromStr for Offset {
    type Err = FramecutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_timestamp(value)
    }
}

/// Parse a timestamp into an [`Offset`].
///
/// Accepted forms: `HH:MM:SS(.fff)`, `MM:SS(.fff)` and plain seconds
/// (`83.5`). A comma may replace the decimal point, as in SRT cues. A
/// leading `-` yields a negative offset.
///
/// # Errors
///
/// Returns [`FramecutError::InvalidTimestamp`] echoing the input when the
/// value cannot be parsed.
pub fn parse_timestamp(value: &str) -> Result<Offset, FramecutError> {
    let invalid = || FramecutError::InvalidTimestamp(value.to_string());

    let trimmed = value.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    if body.is_empty() {
        return Err(invalid());
    }
    let body = body.replace(',', ".");

    let seconds = if body.contains(':') {
        let parts: Vec<&str> = body.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [hours, minutes, seconds] => (*hours, *minutes, *seconds),
            [minutes, seconds] => ("0", *minutes, *seconds),
            _ => return Err(invalid()),
        };
        let hours = hours.parse::<u64>().map_err(|_| invalid())?;
        let minutes = minutes.parse::<u64>().map_err(|_| invalid())?;
        let seconds = parse_seconds(seconds).ok_or_else(invalid)?;
        let whole = hours
            .checked_mul(3_600)
            .and_then(|hours| hours.checked_add(minutes.checked_mul(60)?))
            .ok_or_else(invalid)?;
        whole as f64 + seconds
    } else {
        parse_seconds(&body).ok_or_else(invalid)?
    };

    let offset = Offset::try_from_secs_f64(seconds).ok_or_else(invalid)?;
    Ok(if negative { -offset } else { offset })
}

fn parse_seconds(value: &str) -> Option<f64> {
    if value.is_empty() || value.starts_with(['-', '+']) {
        return None;
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite())
}
