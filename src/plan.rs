//! Extraction planning with optional exposure bracketing.
//!
//! [`plan`] expands a target offset into the ordered list of instants to
//! extract. With bracketing enabled the instants are spaced evenly and
//! centred on the target; instants that fall before the start of the media
//! are dropped and reported in [`ExtractionPlan::skipped`].
//!
//! # Example
//!
//! ```
//! use framecut::{Bracketing, Offset, plan};
//!
//! let bracketing = Bracketing::enabled(3, Offset::from_millis(250));
//! let plan = plan(Offset::from_millis(100), &bracketing).unwrap();
//!
//! let offsets: Vec<i64> = plan.instants().iter().map(|i| i.offset.as_millis()).collect();
//! assert_eq!(offsets, [100, 350]);
//! assert_eq!(plan.skipped().len(), 1);
//! ```

use crate::error::FramecutError;
use crate::timecode::Offset;

/// Default number of frames in a bracket.
pub const DEFAULT_FRAME_COUNT: usize = 3;

/// Default spacing between bracketed frames.
pub const DEFAULT_INTERVAL: Offset = Offset::from_millis(250);

/// Largest accepted bracket.
pub const MAX_FRAME_COUNT: usize = 1_000;

/// Bracketing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracketing {
    /// When `false`, only the target itself is extracted.
    pub enabled: bool,
    /// Total number of frames in the bracket.
    pub frame_count: usize,
    /// Spacing between neighbouring frames.
    pub interval: Offset,
}

impl Bracketing {
    /// A single frame at the target.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            frame_count: DEFAULT_FRAME_COUNT,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// `frame_count` frames spaced by `interval`.
    pub fn enabled(frame_count: usize, interval: Offset) -> Self {
        Self {
            enabled: true,
            frame_count,
            interval,
        }
    }

    fn validate(&self) -> Result<(), FramecutError> {
        if !self.enabled {
            return Ok(());
        }
        if self.frame_count == 0 {
            return Err(FramecutError::InvalidBracketing(
                "frame count must be at least 1".to_string(),
            ));
        }
        if self.frame_count > MAX_FRAME_COUNT {
            return Err(FramecutError::InvalidBracketing(format!(
                "frame count must be at most {MAX_FRAME_COUNT}, got {}",
                self.frame_count
            )));
        }
        if self.frame_count > 1 && self.interval <= Offset::ZERO {
            return Err(FramecutError::InvalidBracketing(format!(
                "interval must be positive, got {}",
                self.interval
            )));
        }
        Ok(())
    }
}

impl Default for Bracketing {
    fn default() -> Self {
        Self::disabled()
    }
}

/// One planned extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionInstant {
    /// Offset from the start of the media.
    pub offset: Offset,
    /// Zero-based position in ascending offset order.
    pub index: usize,
}

impl ExtractionInstant {
    /// An instant is valid when it does not precede the start of the media.
    /// Instants held by an [`ExtractionPlan`] are always valid.
    pub fn is_valid(&self) -> bool {
        !self.offset.is_negative()
    }
}

/// An instant that was dropped from the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInstant {
    /// The computed offset.
    pub offset: Offset,
    /// Why it was dropped.
    pub reason: String,
}

/// Ordered list of valid extraction instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPlan {
    target: Offset,
    instants: Vec<ExtractionInstant>,
    skipped: Vec<SkippedInstant>,
}

impl ExtractionPlan {
    /// The requested target.
    pub fn target(&self) -> Offset {
        self.target
    }

    /// Valid instants in ascending offset order.
    pub fn instants(&self) -> &[ExtractionInstant] {
        &self.instants
    }

    /// Instants dropped while planning.
    pub fn skipped(&self) -> &[SkippedInstant] {
        &self.skipped
    }

    /// Number of valid instants.
    pub fn len(&self) -> usize {
        self.instants.len()
    }

    /// Always `false` for a plan returned by [`plan`].
    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }
}

/// Compute the extraction instants for `target`.
///
/// Offset `i` of an `N`-frame bracket with spacing `I` is
/// `target + (2i - (N - 1)) * I / 2`, so an odd bracket has a frame on the
/// target and an even bracket straddles it.
///
/// # Errors
///
/// - [`FramecutError::InvalidBracketing`] for a zero or oversized frame
///   count, a non-positive interval, an interval too small to give
///   distinct offsets, or offsets that overflow.
/// - [`FramecutError::EmptyPlan`] when every instant precedes the start of
///   the media.
pub fn plan(target: Offset, bracketing: &Bracketing) -> Result<ExtractionPlan, FramecutError> {
    bracketing.validate()?;

    let candidates: Vec<Offset> = if bracketing.enabled {
        let count = bracketing.frame_count as i64;
        let interval = bracketing.interval.as_micros();
        (0..count)
            .map(|i| {
                (2 * i - (count - 1))
                    .checked_mul(interval)
                    .and_then(|step| target.checked_add(Offset::from_micros(step / 2)))
                    .ok_or_else(|| {
                        FramecutError::InvalidBracketing(format!(
                            "bracket of {count} frames every {interval}µs around {target} is out of range"
                        ))
                    })
            })
            .collect::<Result<Vec<_>, FramecutError>>()?
    } else {
        vec![target]
    };
    if candidates.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(FramecutError::InvalidBracketing(format!(
            "interval {}µs is too small to separate {} frames",
            bracketing.interval.as_micros(),
            bracketing.frame_count
        )));
    }

    let mut instants = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();
    for offset in candidates {
        if offset.is_negative() {
            log::warn!("Skipping frame at {offset}: before the start of the video");
            skipped.push(SkippedInstant {
                offset,
                reason: "before the start of the media".to_string(),
            });
        } else {
            instants.push(ExtractionInstant {
                offset,
                index: instants.len(),
            });
        }
    }

    if instants.is_empty() {
        return Err(FramecutError::EmptyPlan { target });
    }

    Ok(ExtractionPlan {
        target,
        instants,
        skipped,
    })
}
