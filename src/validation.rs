//! Pre-flight checks of an extraction plan against the probed video.
//!
//! # Example
//!
//! ```no_run
//! use framecut::{Bracketing, MediaProbe, Offset, plan, validate_plan};
//!
//! let probe = MediaProbe::probe("DJI_0001.MP4")?;
//! let plan = plan(Offset::from_millis(83_500), &Bracketing::disabled())?;
//! let report = validate_plan(&plan, &probe);
//! if !report.is_valid() {
//!     eprint!("{report}");
//! }
//! # Ok::<(), framecut::FramecutError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::metadata::fields;
use crate::plan::ExtractionPlan;
use crate::probe::ProbeReport;

/// Findings of [`validate_plan`].
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Issues that may affect the result.
    pub warnings: Vec<String>,
    /// Issues that will make extraction fail.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of entries (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Check `plan` against what the probe learned about the video.
pub fn validate_plan(plan: &ExtractionPlan, probe: &ProbeReport) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.info.push(format!(
        "Video: {} {}×{} @ {:.2} fps, {:.3}s",
        probe.codec,
        probe.width,
        probe.height,
        probe.frames_per_second,
        probe.duration.as_secs_f64(),
    ));

    // ── Duration ───────────────────────────────────────────────────
    if probe.duration == Duration::ZERO {
        report
            .warnings
            .push("Media duration is unknown, instants cannot be range-checked".to_string());
    } else {
        for instant in plan.instants() {
            let beyond_end = instant
                .offset
                .to_duration()
                .is_some_and(|offset| offset >= probe.duration);
            if beyond_end {
                report.errors.push(format!(
                    "Frame {} at {} is beyond the end of the video ({:.3}s)",
                    instant.index,
                    instant.offset,
                    probe.duration.as_secs_f64(),
                ));
            }
        }
    }

    // ── Skipped instants ───────────────────────────────────────────
    for skipped in plan.skipped() {
        report
            .warnings
            .push(format!("Skipped frame at {}: {}", skipped.offset, skipped.reason));
    }

    // ── Colour tags ────────────────────────────────────────────────
    let technical = &probe.technical;
    let missing: Vec<&str> = [
        fields::COLOR_PRIMARIES,
        fields::COLOR_TRANSFER,
        fields::COLOR_SPACE,
    ]
    .into_iter()
    .filter(|field| technical.get(field).is_none())
    .collect();
    if !missing.is_empty() {
        report.warnings.push(format!(
            "Missing colour tags ({}), profile detection relies on other signals",
            missing.join(", "),
        ));
    }

    match technical.bit_depth() {
        Some(depth) => report.info.push(format!("{depth}-bit source")),
        None => report
            .warnings
            .push("Pixel format unknown, bit depth cannot be determined".to_string()),
    }

    if probe.width == 0 || probe.height == 0 {
        report.errors.push(format!(
            "Invalid video dimensions: {}×{}",
            probe.width, probe.height,
        ));
    }

    report
}
