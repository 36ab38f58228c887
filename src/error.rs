//! Error types for the `framecut` crate.
//!
//! This module defines [`FramecutError`], the unified error type returned by
//! all fallible operations in the crate. Errors echo the offending input
//! (device name, profile, timestamp, tool invocation) so the caller can
//! report them without additional context.

use std::{io::Error as IoError, path::PathBuf, process::ExitStatus};

use ffmpeg_next::Error as FfmpegError;
use serde_json::Error as JsonError;
use thiserror::Error;

use crate::timecode::Offset;

/// The unified error type for all `framecut` operations.
///
/// The three resolution/planning variants ([`UnknownDevice`],
/// [`UnsupportedProfile`], [`EmptyPlan`]) stem from invalid input
/// combinations and are never retried.
///
/// [`UnknownDevice`]: FramecutError::UnknownDevice
/// [`UnsupportedProfile`]: FramecutError::UnsupportedProfile
/// [`EmptyPlan`]: FramecutError::EmptyPlan
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramecutError {
    /// A device override did not match any catalog entry.
    #[error("Unknown device '{device}'. Available devices: {}", .available.join(", "))]
    UnknownDevice {
        /// The device name that was requested.
        device: String,
        /// Identifiers known to the catalog.
        available: Vec<String>,
    },

    /// A colour profile override is not supported by the resolved device.
    #[error(
        "Color profile '{profile}' is not supported for device {device}. Supported profiles: {}",
        .supported.join(", ")
    )]
    UnsupportedProfile {
        /// The profile name that was requested.
        profile: String,
        /// The device the profile was checked against.
        device: String,
        /// Profiles the device advertises.
        supported: Vec<String>,
    },

    /// Every computed extraction instant fell before the start of the media.
    #[error("No valid extraction instants for target {target}: all offsets are before the start of the media")]
    EmptyPlan {
        /// The requested target offset.
        target: Offset,
    },

    /// A timestamp string could not be parsed.
    #[error("Invalid timestamp '{0}'. Expected HH:MM:SS.mmm, MM:SS.mmm or seconds")]
    InvalidTimestamp(String),

    /// Bracketing settings are unusable (zero frames, non-positive interval).
    #[error("Invalid bracketing settings: {0}")]
    InvalidBracketing(String),

    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the probe.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// An external tool could not be started.
    #[error("Failed to run {tool}: {source}")]
    CommandSpawn {
        /// Program name or path.
        tool: String,
        /// The spawn error.
        #[source]
        source: IoError,
    },

    /// An external tool exited unsuccessfully.
    #[error("{tool} failed ({status}): {stderr}")]
    CommandFailed {
        /// Program name or path.
        tool: String,
        /// Exit status of the process.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// A telemetry side-car could not be parsed.
    #[error("Failed to parse telemetry: {0}")]
    TelemetryParse(String),

    /// Metadata returned by an external reader was malformed.
    #[error("Failed to parse metadata: {0}")]
    MetadataParse(String),

    /// An output file already exists and overwriting was not requested.
    #[error("Output already exists: {} (use --overwrite to replace)", .0.display())]
    OutputExists(PathBuf),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// JSON produced by an external tool could not be decoded.
    #[error("JSON error: {0}")]
    JsonError(#[from] JsonError),
}

impl From<FfmpegError> for FramecutError {
    fn from(error: FfmpegError) -> Self {
        FramecutError::FfmpegError(error.to_string())
    }
}
