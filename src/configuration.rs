//! Extraction configuration.
//!
//! [`ExtractOptions`] is a builder that carries the user's overrides,
//! bracketing settings, output location, external tool paths, progress
//! callback and cancellation token into a [`Session`](crate::Session).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use framecut::{Bracketing, CancellationToken, ExtractOptions, Offset};
//!
//! let token = CancellationToken::new();
//! let options = ExtractOptions::new()
//!     .with_device("DJI Mavic 2 Pro")
//!     .with_profile("hlg")
//!     .with_bracketing(Bracketing::enabled(5, Offset::from_millis(100)))
//!     .with_telemetry_window(Duration::from_millis(200))
//!     .with_cancellation(token.clone());
//! assert_eq!(options.device(), Some("DJI Mavic 2 Pro"));
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::ffmpeg::FfmpegLogLevel;
use crate::plan::Bracketing;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Default external decoder binary.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Default metadata tool binary.
pub const DEFAULT_EXIFTOOL: &str = "exiftool";

/// Settings for one extraction run.
///
/// A default-constructed value auto-detects the device and profile,
/// extracts a single frame next to the input video, and embeds metadata.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) device: Option<String>,
    pub(crate) profile: Option<String>,
    pub(crate) bracketing: Bracketing,
    pub(crate) output_directory: Option<PathBuf>,
    pub(crate) overwrite: bool,
    pub(crate) telemetry_window: Option<Duration>,
    pub(crate) analyze: bool,
    pub(crate) embed_metadata: bool,
    pub(crate) ffmpeg: PathBuf,
    pub(crate) exiftool: PathBuf,
    pub(crate) ffmpeg_log_level: FfmpegLogLevel,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("device", &self.device)
            .field("profile", &self.profile)
            .field("bracketing", &self.bracketing)
            .field("output_directory", &self.output_directory)
            .field("overwrite", &self.overwrite)
            .field("telemetry_window", &self.telemetry_window)
            .field("analyze", &self.analyze)
            .field("embed_metadata", &self.embed_metadata)
            .field("ffmpeg", &self.ffmpeg)
            .field("exiftool", &self.exiftool)
            .field("has_cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            device: None,
            profile: None,
            bracketing: Bracketing::disabled(),
            output_directory: None,
            overwrite: false,
            telemetry_window: None,
            analyze: false,
            embed_metadata: true,
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            exiftool: PathBuf::from(DEFAULT_EXIFTOOL),
            ffmpeg_log_level: FfmpegLogLevel::Error,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
        }
    }

    /// Force a catalog device instead of detecting it.
    #[must_use]
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Force a colour profile instead of detecting it.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set bracketing.
    #[must_use]
    pub fn with_bracketing(mut self, bracketing: Bracketing) -> Self {
        self.bracketing = bracketing;
        self
    }

    /// Write frames into `directory` instead of next to the video.
    #[must_use]
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(directory.into());
        self
    }

    /// Replace existing output files.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Ignore telemetry records farther than `window` from an instant.
    #[must_use]
    pub fn with_telemetry_window(mut self, window: Duration) -> Self {
        self.telemetry_window = Some(window);
        self
    }

    /// Sample content statistics before profile detection.
    #[must_use]
    pub fn with_analysis(mut self, analyze: bool) -> Self {
        self.analyze = analyze;
        self
    }

    /// Write fused metadata into each frame. Defaults to `true`.
    #[must_use]
    pub fn with_metadata_embedding(mut self, embed: bool) -> Self {
        self.embed_metadata = embed;
        self
    }

    /// Path to the `ffmpeg` binary.
    #[must_use]
    pub fn with_ffmpeg(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg = path.into();
        self
    }

    /// Path to the `exiftool` binary.
    #[must_use]
    pub fn with_exiftool(mut self, path: impl Into<PathBuf>) -> Self {
        self.exiftool = path.into();
        self
    }

    /// Log level passed to the external `ffmpeg` process.
    #[must_use]
    pub fn with_ffmpeg_log_level(mut self, level: FfmpegLogLevel) -> Self {
        self.ffmpeg_log_level = level;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token, checked between jobs.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Device override.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Profile override.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Bracketing settings.
    pub fn bracketing(&self) -> &Bracketing {
        &self.bracketing
    }

    /// Explicit output directory.
    pub fn output_directory(&self) -> Option<&Path> {
        self.output_directory.as_deref()
    }

    /// Whether existing outputs are replaced.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Telemetry tolerance.
    pub fn telemetry_window(&self) -> Option<Duration> {
        self.telemetry_window
    }

    /// Whether content analysis runs.
    pub fn analyze(&self) -> bool {
        self.analyze
    }

    /// Whether metadata is embedded.
    pub fn embed_metadata(&self) -> bool {
        self.embed_metadata
    }

    /// `ffmpeg` binary.
    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    /// `exiftool` binary.
    pub fn exiftool(&self) -> &Path {
        &self.exiftool
    }

    /// Log level for the external decoder.
    pub fn ffmpeg_log_level(&self) -> FfmpegLogLevel {
        self.ffmpeg_log_level
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
