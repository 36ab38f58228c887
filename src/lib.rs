//! # framecut
//!
//! Extract maximum-quality still frames from drone and action-camera footage.
//!
//! `framecut` writes 16-bit RGB TIFF frames from a video at a chosen
//! timestamp, optionally bracketed by neighbouring frames, and embeds the
//! camera metadata that the video container drops: exposure settings from
//! the DJI `.SRT` telemetry side-car, GPS position, capture date, make and
//! model. Decoder parameters are chosen from the recording device and the
//! colour profile it shot in (Normal, D-Cinelike, D-Log, HLG), both of which
//! are detected automatically and can be overridden.
//!
//! Frames are decoded by the `ffmpeg` binary and tagged by `exiftool`;
//! stream probing uses FFmpeg in-process via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next).
//!
//! ## Quick Start
//!
//! ### Extract a Frame
//!
//! ```no_run
//! use framecut::{Catalog, ExifTool, ExtractOptions, FfmpegDecoder, Session, parse_timestamp};
//!
//! let catalog = Catalog::builtin();
//! let session = Session::open("DJI_0001.MP4", &catalog, ExtractOptions::new())?;
//! let written = session.run(
//!     parse_timestamp("00:01:23.500")?,
//!     &FfmpegDecoder::default(),
//!     &ExifTool::default(),
//! )?;
//! # Ok::<(), framecut::FramecutError>(())
//! ```
//!
//! ### Bracket Around a Target
//!
//! ```no_run
//! use framecut::{Bracketing, Offset, plan};
//!
//! let bracketing = Bracketing::enabled(5, Offset::from_millis(100));
//! let plan = plan(Offset::from_millis(2_000), &bracketing)?;
//! for instant in plan.instants() {
//!     println!("#{} at {}", instant.index, instant.offset);
//! }
//! # Ok::<(), framecut::FramecutError>(())
//! ```
//!
//! ### Resolve Without Extracting
//!
//! ```
//! use framecut::{Catalog, ColorProfile, TechnicalMetadata, fields, resolve};
//!
//! let catalog = Catalog::builtin();
//! let technical = TechnicalMetadata::new()
//!     .with(fields::MODEL, "Mavic 2 Pro")
//!     .with(fields::COLOR_PRIMARIES, "bt2020")
//!     .with(fields::COLOR_TRANSFER, "arib-std-b67");
//!
//! let context = resolve(&catalog, &technical, None, None)?;
//! assert_eq!(context.device(), "DJI Mavic 2 Pro");
//! assert_eq!(context.profile(), ColorProfile::Hlg);
//! assert_eq!(context.parameters().get("color_trc"), Some("arib-std-b67"));
//! # Ok::<(), framecut::FramecutError>(())
//! ```
//!
//! ## Features
//!
//! - **Device catalog**: DJI Mini 3 Pro, Mavic 2 Pro and Osmo Action 5 Pro,
//!   plus a generic fallback for anything else
//! - **Profile detection**: ordered rules over descriptive tags, colour tags,
//!   bit depth and sampled luminance/saturation statistics
//! - **Parameter synthesis**: base, device and profile fragments layered
//!   into one set of decoder directives
//! - **Bracketing**: frames centred on the target, out-of-range instants
//!   skipped instead of clamped
//! - **Metadata fusion**: nearest telemetry record per frame, gaps filled
//!   from the video's own tags
//! - **Validation**: check a plan against the probed video before running
//! - **Progress & cancellation**: per-job callbacks and a
//!   `CancellationToken`
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | `Session::run_parallel()` runs extraction jobs on the rayon pool |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries are needed to build. The `ffmpeg` and
//! `exiftool` binaries must be on `PATH` (or configured through
//! [`ExtractOptions`]) at run time.

pub mod analysis;
pub mod catalog;
pub mod configuration;
pub mod detection;
pub mod error;
pub mod exiftool;
pub mod extract;
pub mod ffmpeg;
pub mod fusion;
pub mod metadata;
pub mod parameters;
pub mod plan;
pub mod probe;
pub mod profile;
pub mod progress;
#[cfg(feature = "rayon")]
mod rayon;
pub mod resolver;
pub mod session;
pub mod telemetry;
pub mod timecode;
mod utilities;
pub mod validation;

pub use analysis::{ContentAnalyzer, ContentStats, summarize};
pub use catalog::{Catalog, DeviceProfile, GENERIC_DEVICE, standard_profile_parameters};
pub use configuration::ExtractOptions;
pub use detection::{DetectionRule, Predicate};
pub use error::FramecutError;
pub use exiftool::{ExifTool, MetadataEmbedder, embed_arguments, parse_json};
pub use extract::{FfmpegDecoder, FrameDecoder, extract_arguments};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use fusion::{FusionEngine, MetadataRecord};
pub use metadata::{TechnicalMetadata, VideoMetadata, fields};
pub use parameters::{ParameterFragment, synthesize};
pub use plan::{Bracketing, ExtractionInstant, ExtractionPlan, SkippedInstant, plan};
pub use probe::{MediaProbe, ProbeReport, normalize_tag};
pub use profile::ColorProfile;
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use resolver::{ResolvedContext, match_device, resolve};
pub use session::{ExtractionJob, Session};
pub use telemetry::{TelemetryRecord, TelemetrySequence, find_sidecar, load_srt, parse_srt};
pub use timecode::{Offset, parse_timestamp};
pub use utilities::{OUTPUT_EXTENSION, output_path};
pub use validation::{ValidationReport, validate_plan};
