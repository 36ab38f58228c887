//! Frame extraction through an external `ffmpeg` process.

use std::path::{Path, PathBuf};

use crate::configuration::DEFAULT_FFMPEG;
use crate::error::FramecutError;
use crate::ffmpeg::FfmpegLogLevel;
use crate::parameters::ParameterFragment;
use crate::plan::ExtractionInstant;
use crate::utilities::run_command;

/// Writes one frame of a video to an image file.
pub trait FrameDecoder: Send + Sync {
    /// Decode the frame at `instant` with `parameters` into `output`.
    fn extract(
        &self,
        video: &Path,
        instant: &ExtractionInstant,
        parameters: &ParameterFragment,
        output: &Path,
    ) -> Result<(), FramecutError>;
}

/// The `ffmpeg` command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    program: PathBuf,
    log_level: FfmpegLogLevel,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG)
    }
}

impl FfmpegDecoder {
    /// Use the ffmpeg binary at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            log_level: FfmpegLogLevel::Error,
        }
    }

    /// Verbosity of the child process.
    #[must_use]
    pub fn with_log_level(mut self, level: FfmpegLogLevel) -> Self {
        self.log_level = level;
        self
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn extract(
        &self,
        video: &Path,
        instant: &ExtractionInstant,
        parameters: &ParameterFragment,
        output: &Path,
    ) -> Result<(), FramecutError> {
        if let Some(directory) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(directory)?;
        }
        log::debug!("Extracting frame at {} to {}", instant.offset, output.display());
        let args = extract_arguments(video, instant, parameters, output, self.log_level);
        run_command(&self.program, &args)?;
        log::info!("Frame extracted to {}", output.display());
        Ok(())
    }
}

/// Arguments for one extraction, without the program name.
///
/// Seeking happens before `-i` so ffmpeg jumps to the nearest keyframe and
/// decodes forward to the exact instant.
pub fn extract_arguments(
    video: &Path,
    instant: &ExtractionInstant,
    parameters: &ParameterFragment,
    output: &Path,
    log_level: FfmpegLogLevel,
) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-loglevel".to_string(),
        log_level.as_arg().to_string(),
        "-ss".to_string(),
        instant.offset.to_seek_argument(),
        "-i".to_string(),
        video.display().to_string(),
    ];
    args.extend(parameters.to_args());
    args.extend(["-frames:v".to_string(), "1".to_string()]);
    args.push(output.display().to_string());
    args
}
