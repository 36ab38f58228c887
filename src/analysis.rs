//! Content statistics for colour-profile detection.
//!
//! Flat log profiles look dim and desaturated, HLG looks bright. When the
//! colour tags are inconclusive, [`ContentAnalyzer`] samples frames through
//! FFmpeg's `signalstats` filter and stores normalized luma and saturation
//! statistics in the technical metadata, where detection rules can test
//! them.

use std::path::{Path, PathBuf};

use crate::error::FramecutError;
use crate::metadata::{TechnicalMetadata, fields};
use crate::probe::ProbeReport;
use crate::utilities::run_command;

/// Frames sampled by default.
pub const DEFAULT_SAMPLE_FRAMES: usize = 15;

const YAVG_KEY: &str = "lavfi.signalstats.YAVG=";
const SATAVG_KEY: &str = "lavfi.signalstats.SATAVG=";

/// Normalized statistics, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentStats {
    /// 90th percentile of per-frame average luma.
    pub p90y: f64,
    /// Mean of per-frame average saturation, when the filter reported any.
    pub satavg: Option<f64>,
    /// Mean of per-frame average luma.
    pub yavg: f64,
}

impl ContentStats {
    /// Store the statistics in `technical` under the `fields::STAT_*` keys.
    /// A missing saturation leaves `STAT_SATAVG` unset.
    pub fn apply(&self, technical: &mut TechnicalMetadata) {
        technical.insert(fields::STAT_P90Y, format!("{:.4}", self.p90y));
        if let Some(satavg) = self.satavg {
            technical.insert(fields::STAT_SATAVG, format!("{satavg:.4}"));
        }
        technical.insert(fields::STAT_YAVG, format!("{:.4}", self.yavg));
    }
}

/// Runs `signalstats` through an external `ffmpeg`.
#[derive(Debug, Clone)]
pub struct ContentAnalyzer {
    ffmpeg: PathBuf,
    frames: usize,
}

impl ContentAnalyzer {
    /// Analyzer using the given `ffmpeg` binary.
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            frames: DEFAULT_SAMPLE_FRAMES,
        }
    }

    /// Number of frames to sample. Clamped to at least one.
    #[must_use]
    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames.max(1);
        self
    }

    /// Sample frames spread over the whole video.
    ///
    /// # Errors
    ///
    /// Returns a command error if `ffmpeg` fails, or
    /// [`FramecutError::MetadataParse`] if it reports no luma samples.
    pub fn analyze(&self, video: &Path, probe: &ProbeReport) -> Result<ContentStats, FramecutError> {
        let frames_total = (probe.duration.as_secs_f64() * probe.frames_per_second) as usize;
        let skip = if probe.duration.as_secs_f64() < 1.0 {
            1
        } else {
            (frames_total / (self.frames * 2)).max(1)
        };
        log::info!("Sampling {} frames for content analysis", self.frames);
        log::debug!("Selecting every {skip}th frame of about {frames_total}");

        let directory = tempfile::Builder::new().prefix("framecut-analysis").tempdir()?;
        let stats_file = directory.path().join("stats.txt");
        let filter = format!(
            "select='not(mod(n\\,{skip}))',signalstats,metadata=print:file={}",
            escape_filter_path(&stats_file)
        );

        let args: Vec<String> = vec![
            "-v".into(),
            "error".into(),
            "-i".into(),
            video.display().to_string(),
            "-vf".into(),
            filter,
            "-frames:v".into(),
            self.frames.to_string(),
            "-an".into(),
            "-f".into(),
            "null".into(),
            "-".into(),
        ];
        run_command(&self.ffmpeg, &args)?;

        let text = std::fs::read_to_string(&stats_file)?;
        let bit_depth = probe.technical.bit_depth().unwrap_or(8);
        let stats = summarize(&text, bit_depth)?;
        log::debug!(
            "Content statistics: p90y={:.3} satavg={:?} yavg={:.3}",
            stats.p90y,
            stats.satavg,
            stats.yavg
        );
        Ok(stats)
    }
}

/// Reduce `metadata=print` output to normalized statistics.
///
/// Raw values are in code values of the source bit depth and are divided
/// by `2^bits - 1`.
///
/// # Errors
///
/// Returns [`FramecutError::MetadataParse`] if the text holds no `YAVG`
/// sample.
pub fn summarize(text: &str, bit_depth: u8) -> Result<ContentStats, FramecutError> {
    let mut luma = Vec::new();
    let mut saturation = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(value) = sample(line, YAVG_KEY) {
            luma.push(value);
        } else if let Some(value) = sample(line, SATAVG_KEY) {
            saturation.push(value);
        }
    }

    if luma.is_empty() {
        return Err(FramecutError::MetadataParse(
            "signalstats produced no luma samples".to_string(),
        ));
    }

    let max_value = ((1u32 << bit_depth.min(16)) - 1) as f64;
    luma.sort_by(f64::total_cmp);
    let p90_index = ((luma.len() as f64 * 0.9) as usize).min(luma.len() - 1);

    Ok(ContentStats {
        p90y: luma[p90_index] / max_value,
        satavg: mean(&saturation).map(|value| value / max_value),
        yavg: luma.iter().sum::<f64>() / luma.len() as f64 / max_value,
    })
}

fn sample(line: &str, key: &str) -> Option<f64> {
    let position = line.find(key)?;
    line[position + key.len()..].trim().parse().ok()
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Escape a path for use inside a filter-graph option value.
fn escape_filter_path(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}
