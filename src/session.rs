//! One extraction run over one video.
//!
//! A [`Session`] gathers every input once (technical metadata, video tags,
//! telemetry), resolves the device and colour profile once, and then turns
//! target timestamps into [`ExtractionJob`]s: the instant, the decoder
//! parameters and the metadata record for each frame. [`Session::run`]
//! hands the jobs to a [`FrameDecoder`] and a [`MetadataEmbedder`].
//!
//! # Example
//!
//! ```no_run
//! use framecut::{Catalog, ExifTool, ExtractOptions, FfmpegDecoder, Offset, Session};
//!
//! let catalog = Catalog::builtin();
//! let session = Session::open("DJI_0001.MP4", &catalog, ExtractOptions::new())?;
//! println!("{} / {}", session.context().device(), session.context().profile());
//!
//! let written = session.run(
//!     Offset::from_millis(83_500),
//!     &FfmpegDecoder::default(),
//!     &ExifTool::default(),
//! )?;
//! # Ok::<(), framecut::FramecutError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::analysis::ContentAnalyzer;
use crate::catalog::Catalog;
use crate::configuration::ExtractOptions;
use crate::error::FramecutError;
use crate::exiftool::{ExifTool, MetadataEmbedder};
use crate::extract::FrameDecoder;
use crate::fusion::{FusionEngine, MetadataRecord};
use crate::metadata::{TechnicalMetadata, VideoMetadata, fields};
use crate::parameters::ParameterFragment;
use crate::plan::{ExtractionInstant, ExtractionPlan, plan};
use crate::probe::{MediaProbe, ProbeReport};
use crate::progress::{OperationType, ProgressTracker};
use crate::resolver::{ResolvedContext, resolve};
use crate::telemetry::{TelemetrySequence, find_sidecar, load_srt};
use crate::timecode::Offset;
use crate::utilities::output_path;

/// Everything needed to produce one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionJob {
    /// When to extract.
    pub instant: ExtractionInstant,
    /// Decoder directives, identical for every job of a session.
    pub parameters: ParameterFragment,
    /// Tags to embed.
    pub record: MetadataRecord,
    /// Destination file.
    pub output: PathBuf,
}

/// Resolved inputs for one video.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    probe: Option<ProbeReport>,
    technical: TechnicalMetadata,
    video: Option<VideoMetadata>,
    telemetry: Option<TelemetrySequence>,
    context: ResolvedContext,
    fusion: FusionEngine,
    options: ExtractOptions,
}

impl Session {
    /// Probe `path` and gather all metadata sources.
    ///
    /// Missing or unreadable side sources (exiftool, telemetry, content
    /// analysis) are logged and skipped. Only the probe itself and
    /// resolution can fail.
    ///
    /// # Errors
    ///
    /// Returns [`FramecutError::FileOpen`] if the video cannot be probed,
    /// or a resolution error for an invalid device or profile override.
    pub fn open<P: AsRef<Path>>(
        path: P,
        catalog: &Catalog,
        options: ExtractOptions,
    ) -> Result<Self, FramecutError> {
        let path = path.as_ref();
        let probe = MediaProbe::probe(path)?;
        let mut technical = probe.technical.clone();

        let video = match ExifTool::new(options.exiftool()).read(path) {
            Ok(video) => Some(video),
            Err(error) => {
                log::warn!("Could not read video metadata: {error}");
                None
            }
        };

        let telemetry = find_sidecar(path).and_then(|sidecar| match load_srt(&sidecar) {
            Ok(telemetry) => Some(telemetry),
            Err(error) => {
                log::warn!("Ignoring telemetry in {}: {error}", sidecar.display());
                None
            }
        });

        if options.analyze() {
            match ContentAnalyzer::new(options.ffmpeg()).analyze(path, &probe) {
                Ok(stats) => {
                    stats.apply(&mut technical);
                    ProgressTracker::new(options.progress.clone(), 1).advance(
                        OperationType::ContentAnalysis,
                        Offset::ZERO,
                        None,
                    );
                }
                Err(error) => log::warn!("Content analysis failed: {error}"),
            }
        }

        let mut session = Self::from_parts(path, technical, video, telemetry, catalog, options)?;
        session.probe = Some(probe);
        Ok(session)
    }

    /// Build a session from metadata gathered elsewhere.
    ///
    /// Descriptive video tags and the telemetry colour mode are merged into
    /// the technical metadata before resolution.
    ///
    /// # Errors
    ///
    /// Returns a resolution error for an invalid device or profile override.
    pub fn from_parts<P: AsRef<Path>>(
        path: P,
        mut technical: TechnicalMetadata,
        video: Option<VideoMetadata>,
        telemetry: Option<TelemetrySequence>,
        catalog: &Catalog,
        options: ExtractOptions,
    ) -> Result<Self, FramecutError> {
        if let Some(video) = &video {
            technical.absorb(video);
        }
        if let Some(color_mode) = telemetry.as_ref().and_then(TelemetrySequence::color_mode) {
            technical.insert_if_absent(fields::COLOR_MODE, color_mode);
        }

        let context = resolve(catalog, &technical, options.device(), options.profile())?;

        let fusion = match options.telemetry_window() {
            Some(window) => FusionEngine::new().with_max_distance(window),
            None => FusionEngine::new(),
        };

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            probe: None,
            technical,
            video,
            telemetry,
            context,
            fusion,
            options,
        })
    }

    /// The source video.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The probe report, when the session was opened from a file.
    pub fn probe(&self) -> Option<&ProbeReport> {
        self.probe.as_ref()
    }

    /// Technical metadata used for resolution.
    pub fn technical(&self) -> &TechnicalMetadata {
        &self.technical
    }

    /// Video tags, if exiftool could read them.
    pub fn video_metadata(&self) -> Option<&VideoMetadata> {
        self.video.as_ref()
    }

    /// Telemetry, if a side-car was found.
    pub fn telemetry(&self) -> Option<&TelemetrySequence> {
        self.telemetry.as_ref()
    }

    /// The resolved device, profile and parameters.
    pub fn context(&self) -> &ResolvedContext {
        &self.context
    }

    /// The options the session was opened with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Where frames are written: the configured directory, or the video's
    /// own directory.
    pub fn output_directory(&self) -> PathBuf {
        match self.options.output_directory() {
            Some(directory) => directory.to_path_buf(),
            None => self
                .path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Plan the instants around `target`.
    ///
    /// # Errors
    ///
    /// Returns [`FramecutError::InvalidBracketing`] or
    /// [`FramecutError::EmptyPlan`].
    pub fn plan(&self, target: Offset) -> Result<ExtractionPlan, FramecutError> {
        plan(target, self.options.bracketing())
    }

    /// Plan `target` and build one job per valid instant.
    ///
    /// # Errors
    ///
    /// Same as [`plan`](Session::plan).
    pub fn jobs(&self, target: Offset) -> Result<Vec<ExtractionJob>, FramecutError> {
        let plan = self.plan(target)?;
        let directory = self.output_directory();
        Ok(plan
            .instants()
            .iter()
            .map(|instant| ExtractionJob {
                instant: *instant,
                parameters: self.context.parameters().clone(),
                record: self
                    .fusion
                    .fuse(instant, self.telemetry.as_ref(), self.video.as_ref()),
                output: output_path(&directory, &self.path, instant.offset),
            })
            .collect())
    }

    /// Extract and tag every frame of the plan around `target`, in order.
    ///
    /// Returns the written files in plan order.
    ///
    /// # Errors
    ///
    /// Returns planning errors, [`FramecutError::OutputExists`] when a
    /// target file exists and overwriting is off, [`FramecutError::Cancelled`]
    /// when the token fires between jobs, or the first decoder or embedder
    /// error.
    pub fn run(
        &self,
        target: Offset,
        decoder: &dyn FrameDecoder,
        embedder: &dyn MetadataEmbedder,
    ) -> Result<Vec<PathBuf>, FramecutError> {
        let jobs = self.prepare(target)?;
        let tracker = ProgressTracker::new(self.options.progress.clone(), jobs.len() as u64);

        let mut written = Vec::with_capacity(jobs.len());
        for job in &jobs {
            if self.options.is_cancelled() {
                return Err(FramecutError::Cancelled);
            }
            written.push(self.execute(job, decoder, embedder, &tracker)?);
        }
        Ok(written)
    }

    /// Like [`run`](Session::run), with jobs processed on the rayon pool.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Session::run).
    #[cfg(feature = "rayon")]
    pub fn run_parallel(
        &self,
        target: Offset,
        decoder: &dyn FrameDecoder,
        embedder: &dyn MetadataEmbedder,
    ) -> Result<Vec<PathBuf>, FramecutError> {
        let jobs = self.prepare(target)?;
        let tracker = ProgressTracker::new(self.options.progress.clone(), jobs.len() as u64);
        crate::rayon::run_jobs(&jobs, |job| {
            if self.options.is_cancelled() {
                return Err(FramecutError::Cancelled);
            }
            self.execute(job, decoder, embedder, &tracker)
        })
    }

    fn prepare(&self, target: Offset) -> Result<Vec<ExtractionJob>, FramecutError> {
        let jobs = self.jobs(target)?;
        std::fs::create_dir_all(self.output_directory())?;
        if !self.options.overwrite() {
            if let Some(existing) = jobs.iter().find(|job| job.output.exists()) {
                return Err(FramecutError::OutputExists(existing.output.clone()));
            }
        }
        log::info!(
            "Extracting {} frame(s) as {} / {}",
            jobs.len(),
            self.context.device(),
            self.context.profile().display_name()
        );
        Ok(jobs)
    }

    fn execute(
        &self,
        job: &ExtractionJob,
        decoder: &dyn FrameDecoder,
        embedder: &dyn MetadataEmbedder,
        tracker: &ProgressTracker,
    ) -> Result<PathBuf, FramecutError> {
        decoder.extract(&self.path, &job.instant, &job.parameters, &job.output)?;
        tracker.advance(
            OperationType::FrameExtraction,
            job.instant.offset,
            Some(job.output.clone()),
        );

        if self.options.embed_metadata() {
            embedder.embed(&job.output, &job.record, &self.context)?;
            tracker.advance(
                OperationType::MetadataEmbedding,
                job.instant.offset,
                Some(job.output.clone()),
            );
        }
        Ok(job.output.clone())
    }
}
