//! Session integration tests.
//!
//! External tools are replaced by in-process stubs so these run without
//! ffmpeg or exiftool installed.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use framecut::{
    Bracketing, CancellationToken, Catalog, ColorProfile, ExtractOptions, ExtractionInstant,
    FrameDecoder, FramecutError, MetadataEmbedder, MetadataRecord, Offset, OperationType,
    ParameterFragment, ProgressCallback, ProgressInfo, ResolvedContext, Session, TechnicalMetadata,
    TelemetryRecord, TelemetrySequence, VideoMetadata, fields,
};

/// Writes a placeholder file instead of decoding.
#[derive(Default)]
struct StubDecoder {
    calls: Mutex<Vec<(Offset, ParameterFragment)>>,
}

impl FrameDecoder for StubDecoder {
    fn extract(
        &self,
        _video: &Path,
        instant: &ExtractionInstant,
        parameters: &ParameterFragment,
        output: &Path,
    ) -> Result<(), FramecutError> {
        std::fs::write(output, b"frame")?;
        self.calls
            .lock()
            .unwrap()
            .push((instant.offset, parameters.clone()));
        Ok(())
    }
}

/// Records what would have been embedded.
#[derive(Default)]
struct StubEmbedder {
    calls: Mutex<Vec<(PathBuf, MetadataRecord, String)>>,
}

impl MetadataEmbedder for StubEmbedder {
    fn embed(
        &self,
        image: &Path,
        record: &MetadataRecord,
        context: &ResolvedContext,
    ) -> Result<(), FramecutError> {
        self.calls.lock().unwrap().push((
            image.to_path_buf(),
            record.clone(),
            context.device().to_string(),
        ));
        Ok(())
    }
}

#[derive(Default)]
struct CountingProgress {
    events: Mutex<Vec<(OperationType, u64)>>,
}

impl ProgressCallback for CountingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.events.lock().unwrap().push((info.operation, info.current));
    }
}

fn mavic_video() -> VideoMetadata {
    VideoMetadata::new()
        .with("Make", "DJI")
        .with("Model", "Mavic 2 Pro")
        .with("CreateDate", "2024-05-01 14:03:27")
}

fn telemetry() -> TelemetrySequence {
    let mut first = TelemetryRecord::at(Duration::from_millis(1_750)).with_field("ISO", "100");
    first.color_mode = Some("hlg".to_string());
    TelemetrySequence::new(vec![
        first,
        TelemetryRecord::at(Duration::from_millis(2_000)).with_field("ISO", "200"),
        TelemetryRecord::at(Duration::from_millis(2_250)).with_field("ISO", "400"),
    ])
}

fn session(directory: &Path, options: ExtractOptions) -> Session {
    Session::from_parts(
        directory.join("DJI_0001.MP4"),
        TechnicalMetadata::new().with(fields::PIXEL_FORMAT, "yuv420p10le"),
        Some(mavic_video()),
        Some(telemetry()),
        &Catalog::builtin(),
        options.with_output_directory(directory.join("frames")),
    )
    .expect("session should resolve")
}

// ── Resolution ─────────────────────────────────────────────────────

#[test]
fn video_tags_and_telemetry_drive_resolution() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let session = session(directory.path(), ExtractOptions::new());

    assert_eq!(session.context().device(), "DJI Mavic 2 Pro");
    assert_eq!(session.context().profile(), ColorProfile::Hlg);
    assert_eq!(session.technical().get(fields::MODEL), Some("Mavic 2 Pro"));
    assert_eq!(session.technical().get(fields::COLOR_MODE), Some("hlg"));
    assert!(session.probe().is_none());
}

#[test]
fn invalid_override_fails_construction() {
    let result = Session::from_parts(
        "clip.mp4",
        TechnicalMetadata::new(),
        None,
        None,
        &Catalog::builtin(),
        ExtractOptions::new().with_device("DJI Phantom 4"),
    );
    assert!(matches!(result, Err(FramecutError::UnknownDevice { .. })));
}

#[test]
fn output_directory_defaults_to_video_parent() {
    let session = Session::from_parts(
        "footage/DJI_0001.MP4",
        TechnicalMetadata::new(),
        None,
        None,
        &Catalog::builtin(),
        ExtractOptions::new(),
    )
    .expect("session");
    assert_eq!(session.output_directory(), PathBuf::from("footage"));

    let bare = Session::from_parts(
        "DJI_0001.MP4",
        TechnicalMetadata::new(),
        None,
        None,
        &Catalog::builtin(),
        ExtractOptions::new(),
    )
    .expect("session");
    assert_eq!(bare.output_directory(), PathBuf::from("."));
}

// ── Jobs ───────────────────────────────────────────────────────────

#[test]
fn bracketed_jobs_carry_per_frame_metadata() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_bracketing(Bracketing::enabled(3, Offset::from_millis(250)));
    let session = session(directory.path(), options);

    let jobs = session.jobs(Offset::from_millis(2_000)).expect("jobs");
    assert_eq!(jobs.len(), 3);

    let isos: Vec<Option<&str>> = jobs.iter().map(|job| job.record.get("ISO")).collect();
    assert_eq!(isos, vec![Some("100"), Some("200"), Some("400")]);

    for job in &jobs {
        assert_eq!(&job.parameters, session.context().parameters());
        assert_eq!(job.record.get("DateTimeOriginal"), Some("2024:05:01 14:03:27"));
    }
    assert_eq!(
        jobs[0].output,
        directory.path().join("frames").join("DJI_0001-000001.750.tiff"),
    );
}

#[test]
fn sub_millisecond_bracket_writes_distinct_files() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_bracketing(Bracketing::enabled(3, Offset::from_micros(500)));
    let session = session(directory.path(), options);
    let decoder = StubDecoder::default();
    let embedder = StubEmbedder::default();

    let written = session
        .run(Offset::from_millis(83_500), &decoder, &embedder)
        .expect("run");
    assert_eq!(written.len(), 3);
    assert!(written.windows(2).all(|pair| pair[0] != pair[1]));
    assert!(written.iter().all(|path| path.exists()));
    assert_eq!(
        written[1],
        directory.path().join("frames").join("DJI_0001-000123.500.tiff"),
    );
}

#[test]
fn telemetry_window_applies_to_jobs() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_telemetry_window(Duration::from_millis(100));
    let session = session(directory.path(), options);

    let jobs = session.jobs(Offset::from_millis(10_000)).expect("jobs");
    assert_eq!(jobs[0].record.get("ISO"), None);
}

// ── Running ────────────────────────────────────────────────────────

#[test]
fn run_extracts_and_embeds_in_order() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_bracketing(Bracketing::enabled(3, Offset::from_millis(250)));
    let session = session(directory.path(), options);
    let decoder = StubDecoder::default();
    let embedder = StubEmbedder::default();

    let written = session
        .run(Offset::from_millis(2_000), &decoder, &embedder)
        .expect("run");

    assert_eq!(written.len(), 3);
    assert!(written.iter().all(|path| path.exists()));

    let offsets: Vec<i64> = decoder
        .calls
        .lock()
        .unwrap()
        .iter()
        .map(|(offset, _)| offset.as_millis())
        .collect();
    assert_eq!(offsets, vec![1_750, 2_000, 2_250]);

    let embedded = embedder.calls.lock().unwrap();
    assert_eq!(embedded.len(), 3);
    assert_eq!(embedded[0].0, written[0]);
    assert_eq!(embedded[2].1.get("ISO"), Some("400"));
    assert_eq!(embedded[0].2, "DJI Mavic 2 Pro");
}

#[test]
fn existing_output_is_refused() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let session = session(directory.path(), ExtractOptions::new());
    let target = Offset::from_millis(2_000);
    let existing = session.jobs(target).expect("jobs")[0].output.clone();
    std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
    std::fs::write(&existing, b"keep me").unwrap();

    let decoder = StubDecoder::default();
    let result = session.run(target, &decoder, &StubEmbedder::default());
    assert!(matches!(result, Err(FramecutError::OutputExists(ref path)) if *path == existing));
    assert!(decoder.calls.lock().unwrap().is_empty());
    assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
}

#[test]
fn overwrite_replaces_output() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let session = session(directory.path(), ExtractOptions::new().with_overwrite(true));
    let target = Offset::from_millis(2_000);
    let existing = session.jobs(target).expect("jobs")[0].output.clone();
    std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
    std::fs::write(&existing, b"old").unwrap();

    session
        .run(target, &StubDecoder::default(), &StubEmbedder::default())
        .expect("run");
    assert_eq!(std::fs::read(&existing).unwrap(), b"frame");
}

#[test]
fn metadata_embedding_can_be_disabled() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let session = session(
        directory.path(),
        ExtractOptions::new().with_metadata_embedding(false),
    );
    let embedder = StubEmbedder::default();
    session
        .run(Offset::from_millis(2_000), &StubDecoder::default(), &embedder)
        .expect("run");
    assert!(embedder.calls.lock().unwrap().is_empty());
}

#[test]
fn cancelled_run_writes_nothing() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let token = CancellationToken::new();
    token.cancel();
    let session = session(directory.path(), ExtractOptions::new().with_cancellation(token));

    let decoder = StubDecoder::default();
    let result = session.run(Offset::from_millis(2_000), &decoder, &StubEmbedder::default());
    assert!(matches!(result, Err(FramecutError::Cancelled)));
    assert!(decoder.calls.lock().unwrap().is_empty());
}

#[test]
fn progress_reports_each_stage() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let progress = Arc::new(CountingProgress::default());
    let options = ExtractOptions::new()
        .with_bracketing(Bracketing::enabled(2, Offset::from_millis(500)))
        .with_progress(progress.clone());
    let session = session(directory.path(), options);

    session
        .run(Offset::from_millis(2_000), &StubDecoder::default(), &StubEmbedder::default())
        .expect("run");

    let events = progress.events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (OperationType::FrameExtraction, 1),
            (OperationType::MetadataEmbedding, 1),
            (OperationType::FrameExtraction, 2),
            (OperationType::MetadataEmbedding, 2),
        ],
    );
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_run_keeps_plan_order() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_bracketing(Bracketing::enabled(5, Offset::from_millis(100)));
    let session = session(directory.path(), options);

    let written = session
        .run_parallel(Offset::from_millis(2_000), &StubDecoder::default(), &StubEmbedder::default())
        .expect("run");
    let expected: Vec<PathBuf> = session
        .jobs(Offset::from_millis(2_000))
        .expect("jobs")
        .into_iter()
        .map(|job| job.output)
        .collect();
    assert_eq!(written, expected);
}
