//! Frame decoder argument tests.

use std::path::Path;

use framecut::{
    Catalog, ExtractionInstant, FfmpegDecoder, FfmpegLogLevel, FrameDecoder, FramecutError, Offset,
    extract_arguments,
};

fn instant(millis: i64) -> ExtractionInstant {
    ExtractionInstant {
        offset: Offset::from_millis(millis),
        index: 0,
    }
}

#[test]
fn seek_precedes_input() {
    let parameters = Catalog::builtin().base_parameters().clone();
    let args = extract_arguments(
        Path::new("DJI_0001.MP4"),
        &instant(83_500),
        &parameters,
        Path::new("out/DJI_0001-000123.500.tiff"),
        FfmpegLogLevel::Error,
    );

    assert_eq!(&args[..7], &["-y", "-loglevel", "error", "-ss", "83.500000", "-i", "DJI_0001.MP4"]);
    assert_eq!(&args[7..args.len() - 3], parameters.to_args().as_slice());
    assert_eq!(
        &args[args.len() - 3..],
        &["-frames:v", "1", "out/DJI_0001-000123.500.tiff"],
    );
}

#[test]
fn log_level_is_forwarded() {
    let args = extract_arguments(
        Path::new("in.mp4"),
        &instant(0),
        &Default::default(),
        Path::new("out.tiff"),
        FfmpegLogLevel::Warning,
    );
    assert_eq!(args[2], "warning");
    assert_eq!(args.len(), 10);
}

#[test]
fn missing_binary_is_spawn_error() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let decoder = FfmpegDecoder::new("/nonexistent/ffmpeg-binary");
    let output = directory.path().join("nested").join("frame.tiff");

    let result = decoder.extract(Path::new("in.mp4"), &instant(0), &Default::default(), &output);
    assert!(matches!(result, Err(FramecutError::CommandSpawn { .. })));
    // The output directory is prepared before the tool runs.
    assert!(output.parent().unwrap().is_dir());
}

#[test]
fn log_level_names() {
    assert_eq!("warn".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Warning));
    assert_eq!("Debug".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Debug));
    assert!("chatty".parse::<FfmpegLogLevel>().is_err());
    for level in FfmpegLogLevel::ALL {
        assert_eq!(level.as_arg().parse::<FfmpegLogLevel>(), Ok(level));
    }
}
