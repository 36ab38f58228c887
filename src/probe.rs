//! Technical metadata probing.
//!
//! [`MediaProbe`] opens a video with FFmpeg, reads the container and stream
//! tags, the colour tags and the pixel format of the best video stream,
//! and closes the demuxer again. The result feeds device and colour-profile
//! resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ffmpeg_next::{codec::context::Context as CodecContext, media::Type};

use crate::error::FramecutError;
use crate::metadata::{TechnicalMetadata, fields};

/// Container and stream tag names mapped onto technical fields. Apple
/// QuickTime keys are used by some firmware versions.
const TAG_FIELDS: [(&str, &str); 8] = [
    ("make", fields::MAKE),
    ("com.apple.quicktime.make", fields::MAKE),
    ("model", fields::MODEL),
    ("com.apple.quicktime.model", fields::MODEL),
    ("encoder", fields::ENCODER),
    ("comment", fields::COMMENT),
    ("description", fields::DESCRIPTION),
    ("category", fields::CATEGORY),
];

/// Everything the probe learned about one video.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// Path that was probed.
    pub path: PathBuf,
    /// Container format name (`mov,mp4,m4a,3gp,3g2,mj2`).
    pub format: String,
    /// Container duration, zero when unknown.
    pub duration: Duration,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frame rate, zero when unknown.
    pub frames_per_second: f64,
    /// Video codec name (`hevc`).
    pub codec: String,
    /// Fields for device and profile resolution.
    pub technical: TechnicalMetadata,
}

/// FFmpeg-backed probe.
///
/// # Example
///
/// ```no_run
/// use framecut::{MediaProbe, fields};
///
/// let report = MediaProbe::probe("DJI_0001.MP4")?;
/// println!("{:?} {:?}", report.duration, report.technical.get(fields::PIXEL_FORMAT));
/// # Ok::<(), framecut::FramecutError>(())
/// ```
pub struct MediaProbe;

impl MediaProbe {
    /// Probe a video file.
    ///
    /// # Errors
    ///
    /// Returns [`FramecutError::FileOpen`] if the file cannot be opened or
    /// has no video stream, and [`FramecutError::FfmpegError`] if FFmpeg
    /// cannot be initialised or cannot build a decoder for the stream.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<ProbeReport, FramecutError> {
        let path = path.as_ref();
        let file_open = |reason: String| FramecutError::FileOpen {
            path: path.to_path_buf(),
            reason,
        };

        ffmpeg_next::init()?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| file_open(error.to_string()))?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };
        let format = input_context.format().name().to_string();

        let mut technical = TechnicalMetadata::new();
        copy_tags(&mut technical, input_context.metadata().iter());

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| file_open("no video stream".to_string()))?;
        copy_tags(&mut technical, stream.metadata().iter());

        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let video_decoder = decoder_context.decoder().video()?;

        let primaries = video_decoder.color_primaries();
        let transfer = video_decoder.color_transfer_characteristic();
        let space = video_decoder.color_space();
        let pixel_format = video_decoder.format();
        for (field, name) in [
            (fields::COLOR_PRIMARIES, format!("{primaries:?}")),
            (fields::COLOR_TRANSFER, format!("{transfer:?}")),
            (fields::COLOR_SPACE, format!("{space:?}")),
            (fields::PIXEL_FORMAT, format!("{pixel_format:?}")),
        ] {
            if let Some(tag) = normalize_tag(&name) {
                technical.insert(field, tag);
            }
        }

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            0.0
        };

        let codec = video_decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        log::debug!(
            "Probed {}: {format}, {duration:?}, {} technical fields",
            path.display(),
            technical.len()
        );

        Ok(ProbeReport {
            path: path.to_path_buf(),
            format,
            duration,
            width: video_decoder.width(),
            height: video_decoder.height(),
            frames_per_second,
            codec,
            technical,
        })
    }
}

fn copy_tags<'a>(technical: &mut TechnicalMetadata, tags: impl Iterator<Item = (&'a str, &'a str)>) {
    for (key, value) in tags {
        let key = key.to_ascii_lowercase();
        if let Some((_, field)) = TAG_FIELDS.iter().find(|(tag, _)| *tag == key) {
            technical.insert_if_absent(field, value);
        }
    }
}

/// Turn an ffmpeg-next enum debug name into the tag spelling FFmpeg uses
/// on the command line (`ARIB_STD_B67` → `arib-std-b67`).
pub fn normalize_tag(debug_name: &str) -> Option<String> {
    let tag = debug_name.trim().to_ascii_lowercase().replace('_', "-");
    match tag.as_str() {
        "" | "unspecified" | "none" | "reserved" | "reserved0" => None,
        "bt2020ncl" => Some("bt2020nc".to_string()),
        "bt2020cl" => Some("bt2020c".to_string()),
        _ => Some(tag),
    }
}
