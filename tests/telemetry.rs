//! SRT telemetry parsing tests.

use std::time::Duration;

use framecut::{FramecutError, TelemetryRecord, TelemetrySequence, find_sidecar, load_srt, parse_srt};

const MINI_SRT: &str = "\
1
00:00:00,000 --> 00:00:00,033
<font size=\"28\">FrameCnt: 1, DiffTime: 33ms
2024-05-01 14:03:27.512
[iso: 100] [shutter: 1/500.0] [fnum: 170] [ev: 0] [focal_len: 240] [latitude: 46.2044] [longitude: -6.1432] [rel_alt: 1.200 abs_alt: 412.800] [color_md: d_cinelike] </font>

2
00:00:00,033 --> 00:00:00,066
<font size=\"28\">FrameCnt: 2, DiffTime: 33ms
2024-05-01 14:03:27.545
[iso: 200] [shutter: 1/1000.0] [fnum: 170] [ev: -0.7] [focal_len: 240] [latitude: 46.2045] [longitude: -6.1433] [rel_alt: 1.300 abs_alt: 412.900] </font>
";

const MAVIC_SRT: &str = "\
1
00:00:01,500 --> 00:00:02,000
F/2.8, SS 320, ISO 100, EV 0, GPS (8.3, 46.1, 19), D 24.5m, H 9.6m
2
00:00:02,000 --> 00:00:02,500
no telemetry here
";

// ── Parsing ────────────────────────────────────────────────────────

#[test]
fn parses_every_cue() {
    let sequence = parse_srt(MINI_SRT).expect("parse");
    assert_eq!(sequence.len(), 2);
    assert_eq!(sequence.records()[0].timestamp, Duration::ZERO);
    assert_eq!(sequence.records()[1].timestamp, Duration::from_millis(33));
}

#[test]
fn converts_exposure_fields() {
    let sequence = parse_srt(MINI_SRT).expect("parse");
    let record = &sequence.records()[0];
    assert_eq!(record.field("ISO"), Some("100"));
    assert_eq!(record.field("ExposureTime"), Some("1/500"));
    assert_eq!(record.field("FNumber"), Some("1.7"));
    assert_eq!(record.field("ExposureCompensation"), Some("0"));
    assert_eq!(record.field("FocalLength"), Some("24"));
    assert_eq!(sequence.records()[1].field("ExposureCompensation"), Some("-0.7"));
}

#[test]
fn reads_position_and_absolute_altitude() {
    let sequence = parse_srt(MINI_SRT).expect("parse");
    let record = &sequence.records()[0];
    assert_eq!(record.latitude, Some(46.2044));
    assert_eq!(record.longitude, Some(-6.1432));
    assert_eq!(record.altitude, Some(412.8));
}

#[test]
fn capture_date_uses_exif_format() {
    let sequence = parse_srt(MINI_SRT).expect("parse");
    assert_eq!(
        sequence.records()[0].field("DateTimeOriginal"),
        Some("2024:05:01 14:03:27"),
    );
}

#[test]
fn colour_mode_is_captured() {
    let sequence = parse_srt(MINI_SRT).expect("parse");
    assert_eq!(sequence.color_mode(), Some("d_cinelike"));
    assert_eq!(sequence.records()[1].color_mode, None);
}

#[test]
fn cues_without_telemetry_line_are_skipped() {
    let sequence = parse_srt(MAVIC_SRT).expect("parse");
    assert!(sequence.is_empty());
}

#[test]
fn text_without_cues_is_an_error() {
    let result = parse_srt("just some text\nwithout timing\n");
    assert!(matches!(result, Err(FramecutError::TelemetryParse(_))));
}

#[test]
fn crlf_line_endings() {
    let sequence = parse_srt(&MINI_SRT.replace('\n', "\r\n")).expect("parse");
    assert_eq!(sequence.len(), 2);
    assert_eq!(sequence.records()[1].field("ISO"), Some("200"));
}

#[test]
fn short_fraction_is_scaled() {
    let text = "1\n00:00:02,5 --> 00:00:03,0\n[iso: 400]\n";
    let sequence = parse_srt(text).expect("parse");
    assert_eq!(sequence.records()[0].timestamp, Duration::from_millis(2_500));
}

// ── Sequence lookup ────────────────────────────────────────────────

fn sequence_at(millis: &[u64]) -> TelemetrySequence {
    TelemetrySequence::new(
        millis
            .iter()
            .map(|ms| TelemetryRecord::at(Duration::from_millis(*ms)))
            .collect(),
    )
}

#[test]
fn new_sorts_and_deduplicates() {
    let sequence = TelemetrySequence::new(vec![
        TelemetryRecord::at(Duration::from_millis(200)).with_field("ISO", "second"),
        TelemetryRecord::at(Duration::from_millis(100)),
        TelemetryRecord::at(Duration::from_millis(200)).with_field("ISO", "third"),
    ]);
    assert_eq!(sequence.len(), 2);
    assert_eq!(sequence.records()[0].timestamp, Duration::from_millis(100));
    assert_eq!(sequence.records()[1].field("ISO"), Some("second"));
}

#[test]
fn nearest_picks_closest_record() {
    let sequence = sequence_at(&[0, 100, 200]);
    let nearest = |ms| sequence.nearest(Duration::from_millis(ms)).map(|r| r.timestamp.as_millis());
    assert_eq!(nearest(0), Some(0));
    assert_eq!(nearest(140), Some(100));
    assert_eq!(nearest(160), Some(200));
    assert_eq!(nearest(5_000), Some(200));
}

#[test]
fn nearest_tie_goes_to_earlier_record() {
    let sequence = sequence_at(&[100, 200]);
    let nearest = sequence.nearest(Duration::from_millis(150)).expect("record");
    assert_eq!(nearest.timestamp, Duration::from_millis(100));
}

#[test]
fn nearest_on_empty_sequence() {
    assert!(TelemetrySequence::default().nearest(Duration::ZERO).is_none());
}

// ── Files ──────────────────────────────────────────────────────────

#[test]
fn finds_and_loads_sidecar() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let video = directory.path().join("DJI_0001.MP4");
    std::fs::write(&video, b"").expect("Failed to write video");
    assert!(find_sidecar(&video).is_none());

    let sidecar = directory.path().join("DJI_0001.SRT");
    std::fs::write(&sidecar, MINI_SRT).expect("Failed to write sidecar");
    let found = find_sidecar(&video).expect("sidecar should be found");
    let sequence = load_srt(found).expect("load");
    assert_eq!(sequence.len(), 2);
}

#[test]
fn load_missing_file_is_io_error() {
    let result = load_srt("does/not/exist.SRT");
    assert!(matches!(result, Err(FramecutError::IoError(_))));
}
