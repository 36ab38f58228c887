//! Extract a tagged 16-bit TIFF frame from a video.
//!
//! Usage:
//!   cargo run --example extract_frame -- <input_file> [timestamp]

use std::error::Error;

use framecut::{Catalog, ExifTool, ExtractOptions, FfmpegDecoder, Session, parse_timestamp};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "DJI_0001.MP4".to_string());
    let timestamp = args.next().unwrap_or_else(|| "00:00:01.000".to_string());

    println!("Opening {input_path}...");
    let catalog = Catalog::builtin();
    let session = Session::open(&input_path, &catalog, ExtractOptions::new().with_overwrite(true))?;

    // Print what was detected.
    let context = session.context();
    println!("Device: {}", context.device());
    println!("Profile: {}", context.profile().display_name());
    println!("Parameters: {}", context.parameters());
    if let Some(telemetry) = session.telemetry() {
        println!("Telemetry: {} records", telemetry.len());
    }

    // Extract one frame and embed its metadata.
    let target = parse_timestamp(&timestamp)?;
    println!("Extracting frame at {target}...");
    let written = session.run(target, &FfmpegDecoder::default(), &ExifTool::default())?;
    for path in &written {
        println!("Saved {}", path.display());
    }

    println!("Done!");
    Ok(())
}
