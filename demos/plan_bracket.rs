//! Show the bracketed frames and metadata an extraction would produce,
//! without running ffmpeg or exiftool on the frames.
//!
//! Usage:
//!   cargo run --example plan_bracket -- <input_file> [timestamp] [frames] [interval]

use std::error::Error;

use framecut::{Bracketing, Catalog, ExtractOptions, Session, parse_timestamp, validate_plan};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "DJI_0001.MP4".to_string());
    let target = parse_timestamp(&args.next().unwrap_or_else(|| "00:00:01.000".to_string()))?;
    let frames: usize = args.next().map(|value| value.parse::<usize>()).transpose()?.unwrap_or(5);
    let interval = parse_timestamp(&args.next().unwrap_or_else(|| "0.1".to_string()))?;

    let options = ExtractOptions::new().with_bracketing(Bracketing::enabled(frames, interval));
    let session = Session::open(&input_path, &Catalog::builtin(), options)?;
    println!(
        "{} / {}",
        session.context().device(),
        session.context().profile().display_name()
    );

    // Check the plan against the probed duration.
    let plan = session.plan(target)?;
    if let Some(probe) = session.probe() {
        print!("{}", validate_plan(&plan, probe));
    }
    for skipped in plan.skipped() {
        println!("Skipping {}: {}", skipped.offset, skipped.reason);
    }

    // One job per frame: where it goes and what gets embedded.
    for job in session.jobs(target)? {
        println!("#{} {} -> {}", job.instant.index, job.instant.offset, job.output.display());
        for (tag, value) in job.record.iter() {
            println!("    {tag}: {value}");
        }
    }
    Ok(())
}
