use std::{
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use framecut::{
    Bracketing, Catalog, ExifTool, ExtractOptions, FfmpegDecoder, FfmpegLogLevel, Offset,
    OperationType, ProgressCallback, ProgressInfo, Session, parse_timestamp,
};

const CLI_AFTER_HELP: &str = "Examples:\n  framecut extract DJI_0001.MP4 00:01:23.500\n  framecut extract DJI_0001.MP4 83.5 -b -f 5 -i 0.1 -o frames --progress\n  framecut plan DJI_0001.MP4 00:01:23 -p d_log --json\n  framecut devices\n  framecut completions zsh > _framecut";

#[derive(Debug, Parser)]
#[command(
    name = "framecut",
    version,
    about = "Extract 16-bit TIFF frames from camera footage with device-aware colour handling",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Path to the ffmpeg binary.
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    /// Path to the exiftool binary.
    #[arg(long, global = true)]
    exiftool: Option<PathBuf>,
}

/// Input, target and the settings that shape the plan.
#[derive(Debug, Args, Clone)]
struct SelectionArgs {
    /// Input video file.
    input: PathBuf,

    /// Target timestamp (HH:MM:SS.mmm, MM:SS.mmm or seconds).
    timestamp: String,

    /// Output directory (defaults to the video's directory).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Device override (see `framecut devices`).
    #[arg(short = 'd', long)]
    device: Option<String>,

    /// Colour profile override (normal, d_cinelike, d_log, hlg).
    #[arg(short = 'p', long)]
    profile: Option<String>,

    /// Extract a bracket of frames around the target.
    #[arg(short = 'b', long)]
    bracket: bool,

    /// Total number of frames in the bracket.
    #[arg(short = 'f', long, default_value_t = 3)]
    frames: usize,

    /// Time between bracketed frames (seconds or HH:MM:SS.mmm).
    #[arg(short = 'i', long, default_value = "0.25", value_parser = parse_seconds)]
    interval: Duration,

    /// Sample frames for luminance and saturation before detecting the profile.
    #[arg(long)]
    analyze: bool,

    /// Ignore telemetry farther than this from a frame (seconds or HH:MM:SS.mmm).
    #[arg(long, value_parser = parse_seconds)]
    telemetry_window: Option<Duration>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract frames and embed metadata.
    #[command(
        about = "Extract frames as 16-bit TIFF",
        after_help = "Examples:\n  framecut extract DJI_0001.MP4 00:01:23.500\n  framecut extract DJI_0001.MP4 1:23.5 -d \"DJI Mavic 2 Pro\" -p hlg -b"
    )]
    Extract {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Replace existing output files.
        #[arg(long)]
        overwrite: bool,

        /// Show a progress bar.
        #[arg(long)]
        progress: bool,

        /// Skip writing EXIF metadata.
        #[arg(long)]
        no_metadata: bool,
    },

    /// Show what `extract` would do without running it.
    #[command(
        about = "Print the extraction plan",
        visible_alias = "dry-run",
        after_help = "Examples:\n  framecut plan DJI_0001.MP4 83.5 -b\n  framecut plan DJI_0001.MP4 83.5 --json"
    )]
    Plan {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Output the plan as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// List supported devices and colour profiles.
    Devices {
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let offset = parse_timestamp(value).map_err(|error| error.to_string())?;
    offset
        .to_duration()
        .ok_or_else(|| format!("'{value}' must not be negative"))
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    value.parse().ok()
}

/// Route library `log` records through a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` selects debug output.
fn install_logger(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Renders session progress as an indicatif bar.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(total: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        match info.operation {
            OperationType::FrameExtraction => {
                self.bar.set_position(info.current);
                if let Some(output) = info.output.as_ref().and_then(|path| path.file_name()) {
                    self.bar.set_message(output.to_string_lossy().into_owned());
                }
            }
            OperationType::MetadataEmbedding => self.bar.set_message("tagged"),
            _ => {}
        }
    }
}

fn bracketing(selection: &SelectionArgs) -> Bracketing {
    if selection.bracket {
        Bracketing::enabled(selection.frames, Offset::from(selection.interval))
    } else {
        Bracketing::disabled()
    }
}

fn base_options(
    global: &GlobalOptions,
    selection: &SelectionArgs,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::new()
        .with_bracketing(bracketing(selection))
        .with_analysis(selection.analyze);

    if let Some(device) = &selection.device {
        options = options.with_device(device.clone());
    }
    if let Some(profile) = &selection.profile {
        options = options.with_profile(profile.clone());
    }
    if let Some(output) = &selection.output {
        options = options.with_output_directory(output.clone());
    }
    if let Some(window) = selection.telemetry_window {
        options = options.with_telemetry_window(window);
    }
    if let Some(ffmpeg) = &global.ffmpeg {
        options = options.with_ffmpeg(ffmpeg.clone());
    }
    if let Some(exiftool) = &global.exiftool {
        options = options.with_exiftool(exiftool.clone());
    }
    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        options = options.with_ffmpeg_log_level(parsed);
    }
    Ok(options)
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    install_logger(global.verbose);
    let level = match &global.log_level {
        Some(level) => parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?,
        None => FfmpegLogLevel::Error,
    };
    framecut::set_ffmpeg_log_level(level);
    Ok(())
}

fn devices_json(catalog: &Catalog) -> Value {
    Value::Array(
        catalog
            .devices()
            .iter()
            .map(|device| {
                json!({
                    "identifier": device.identifier(),
                    "make": device.make(),
                    "model": device.model(),
                    "profiles": device.supported_profile_names(),
                    "default_profile": device.default_profile().name(),
                })
            })
            .collect(),
    )
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;
    let catalog = Catalog::builtin();

    match cli.command {
        Commands::Extract {
            selection,
            overwrite,
            progress,
            no_metadata,
        } => {
            let target = parse_timestamp(&selection.timestamp)?;
            let mut options = base_options(&cli.global, &selection)?
                .with_overwrite(overwrite)
                .with_metadata_embedding(!no_metadata);

            let expected = framecut::plan(target, options.bracketing())?.len() as u64;
            let bar = if progress {
                let bar = Arc::new(TerminalProgress::new(expected)?);
                options = options.with_progress(bar.clone());
                Some(bar)
            } else {
                None
            };

            let decoder = FfmpegDecoder::new(options.ffmpeg()).with_log_level(options.ffmpeg_log_level());
            let embedder = ExifTool::new(options.exiftool());
            let session = Session::open(&selection.input, &catalog, options)?;

            #[cfg(feature = "rayon")]
            let written = session.run_parallel(target, &decoder, &embedder)?;
            #[cfg(not(feature = "rayon"))]
            let written = session.run(target, &decoder, &embedder)?;
            if let Some(progress) = &bar {
                progress.bar.finish_and_clear();
            }

            for path in &written {
                println!("{} {}", "wrote".green().bold(), path.display());
            }
        }
        Commands::Plan { selection, json } => {
            let target = parse_timestamp(&selection.timestamp)?;
            let options = base_options(&cli.global, &selection)?;
            let session = Session::open(&selection.input, &catalog, options)?;
            let plan = session.plan(target)?;
            let jobs = session.jobs(target)?;
            let context = session.context();

            if json {
                let payload = json!({
                    "input": selection.input.display().to_string(),
                    "target": target.to_string(),
                    "device": context.device(),
                    "profile": context.profile().name(),
                    "parameters": context.parameters().to_args(),
                    "skipped": plan.skipped().iter().map(|skipped| json!({
                        "offset": skipped.offset.to_string(),
                        "reason": &skipped.reason,
                    })).collect::<Vec<_>>(),
                    "frames": jobs.iter().map(|job| json!({
                        "index": job.instant.index,
                        "offset": job.instant.offset.to_string(),
                        "output": job.output.display().to_string(),
                        "metadata": job
                            .record
                            .iter()
                            .map(|(tag, value)| (tag.to_string(), Value::from(value)))
                            .collect::<serde_json::Map<String, Value>>(),
                    })).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Device: {}", context.device());
                println!("Profile: {}", context.profile().display_name());
                println!("Parameters: {}", context.parameters());
                if let Some(probe) = session.probe() {
                    print!("{}", framecut::validate_plan(&plan, probe));
                }
                for skipped in plan.skipped() {
                    println!("{} {} ({})", "skip".yellow().bold(), skipped.offset, skipped.reason);
                }
                for job in &jobs {
                    println!(
                        "{} #{} {} -> {}",
                        "frame".cyan().bold(),
                        job.instant.index,
                        job.instant.offset,
                        job.output.display()
                    );
                    for (tag, value) in job.record.iter() {
                        println!("    {tag}: {value}");
                    }
                }
            }
        }
        Commands::Devices { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&devices_json(&catalog))?);
            } else {
                for device in catalog.devices() {
                    let profiles: Vec<&str> = device
                        .supported_profiles()
                        .map(|profile| profile.display_name())
                        .collect();
                    println!("{}: {}", device.identifier().bold(), profiles.join(", "));
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framecut", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
