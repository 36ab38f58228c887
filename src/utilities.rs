//! Internal utility functions.
//!
//! Helpers for running external tools and naming output files.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::FramecutError;
use crate::timecode::Offset;

/// Extension of every extracted frame.
pub const OUTPUT_EXTENSION: &str = "tiff";

/// Run an external program to completion and capture its output.
///
/// A non-zero exit status becomes [`FramecutError::CommandFailed`] carrying
/// the trimmed standard error.
pub(crate) fn run_command<I, S>(program: &Path, args: I) -> Result<Output, FramecutError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool = program.display().to_string();
    let mut command = Command::new(program);
    command.args(args);
    log::debug!("Running {command:?}");

    let output = command.output().map_err(|source| FramecutError::CommandSpawn {
        tool: tool.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(FramecutError::CommandFailed {
            tool,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// `<directory>/<stem>-<HHMMSS.mmm>.tiff`.
pub fn output_path(directory: &Path, video: &Path, offset: Offset) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    directory.join(format!(
        "{stem}-{}.{OUTPUT_EXTENSION}",
        offset.filename_stamp()
    ))
}
