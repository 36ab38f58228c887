//! exiftool integration.
//!
//! exiftool reads the container-level tags of the source video (the
//! fallback source for fusion) and writes the fused record into each
//! extracted frame.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::configuration::DEFAULT_EXIFTOOL;
use crate::error::FramecutError;
use crate::fusion::MetadataRecord;
use crate::metadata::VideoMetadata;
use crate::resolver::ResolvedContext;
use crate::telemetry::tags;
use crate::utilities::run_command;

/// Writes a metadata record into an extracted frame.
pub trait MetadataEmbedder: Send + Sync {
    /// Embed `record` into the image at `image`.
    fn embed(
        &self,
        image: &Path,
        record: &MetadataRecord,
        context: &ResolvedContext,
    ) -> Result<(), FramecutError>;
}

/// The exiftool command-line tool.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new(DEFAULT_EXIFTOOL)
    }
}

impl ExifTool {
    /// Use the exiftool binary at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Read all tags of `video`.
    ///
    /// # Errors
    ///
    /// Returns a command error if exiftool fails, [`FramecutError::JsonError`]
    /// for malformed output, or [`FramecutError::MetadataParse`] if the
    /// output holds no object.
    pub fn read(&self, video: &Path) -> Result<VideoMetadata, FramecutError> {
        let output = run_command(&self.program, [OsStr::new("-j"), video.as_os_str()])?;
        let value: Value = serde_json::from_slice(&output.stdout)?;
        let metadata = parse_json(&value)?;
        log::debug!("Read {} tags from {}", metadata.len(), video.display());
        Ok(metadata)
    }
}

impl MetadataEmbedder for ExifTool {
    fn embed(
        &self,
        image: &Path,
        record: &MetadataRecord,
        context: &ResolvedContext,
    ) -> Result<(), FramecutError> {
        let mut args = embed_arguments(record, context);
        args.push("-overwrite_original".to_string());
        args.push(image.display().to_string());
        run_command(&self.program, &args)?;

        if record.contains(tags::DATE_TIME_ORIGINAL) {
            run_command(
                &self.program,
                [
                    "-DateTimeOriginal>FileModifyDate".to_string(),
                    "-m".to_string(),
                    "-overwrite_original".to_string(),
                    image.display().to_string(),
                ],
            )?;
        }

        log::info!("Metadata written to {}", image.display());
        Ok(())
    }
}

/// Tag assignments for one frame, without the target file.
///
/// The capture date is written both as `DateTimeOriginal` and
/// `CreateDate`. Make and model come from the resolved device; the generic
/// device writes neither.
pub fn embed_arguments(record: &MetadataRecord, context: &ResolvedContext) -> Vec<String> {
    let mut args: Vec<String> = record
        .iter()
        .map(|(tag, value)| format!("-{tag}={value}"))
        .collect();
    if let Some(date) = record.get(tags::DATE_TIME_ORIGINAL) {
        args.push(format!("-CreateDate={date}"));
    }
    args.push("-ColorSpace=sRGB".to_string());
    if let (Some(make), Some(model)) = (context.make(), context.model()) {
        args.push(format!("-Make={make}"));
        args.push(format!("-Model={model}"));
    }
    args
}

/// Convert `exiftool -j` output into a tag mapping.
///
/// exiftool prints a one-element array per file. Scalar values are kept as
/// text; nested values are skipped.
///
/// # Errors
///
/// Returns [`FramecutError::MetadataParse`] if `value` is not an array
/// holding an object.
pub fn parse_json(value: &Value) -> Result<VideoMetadata, FramecutError> {
    let object = value
        .as_array()
        .and_then(|files| files.first())
        .and_then(Value::as_object)
        .ok_or_else(|| FramecutError::MetadataParse("exiftool returned no file entry".to_string()))?;

    Ok(object
        .iter()
        .filter_map(|(tag, value)| {
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                _ => return None,
            };
            Some((tag.as_str(), text))
        })
        .collect())
}
