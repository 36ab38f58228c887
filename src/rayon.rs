//! Parallel job execution.
//!
//! Each job shells out to its own `ffmpeg` and `exiftool` processes, so
//! jobs share nothing mutable and can run on the rayon pool. The public
//! entry point is [`Session::run_parallel`](crate::Session::run_parallel).

use std::path::PathBuf;

use ::rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::FramecutError;
use crate::session::ExtractionJob;

/// Run `execute` for every job in parallel. Results come back in job
/// order. If several jobs fail, which error is returned is unspecified.
pub(crate) fn run_jobs<F>(jobs: &[ExtractionJob], execute: F) -> Result<Vec<PathBuf>, FramecutError>
where
    F: Fn(&ExtractionJob) -> Result<PathBuf, FramecutError> + Sync + Send,
{
    log::debug!("Running {} jobs on {} threads", jobs.len(), ::rayon::current_num_threads());
    jobs.par_iter().map(execute).collect()
}
