//! Progress reporting and cancellation support.
//!
//! A [`Session`](crate::Session) reports one [`ProgressInfo`] per finished
//! stage of each extraction job through a [`ProgressCallback`], and checks
//! a [`CancellationToken`] between jobs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framecut::{ExtractOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{:?}] {}/{:?}", info.operation, info.current, info.total);
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::path::PathBuf;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use crate::timecode::Offset;

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Writing a frame through the external decoder.
    FrameExtraction,
    /// Writing EXIF tags into an extracted frame.
    MetadataEmbedding,
    /// Sampling luminance and saturation statistics.
    ContentAnalysis,
}

/// A snapshot of extraction progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work was just finished.
    pub operation: OperationType,
    /// How many jobs have completed this stage so far.
    pub current: u64,
    /// Total jobs in the plan, if known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the run started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Offset of the job that was just processed.
    pub current_offset: Option<Offset>,
    /// File that was just written.
    pub output: Option<PathBuf>,
}

/// Trait for receiving progress updates.
///
/// Implementations must be [`Send`] and [`Sync`] because jobs may run on
/// worker threads when the `rayon` feature is enabled.
pub trait ProgressCallback: Send + Sync {
    /// Called after each completed job stage.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// # Example
///
/// ```
/// use framecut::CancellationToken;
///
/// let token = CancellationToken::new();
/// let shared = token.clone();
/// shared.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts finished jobs per stage and emits callbacks.
///
/// Shared by reference between worker threads, so counters live behind a
/// mutex.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    start_time: Instant,
    counts: Mutex<[u64; 3]>,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: u64) -> Self {
        Self {
            callback,
            total,
            start_time: Instant::now(),
            counts: Mutex::new([0; 3]),
        }
    }

    /// Record one finished stage of one job.
    pub(crate) fn advance(&self, operation: OperationType, offset: Offset, output: Option<PathBuf>) {
        let slot = match operation {
            OperationType::FrameExtraction => 0,
            OperationType::MetadataEmbedding => 1,
            OperationType::ContentAnalysis => 2,
        };
        let current = match self.counts.lock() {
            Ok(mut counts) => {
                counts[slot] += 1;
                counts[slot]
            }
            Err(poisoned) => poisoned.into_inner()[slot],
        };

        let elapsed = self.start_time.elapsed();
        let percentage = (self.total > 0).then(|| (current as f32 / self.total as f32) * 100.0);
        let estimated_remaining = (current > 0).then(|| {
            let remaining = self.total.saturating_sub(current);
            let per_item = elapsed / current as u32;
            per_item * remaining as u32
        });

        self.callback.on_progress(&ProgressInfo {
            operation,
            current,
            total: Some(self.total),
            percentage,
            elapsed,
            estimated_remaining,
            current_offset: Some(offset),
            output,
        });
    }
}
