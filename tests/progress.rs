//! Progress and cancellation tests.

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use framecut::{CancellationToken, Offset, OperationType, ProgressCallback, ProgressInfo};

// ── CancellationToken ──────────────────────────────────────────────

#[test]
fn token_starts_uncancelled() {
    assert!(!CancellationToken::new().is_cancelled());
    assert!(!CancellationToken::default().is_cancelled());
}

#[test]
fn clones_observe_cancel() {
    let token = CancellationToken::new();
    let clone = token.clone();
    clone.cancel();
    assert!(token.is_cancelled());
    assert!(clone.is_cancelled());
}

#[test]
fn cancel_across_threads() {
    let token = CancellationToken::new();
    let worker = {
        let token = token.clone();
        std::thread::spawn(move || token.cancel())
    };
    worker.join().expect("thread");
    assert!(token.is_cancelled());
}

// ── ProgressCallback ───────────────────────────────────────────────

struct Counter(AtomicU64);

impl ProgressCallback for Counter {
    fn on_progress(&self, info: &ProgressInfo) {
        self.0.fetch_add(info.current, Ordering::SeqCst);
    }
}

#[test]
fn callback_is_object_safe() {
    let counter = Arc::new(Counter(AtomicU64::new(0)));
    let callback: Arc<dyn ProgressCallback> = counter.clone();
    let info = ProgressInfo {
        operation: OperationType::FrameExtraction,
        current: 2,
        total: Some(3),
        percentage: Some(66.7),
        elapsed: Duration::from_millis(10),
        estimated_remaining: Some(Duration::from_millis(5)),
        current_offset: Some(Offset::from_millis(1_000)),
        output: Some(PathBuf::from("frame.tiff")),
    };
    callback.on_progress(&info);
    callback.on_progress(&info);
    assert_eq!(counter.0.load(Ordering::SeqCst), 4);
}

#[test]
fn operation_type_debug() {
    assert_eq!(format!("{:?}", OperationType::FrameExtraction), "FrameExtraction");
    assert_eq!(format!("{:?}", OperationType::MetadataEmbedding), "MetadataEmbedding");
    assert_eq!(format!("{:?}", OperationType::ContentAnalysis), "ContentAnalysis");
}
