//! Progress-callback trait for per-stage pipeline events.
//!
//! Inject an [`Arc<dyn ScanProgressCallback>`] via
//! [`crate::config::ScanConfigBuilder::progress_callback`] to receive an
//! event as each pipeline stage finishes. The callback approach keeps the
//! library ignorant of how the host application communicates: callers can
//! forward events to a terminal spinner, a status line, or a log sink.
//!
//! All methods have default no-op implementations so callers only override
//! what they care about. The trait is `Send + Sync`: a session may run
//! pipeline work on blocking-pool threads.

use std::fmt;
use std::sync::Arc;

/// The three pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStage {
    /// Source bytes → bitmap.
    Decode,
    /// Optional in-place grayscale rewrite.
    Recolor,
    /// Bitmap → single-page PDF.
    Compose,
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStage::Decode => write!(f, "decode"),
            ScanStage::Recolor => write!(f, "recolor"),
            ScanStage::Compose => write!(f, "compose"),
        }
    }
}

/// Called by the pipeline as a run progresses.
pub trait ScanProgressCallback: Send + Sync {
    /// Called once before the decoder starts.
    fn on_run_start(&self) {}

    /// Called when a stage completes successfully.
    ///
    /// # Arguments
    /// * `stage`      — which stage finished
    /// * `elapsed_ms` — wall-clock duration of that stage
    fn on_stage_complete(&self, stage: ScanStage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called once when the whole run completes successfully.
    fn on_run_complete(&self, total_ms: u64) {
        let _ = total_ms;
    }

    /// Called when the run aborts with an error.
    fn on_run_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ScanProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ScanConfig`].
pub type ProgressCallback = Arc<dyn ScanProgressCallback>;
