//! Run sequencing: newest-wins publication of pipeline results.
//!
//! The original UI can re-trigger the pipeline while a previous run is
//! still decoding (toggle flipped mid-render, second file dropped). Runs
//! are therefore tagged with a monotonically increasing sequence number,
//! and a completed run publishes its output only if no newer run has
//! published first — a stale, slower run can never overwrite the result
//! of a later, faster one. A failed run publishes nothing, so the last
//! good output survives failed retries untouched.
//!
//! There is no cancellation: a superseded run completes and its result is
//! simply discarded.

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::output::ScanOutput;
use crate::process::{self, ScanRequest};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Holds the newest completed pipeline result and hands out run sequence
/// numbers.
#[derive(Default)]
pub struct ScanSession {
    next_seq: AtomicU64,
    latest: Mutex<Latest>,
}

#[derive(Default)]
struct Latest {
    seq: u64,
    output: Option<Arc<ScanOutput>>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the sequence number for a new run. Later calls always
    /// return larger numbers.
    pub fn begin(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Publish a completed run's output.
    ///
    /// Returns `false` (and discards `output`) if a newer run has already
    /// published.
    pub fn publish(&self, seq: u64, output: ScanOutput) -> bool {
        let mut latest = self.latest.lock().expect("session lock poisoned");
        if seq <= latest.seq {
            debug!("Discarding stale run {} (newest is {})", seq, latest.seq);
            return false;
        }
        latest.seq = seq;
        latest.output = Some(Arc::new(output));
        true
    }

    /// The newest published output, if any run has completed.
    pub fn latest(&self) -> Option<Arc<ScanOutput>> {
        self.latest.lock().expect("session lock poisoned").output.clone()
    }

    /// Run the pipeline under this session's sequencing.
    ///
    /// On success returns the published output, or `None` if the run was
    /// superseded while in flight. On failure the previously published
    /// output is left untouched.
    pub async fn run(
        &self,
        request: &ScanRequest,
        config: &ScanConfig,
    ) -> Result<Option<Arc<ScanOutput>>, ScanError> {
        let seq = self.begin();
        let output = process::process(request, config).await?;
        if self.publish(seq, output) {
            Ok(self.latest())
        } else {
            Ok(None)
        }
    }

    /// Export the newest published bitmap to `path`.
    ///
    /// This is the defensive boundary the export button relies on: with no
    /// published bitmap the export is rejected outright rather than
    /// producing a blank document.
    pub async fn export_latest(
        &self,
        path: impl AsRef<Path>,
        config: &ScanConfig,
    ) -> Result<(), ScanError> {
        let latest = self.latest().ok_or(ScanError::MissingBitmap)?;
        process::export_to_file(&latest.bitmap, path, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ScanStats;
    use image::{Rgba, RgbaImage};

    fn output_with_marker(marker: u8) -> ScanOutput {
        ScanOutput {
            bitmap: RgbaImage::from_pixel(2, 2, Rgba([marker, 0, 0, 255])),
            stats: ScanStats::default(),
        }
    }

    #[test]
    fn sequence_numbers_increase() {
        let session = ScanSession::new();
        let a = session.begin();
        let b = session.begin();
        assert!(b > a);
    }

    #[test]
    fn newest_run_wins() {
        let session = ScanSession::new();
        let old = session.begin();
        let new = session.begin();

        // The newer run finishes first.
        assert!(session.publish(new, output_with_marker(2)));
        // The stale run finishes later and must be discarded.
        assert!(!session.publish(old, output_with_marker(1)));

        let latest = session.latest().unwrap();
        assert_eq!(latest.bitmap.get_pixel(0, 0), &Rgba([2, 0, 0, 255]));
    }

    #[test]
    fn latest_is_none_before_any_publish() {
        let session = ScanSession::new();
        assert!(session.latest().is_none());
    }

    #[tokio::test]
    async fn export_without_bitmap_is_rejected() {
        let session = ScanSession::new();
        let result = session
            .export_latest("/tmp/never-written.pdf", &ScanConfig::default())
            .await;
        assert!(matches!(result, Err(ScanError::MissingBitmap)));
    }

    #[tokio::test]
    async fn failed_run_keeps_previous_output() {
        use crate::source::SourceFile;

        let session = ScanSession::new();
        let good = session.begin();
        assert!(session.publish(good, output_with_marker(7)));

        // A later run with corrupt bytes fails; the published output must
        // survive unchanged.
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0xFF; 4]);
        let source = SourceFile::from_bytes(bytes).unwrap();
        let request = ScanRequest::new(source);
        assert!(session.run(&request, &ScanConfig::default()).await.is_err());

        let latest = session.latest().unwrap();
        assert_eq!(latest.bitmap.get_pixel(0, 0), &Rgba([7, 0, 0, 255]));
    }
}
