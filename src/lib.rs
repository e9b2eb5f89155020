//! # paperscan
//!
//! Turn a single image or the first page of a PDF into a beautified,
//! single-page "scanned" PDF: the input is decoded to a bitmap, optionally
//! normalised to a fixed A4-like page size, optionally converted to
//! grayscale, then laid over a decorative background with a drop-shadow
//! and saved as `scanned-document.pdf`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image / PDF
//!  │
//!  ├─ 1. Decode   raster decode, or first-page rasterisation via pdfium
//!  ├─ 2. Recolor  optional in-place luma grayscale
//!  ├─ 3. Compose  background + shadow + bitmap on a fixed 595×842 page
//!  └─ 4. Save     scanned-document.pdf (atomic write)
//! ```
//!
//! Every run executes the chain from scratch — there is no incremental
//! state. A [`ScanSession`] adds newest-wins sequencing on top, so a slow
//! stale run can never overwrite the result of a later one.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paperscan::{scan_to_file, ScanConfig, ScanRequest, SourceFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::default();
//!     let request = ScanRequest {
//!         source: SourceFile::from_path("receipt.png").await?,
//!         a4_format: true,
//!         grayscale: true,
//!     };
//!     let (output, path) = scan_to_file(&request, None, &config).await?;
//!     println!("{}x{} px → {}", output.bitmap.width(), output.bitmap.height(), path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `paperscan` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! paperscan = { version = "0.3", default-features = false }
//! ```
//!
//! ## Behaviour notes
//!
//! * The A4 toggle stretches raster images to exactly 595×842, ignoring
//!   aspect ratio — intentional, inherited from the original design.
//! * PDF sources always render page 1 only; multi-page documents are
//!   silently truncated.
//! * Grayscale uses the perceptual luma weighting
//!   `0.299·R + 0.587·G + 0.114·B` and is idempotent.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod session;
pub mod source;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PageLayout, ScanConfig, ScanConfigBuilder, A4_HEIGHT, A4_WIDTH};
pub use error::ScanError;
pub use output::{ScanOutput, ScanStats, SourceInfo};
pub use process::{
    export_pdf, export_to_file, inspect, preview_data_uri, process, process_path, process_sync,
    scan_to_file, ScanRequest,
};
pub use progress::{NoopProgressCallback, ProgressCallback, ScanProgressCallback, ScanStage};
pub use session::ScanSession;
pub use source::{MediaType, SourceFile};
