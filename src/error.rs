//! Error types for the paperscan library.
//!
//! Every failure in this crate is terminal for the run that produced it:
//! a bad decode aborts that run before the recolor or compose stages see
//! anything, and the previously published result (if any) stays untouched.
//! Nothing is retried automatically and no error is fatal to the process —
//! the caller may simply submit a new run.
//!
//! Variants group into the four failure kinds of the pipeline: unsupported
//! input, decode failure, render failure (PDF rasterisation), and export
//! failure (composition or save).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the paperscan library.
#[derive(Debug, Error)]
pub enum ScanError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input was zero bytes long.
    #[error("Input is empty (zero bytes)")]
    EmptyInput,

    /// The magic bytes match neither a supported raster format nor PDF.
    #[error("Unsupported file type: {detail}\nSupported inputs: PNG, JPEG, or PDF.")]
    UnsupportedFileType { detail: String },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The bytes declared an image format but could not be decoded.
    #[error("Image decode failed: {detail}\nThe file may be truncated or corrupt.")]
    ImageDecodeFailed { detail: String },

    /// The PDF header/xref is corrupt and the document cannot be opened.
    #[error("PDF could not be opened: {detail}")]
    PdfOpenFailed { detail: String },

    // ── Render errors ─────────────────────────────────────────────────────
    /// pdfium accepted the document but rejected page rasterisation.
    #[error("Rasterisation failed for page {page}: {detail}")]
    PdfRenderFailed { page: usize, detail: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Export was requested before any run produced a bitmap.
    #[error("No processed bitmap to export.\nRun the pipeline on an input first.")]
    MissingBitmap,

    /// Page composition or PDF serialisation failed.
    #[error("PDF composition failed: {detail}")]
    ComposeFailed { detail: String },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
