//! Output types produced by the pipeline.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// The result of one successful pipeline run.
///
/// Holds the processed bitmap (decoded, laid out, and optionally
/// recolored) plus per-stage timing. The exported PDF is produced
/// separately by [`crate::export_pdf`] and is not retained here.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// The processed bitmap, ready for preview or export.
    pub bitmap: RgbaImage,
    /// Per-stage timing for this run.
    pub stats: ScanStats,
}

/// Wall-clock statistics for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    /// Decoder duration (image decode or PDF rasterisation).
    pub decode_ms: u64,
    /// Recolorizer duration (0 when the grayscale toggle is off).
    pub recolor_ms: u64,
    /// Total run duration.
    pub total_ms: u64,
}

/// What [`crate::inspect`] reports about an input without processing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Detected MIME type, e.g. `image/png` or `application/pdf`.
    pub mime: String,
    /// Pixel width, for raster sources.
    pub width: Option<u32>,
    /// Pixel height, for raster sources.
    pub height: Option<u32>,
    /// Page count, for PDF sources.
    pub page_count: Option<usize>,
}
