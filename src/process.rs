//! Pipeline entry points: one run from source bytes to processed bitmap,
//! and from processed bitmap to exported PDF.
//!
//! Each run is a strict sequence — decode completes before recolor starts,
//! and compose only ever sees a fully recolored bitmap. There is no shared
//! mutable state between runs; every entry point takes an immutable
//! [`ScanRequest`] and returns a fresh [`ScanOutput`]. Callers that need
//! stale-run protection wrap these calls in a [`crate::session::ScanSession`].

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::output::{ScanOutput, ScanStats, SourceInfo};
use crate::pipeline::{compose, decode, encode, recolor};
use crate::progress::ScanStage;
use crate::source::{MediaType, SourceFile};
use image::RgbaImage;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// The immutable input of one pipeline run: the uploaded file plus the
/// two toggles of the original UI.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// The uploaded file.
    pub source: SourceFile,
    /// Stretch raster sources to the fixed A4 target. Does not apply to
    /// PDF sources.
    pub a4_format: bool,
    /// Rewrite the bitmap to grayscale.
    pub grayscale: bool,
}

impl ScanRequest {
    /// Build a request with both toggles off.
    pub fn new(source: SourceFile) -> Self {
        Self {
            source,
            a4_format: false,
            grayscale: false,
        }
    }
}

/// Run the processing pipeline: decode, then optionally recolor.
///
/// # Errors
/// Any stage failure aborts the run; nothing downstream executes and no
/// partial bitmap is returned.
pub async fn process(request: &ScanRequest, config: &ScanConfig) -> Result<ScanOutput, ScanError> {
    info!(
        "Starting scan run: {} ({} bytes, a4={}, grayscale={})",
        request.source.media().mime(),
        request.source.bytes().len(),
        request.a4_format,
        request.grayscale,
    );
    if let Some(cb) = &config.progress_callback {
        cb.on_run_start();
    }

    let result = run_pipeline(request, config).await;

    if let Some(cb) = &config.progress_callback {
        match &result {
            Ok(output) => cb.on_run_complete(output.stats.total_ms),
            Err(e) => cb.on_run_error(&e.to_string()),
        }
    }
    result
}

async fn run_pipeline(request: &ScanRequest, config: &ScanConfig) -> Result<ScanOutput, ScanError> {
    let total_start = Instant::now();

    // ── Step 1: Decode ───────────────────────────────────────────────────
    let decode_start = Instant::now();
    let mut bitmap = decode::decode(&request.source, request.a4_format, config).await?;
    let decode_ms = decode_start.elapsed().as_millis() as u64;
    if let Some(cb) = &config.progress_callback {
        cb.on_stage_complete(ScanStage::Decode, decode_ms);
    }

    // ── Step 2: Recolor ──────────────────────────────────────────────────
    let recolor_start = Instant::now();
    recolor::recolor(&mut bitmap, request.grayscale);
    let recolor_ms = recolor_start.elapsed().as_millis() as u64;
    if request.grayscale {
        if let Some(cb) = &config.progress_callback {
            cb.on_stage_complete(ScanStage::Recolor, recolor_ms);
        }
    }

    let stats = ScanStats {
        decode_ms,
        recolor_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Run complete: {}x{} px in {}ms",
        bitmap.width(),
        bitmap.height(),
        stats.total_ms
    );

    Ok(ScanOutput { bitmap, stats })
}

/// Convenience wrapper: load a file from disk and process it.
pub async fn process_path(
    path: impl AsRef<Path>,
    a4_format: bool,
    grayscale: bool,
    config: &ScanConfig,
) -> Result<ScanOutput, ScanError> {
    let source = SourceFile::from_path(path).await?;
    process(
        &ScanRequest {
            source,
            a4_format,
            grayscale,
        },
        config,
    )
    .await
}

/// Synchronous wrapper around [`process`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_sync(request: &ScanRequest, config: &ScanConfig) -> Result<ScanOutput, ScanError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ScanError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(process(request, config))
}

/// Compose the processed bitmap into single-page PDF bytes.
pub async fn export_pdf(bitmap: &RgbaImage, config: &ScanConfig) -> Result<Vec<u8>, ScanError> {
    let compose_start = Instant::now();
    let bytes = compose::compose(bitmap, config).await?;
    if let Some(cb) = &config.progress_callback {
        cb.on_stage_complete(ScanStage::Compose, compose_start.elapsed().as_millis() as u64);
    }
    Ok(bytes)
}

/// Compose and write the PDF to `path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn export_to_file(
    bitmap: &RgbaImage,
    path: impl AsRef<Path>,
    config: &ScanConfig,
) -> Result<(), ScanError> {
    let path = path.as_ref();
    let bytes = export_pdf(bitmap, config).await?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ScanError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &bytes)
        .await
        .map_err(|e| ScanError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ScanError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("Saved {}", path.display());
    Ok(())
}

/// Run the full chain — process, compose, save — and return the output
/// together with the path written.
///
/// When `output` is `None` the configured default file name
/// (`scanned-document.pdf`) is used, in the current directory.
pub async fn scan_to_file(
    request: &ScanRequest,
    output: Option<&Path>,
    config: &ScanConfig,
) -> Result<(ScanOutput, PathBuf), ScanError> {
    let processed = process(request, config).await?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.output_name));
    export_to_file(&processed.bitmap, &path, config).await?;

    Ok((processed, path))
}

/// Report what an input file is without running the pipeline.
///
/// For raster sources this reads only the header (no full decode); for
/// PDF sources it opens the document to count pages.
pub async fn inspect(path: impl AsRef<Path>) -> Result<SourceInfo, ScanError> {
    let source = SourceFile::from_path(path).await?;
    let mime = source.media().mime().to_string();

    match source.media() {
        MediaType::Image(_) => {
            let (width, height) = image::ImageReader::new(Cursor::new(source.bytes()))
                .with_guessed_format()
                .map_err(|e| ScanError::ImageDecodeFailed {
                    detail: e.to_string(),
                })?
                .into_dimensions()
                .map_err(|e| ScanError::ImageDecodeFailed {
                    detail: e.to_string(),
                })?;
            Ok(SourceInfo {
                mime,
                width: Some(width),
                height: Some(height),
                page_count: None,
            })
        }
        MediaType::Pdf => {
            let page_count = count_pdf_pages(source.bytes().to_vec()).await?;
            Ok(SourceInfo {
                mime,
                width: None,
                height: None,
                page_count: Some(page_count),
            })
        }
    }
}

async fn count_pdf_pages(bytes: Vec<u8>) -> Result<usize, ScanError> {
    use pdfium_render::prelude::*;
    use std::io::Write as _;

    tokio::task::spawn_blocking(move || {
        let mut tmp = tempfile::NamedTempFile::new()
            .map_err(|e| ScanError::Internal(format!("tempfile: {e}")))?;
        tmp.write_all(&bytes)
            .map_err(|e| ScanError::Internal(format!("tempfile write: {e}")))?;

        let pdfium = Pdfium::default();
        let document = pdfium
            .load_pdf_from_file(tmp.path(), None)
            .map_err(|e| ScanError::PdfOpenFailed {
                detail: format!("{:?}", e),
            })?;
        Ok(document.pages().len() as usize)
    })
    .await
    .map_err(|e| ScanError::Internal(format!("Inspect task panicked: {e}")))?
}

/// Base64 PNG data-URI of a processed bitmap, for inline previews.
pub fn preview_data_uri(bitmap: &RgbaImage) -> Result<String, ScanError> {
    let uri = encode::data_uri(bitmap).map_err(|e| ScanError::Internal(format!("preview encoding: {e}")))?;
    debug!("Preview data-URI: {} chars", uri.len());
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid_png(w: u32, h: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba(color));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn process_keeps_native_dimensions_with_toggles_off() {
        let source = SourceFile::from_bytes(solid_png(100, 100, [255, 0, 0, 255])).unwrap();
        let output = process(&ScanRequest::new(source), &ScanConfig::default())
            .await
            .unwrap();
        assert_eq!((output.bitmap.width(), output.bitmap.height()), (100, 100));
        assert_eq!(output.bitmap.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[tokio::test]
    async fn failed_decode_aborts_before_recolor() {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0x00; 8]);
        let source = SourceFile::from_bytes(bytes).unwrap();
        let request = ScanRequest {
            source,
            a4_format: false,
            grayscale: true,
        };
        let result = process(&request, &ScanConfig::default()).await;
        assert!(matches!(result, Err(ScanError::ImageDecodeFailed { .. })));
    }

    #[tokio::test]
    async fn export_to_file_writes_a_pdf_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let bitmap = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 255, 255]));

        export_to_file(&bitmap, &path, &ScanConfig::default())
            .await
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // No temp file left behind.
        assert!(!path.with_extension("pdf.tmp").exists());
    }

    #[tokio::test]
    async fn inspect_reports_image_dimensions_without_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.png");
        std::fs::write(&path, solid_png(33, 44, [1, 2, 3, 255])).unwrap();

        let info = inspect(&path).await.unwrap();
        assert_eq!(info.mime, "image/png");
        assert_eq!(info.width, Some(33));
        assert_eq!(info.height, Some(44));
        assert_eq!(info.page_count, None);
    }

    #[test]
    fn preview_uri_has_data_prefix() {
        let bitmap = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let uri = preview_data_uri(&bitmap).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn process_sync_runs_without_an_outer_runtime() {
        let source = SourceFile::from_bytes(solid_png(8, 8, [7, 7, 7, 255])).unwrap();
        let output = process_sync(&ScanRequest::new(source), &ScanConfig::default()).unwrap();
        assert_eq!((output.bitmap.width(), output.bitmap.height()), (8, 8));
    }
}
