//! Decoder: source bytes → RGBA bitmap.
//!
//! Raster sources decode through the `image` crate and are laid out at
//! either their native size or stretched to exactly the A4 target.
//! The stretch is non-uniform on purpose: the original design fills the
//! whole target page and ignores aspect ratio, and that behaviour is
//! reproduced here rather than "fixed" with letterboxing.
//!
//! PDF sources render their first page only, via pdfium at a fixed zoom,
//! then get composited onto a padded canvas with a pre-painted page
//! rectangle and shadow rectangle. pdfium wraps a C++ library with
//! thread-local state and is not safe to call from async contexts, so all
//! pdfium work runs inside `tokio::task::spawn_blocking`. pdfium also
//! requires a filesystem path, so in-memory PDF bytes are staged through a
//! `tempfile::NamedTempFile` that is cleaned up when the render returns.

use crate::config::{ScanConfig, A4_HEIGHT, A4_WIDTH};
use crate::error::ScanError;
use crate::source::{MediaType, SourceFile};
use image::imageops::FilterType;
use image::{imageops, Rgba, RgbaImage};
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

const CANVAS_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CANVAS_SHADOW: Rgba<u8> = Rgba([204, 204, 204, 255]);

/// Decode a source file into a bitmap.
///
/// * Raster image, `a4_format` off — native W×H.
/// * Raster image, `a4_format` on  — exactly 595×842, stretched.
/// * PDF — first page at the configured zoom on a padded shadow canvas;
///   the `a4_format` toggle does not apply.
///
/// # Errors
/// Empty, unrecognised, or corrupt input fails here; no bitmap is
/// produced and later stages never run.
pub async fn decode(source: &SourceFile, a4_format: bool, config: &ScanConfig) -> Result<RgbaImage, ScanError> {
    match source.media() {
        MediaType::Image(_) => decode_raster(source.bytes(), a4_format),
        MediaType::Pdf => decode_pdf(source.bytes(), config).await,
    }
}

/// Decode raster bytes and lay them out on the target canvas.
fn decode_raster(bytes: &[u8], a4_format: bool) -> Result<RgbaImage, ScanError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ScanError::ImageDecodeFailed {
            detail: e.to_string(),
        })?
        .to_rgba8();

    let bitmap = if a4_format {
        // Stretch to fill the full target, aspect ratio not preserved.
        imageops::resize(&decoded, A4_WIDTH, A4_HEIGHT, FilterType::Triangle)
    } else {
        decoded
    };

    debug!("Decoded raster image → {}x{} px", bitmap.width(), bitmap.height());
    Ok(bitmap)
}

/// Render the first page of a PDF onto its padded canvas.
async fn decode_pdf(bytes: &[u8], config: &ScanConfig) -> Result<RgbaImage, ScanError> {
    // pdfium needs a path; stage the bytes through a temp file that lives
    // until the blocking render returns.
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ScanError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ScanError::Internal(format!("tempfile write: {e}")))?;

    let zoom = config.layout.pdf_zoom;
    let border = config.layout.pdf_border;
    let shadow_margin = config.layout.pdf_shadow_margin;

    tokio::task::spawn_blocking(move || {
        // `tmp` moves into the closure so the file outlives the render.
        let rendered = render_first_page_blocking(tmp.path(), zoom)?;
        Ok(frame_rendered_page(&rendered, border, shadow_margin))
    })
    .await
    .map_err(|e| ScanError::Internal(format!("Render task panicked: {e}")))?
}

/// Blocking implementation of first-page rasterisation.
fn render_first_page_blocking(pdf_path: &Path, zoom: f32) -> Result<RgbaImage, ScanError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| ScanError::PdfOpenFailed {
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(ScanError::PdfOpenFailed {
            detail: "document has no pages".into(),
        });
    }
    if total_pages > 1 {
        info!("PDF has {} pages; rendering page 1 only", total_pages);
    }

    let page = pages.get(0).map_err(|e| ScanError::PdfRenderFailed {
        page: 1,
        detail: format!("{:?}", e),
    })?;

    let render_config = PdfRenderConfig::new().scale_page_by_factor(zoom);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| ScanError::PdfRenderFailed {
            page: 1,
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image().to_rgba8();
    debug!("Rendered page 1 → {}x{} px", image.width(), image.height());
    Ok(image)
}

/// Composite a rendered page onto its padded canvas.
///
/// The canvas is `border` larger on every side plus `shadow_margin` extra
/// at the bottom/right. Two solid rectangles are painted before the page:
/// a light-gray shadow offset down-right, then a white page rectangle
/// under the rendered content.
fn frame_rendered_page(rendered: &RgbaImage, border: u32, shadow_margin: u32) -> RgbaImage {
    let (w, h) = (rendered.width(), rendered.height());
    let canvas_w = w + 2 * border + shadow_margin;
    let canvas_h = h + 2 * border + shadow_margin;

    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, CANVAS_WHITE);
    fill_rect(&mut canvas, border + shadow_margin, border + shadow_margin, w, h, CANVAS_SHADOW);
    fill_rect(&mut canvas, border, border, w, h, CANVAS_WHITE);
    imageops::overlay(&mut canvas, rendered, border as i64, border as i64);
    canvas
}

/// Paint a solid axis-aligned rectangle. Clips at the canvas edge.
fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = (x + w).min(canvas.width());
    let y_end = (y + h).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn solid_png(w: u32, h: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba(color));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn raster_native_size_is_preserved() {
        let bitmap = decode_raster(&solid_png(100, 60, [255, 0, 0, 255]), false).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (100, 60));
        assert_eq!(bitmap.get_pixel(50, 30), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn raster_a4_toggle_stretches_to_exact_target() {
        // The stretch is non-uniform by design: any source size lands on
        // exactly 595×842, aspect ratio ignored.
        for (w, h) in [(100, 60), (1, 1), (842, 595)] {
            let bitmap = decode_raster(&solid_png(w, h, [0, 0, 255, 255]), true).unwrap();
            assert_eq!((bitmap.width(), bitmap.height()), (A4_WIDTH, A4_HEIGHT));
        }
    }

    #[test]
    fn raster_a4_stretch_keeps_solid_color() {
        let bitmap = decode_raster(&solid_png(10, 10, [0, 255, 0, 255]), true).unwrap();
        assert_eq!(bitmap.get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
        assert_eq!(
            bitmap.get_pixel(A4_WIDTH - 1, A4_HEIGHT - 1),
            &Rgba([0, 255, 0, 255])
        );
    }

    #[test]
    fn corrupt_image_bytes_fail_decode() {
        // Valid PNG signature, garbage body.
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let result = decode_raster(&bytes, false);
        assert!(matches!(result, Err(ScanError::ImageDecodeFailed { .. })));
    }

    #[test]
    fn framed_page_canvas_dimensions_and_layers() {
        let rendered = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let canvas = frame_rendered_page(&rendered, 10, 10);

        // 10 px page + 2×10 border + 10 shadow margin.
        assert_eq!((canvas.width(), canvas.height()), (40, 40));
        // Top-left border is plain white.
        assert_eq!(canvas.get_pixel(2, 2), &CANVAS_WHITE);
        // Rendered page sits at the border offset.
        assert_eq!(canvas.get_pixel(15, 15), &Rgba([255, 0, 0, 255]));
        // Shadow shows past the page's bottom-right corner.
        assert_eq!(canvas.get_pixel(25, 25), &CANVAS_SHADOW);
    }

    #[test]
    fn fill_rect_clips_at_canvas_edge() {
        let mut canvas = RgbaImage::from_pixel(4, 4, CANVAS_WHITE);
        fill_rect(&mut canvas, 2, 2, 10, 10, CANVAS_SHADOW);
        assert_eq!(canvas.get_pixel(3, 3), &CANVAS_SHADOW);
        assert_eq!(canvas.get_pixel(1, 1), &CANVAS_WHITE);
    }
}
