//! Page Composer: bitmap + layout → single-page PDF bytes.
//!
//! The output page is always 595×842 units. Painting order is fixed:
//! decorative background stretched to the full page, then a solid shadow
//! rectangle offset down-right of the image position, then the bitmap
//! itself at the margin, scaled to `page_width / reduction` with
//! aspect-preserving height. The layered offset rectangles produce the
//! drop-shadow illusion of the original design.
//!
//! The original paints the shadow at roughly 10% opacity; here the fill
//! colour is pre-blended against paper white instead, so the document
//! needs no transparency groups.
//!
//! PDF serialisation is CPU-bound, so the work runs in `spawn_blocking`.

use crate::config::{PageLayout, ScanConfig};
use crate::error::ScanError;
use crate::pipeline::encode;
use ::image::{Rgba, RgbaImage};
use printpdf::*;
use tracing::debug;

// 10% dark ink blended over paper white.
const SHADOW_GRAY: f32 = 0.91;

/// Compose the processed bitmap into single-page PDF bytes.
pub async fn compose(bitmap: &RgbaImage, config: &ScanConfig) -> Result<Vec<u8>, ScanError> {
    let background = resolve_background(config).await?;
    let bitmap = bitmap.clone();
    let layout = config.layout;

    tokio::task::spawn_blocking(move || compose_blocking(&bitmap, &layout, &background))
        .await
        .map_err(|e| ScanError::Internal(format!("Compose task panicked: {e}")))?
}

/// Load the user-supplied background, or generate the default paper
/// gradient.
async fn resolve_background(config: &ScanConfig) -> Result<RgbaImage, ScanError> {
    match &config.background {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| ScanError::ComposeFailed {
                    detail: format!("background '{}': {e}", path.display()),
                })?;
            let decoded = ::image::load_from_memory(&bytes).map_err(|e| ScanError::ComposeFailed {
                detail: format!("background '{}': {e}", path.display()),
            })?;
            Ok(decoded.to_rgba8())
        }
        None => Ok(default_background(
            config.layout.page_width as u32,
            config.layout.page_height as u32,
        )),
    }
}

/// Generated decorative backdrop: a warm paper gradient, light at the top.
fn default_background(width: u32, height: u32) -> RgbaImage {
    const TOP: [f32; 3] = [247.0, 242.0, 230.0];
    const BOTTOM: [f32; 3] = [226.0, 218.0, 198.0];

    RgbaImage::from_fn(width, height, |_, y| {
        let t = y as f32 / (height.saturating_sub(1)).max(1) as f32;
        let mix = |i: usize| (TOP[i] + (BOTTOM[i] - TOP[i]) * t).round() as u8;
        Rgba([mix(0), mix(1), mix(2), 255])
    })
}

/// Blocking implementation of page composition.
fn compose_blocking(
    bitmap: &RgbaImage,
    layout: &PageLayout,
    background: &RgbaImage,
) -> Result<Vec<u8>, ScanError> {
    let mut doc = PdfDocument::new("Scanned Document");
    let mut warnings = Vec::new();

    let bg_id = add_png_image(&mut doc, background, &mut warnings)?;
    let img_id = add_png_image(&mut doc, bitmap, &mut warnings)?;

    let image_w = layout.image_width();
    let image_h = layout.scaled_height(bitmap.width(), bitmap.height());
    let margin = layout.margin();
    let shadow = layout.shadow_offset();

    let mut ops = Vec::new();

    // Background stretched to the full page.
    ops.push(place_image(
        &bg_id,
        0.0,
        0.0,
        layout.page_width / background.width() as f32,
        layout.page_height / background.height() as f32,
    ));

    // Shadow rectangle, offset down-right of the image position.
    // Page coordinates have their origin at the bottom-left, so "down by
    // `shadow` from the top" becomes `page_height − shadow − image_h`.
    ops.push(Op::SetFillColor {
        col: Color::Rgb(Rgb {
            r: SHADOW_GRAY,
            g: SHADOW_GRAY,
            b: SHADOW_GRAY,
            icc_profile: None,
        }),
    });
    ops.push(Op::DrawPolygon {
        polygon: rect_polygon(shadow, layout.page_height - shadow - image_h, image_w, image_h),
    });

    // The bitmap itself, at the margin, over the shadow.
    ops.push(place_image(
        &img_id,
        margin,
        layout.page_height - margin - image_h,
        image_w / bitmap.width() as f32,
        image_h / bitmap.height() as f32,
    ));

    doc.pages.push(PdfPage {
        media_box: page_rect(layout),
        trim_box: page_rect(layout),
        crop_box: page_rect(layout),
        ops,
    });

    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    debug!("Composed page → {} bytes PDF", bytes.len());
    Ok(bytes)
}

/// PNG-encode a bitmap and register it as an image XObject.
fn add_png_image(
    doc: &mut PdfDocument,
    bitmap: &RgbaImage,
    warnings: &mut Vec<PdfWarnMsg>,
) -> Result<XObjectId, ScanError> {
    let png = encode::png_bytes(bitmap).map_err(|e| ScanError::ComposeFailed {
        detail: format!("image encoding: {e}"),
    })?;
    let raw = RawImage::decode_from_bytes(&png, warnings)
        .map_err(|detail| ScanError::ComposeFailed { detail })?;
    Ok(doc.add_image(&raw))
}

/// Place an image XObject at `(x, y)` with the given pixel-to-unit scale.
///
/// At 72 dpi one pixel maps to one page unit, so the scale factors are
/// simply `target_size / pixel_size`.
fn place_image(id: &XObjectId, x: f32, y: f32, scale_x: f32, scale_y: f32) -> Op {
    Op::UseXobject {
        id: id.clone(),
        transform: XObjectTransform {
            translate_x: Some(Pt(x)),
            translate_y: Some(Pt(y)),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            dpi: Some(72.0),
            ..Default::default()
        },
    }
}

fn page_rect(layout: &PageLayout) -> Rect {
    Rect {
        x: Pt(0.0),
        y: Pt(0.0),
        width: Pt(layout.page_width),
        height: Pt(layout.page_height),
    }
}

/// Axis-aligned filled rectangle as a one-ring polygon.
fn rect_polygon(x: f32, y: f32, w: f32, h: f32) -> Polygon {
    let corner = |px: f32, py: f32| LinePoint {
        p: Point { x: Pt(px), y: Pt(py) },
        bezier: false,
    };
    Polygon {
        rings: vec![PolygonRing {
            points: vec![
                corner(x, y),
                corner(x + w, y),
                corner(x + w, y + h),
                corner(x, y + h),
            ],
        }],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageLayout;

    #[test]
    fn composed_bytes_are_a_pdf() {
        let bitmap = RgbaImage::from_pixel(100, 100, Rgba([255, 0, 0, 255]));
        let layout = PageLayout::default();
        let background = default_background(595, 842);

        let bytes = compose_blocking(&bitmap, &layout, &background).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "output must be a PDF");
        assert!(bytes.len() > 1_000, "suspiciously small document");
    }

    #[test]
    fn default_background_is_light_paper_fading_down() {
        let bg = default_background(595, 842);
        assert_eq!((bg.width(), bg.height()), (595, 842));

        let top = bg.get_pixel(0, 0).0;
        let bottom = bg.get_pixel(0, 841).0;
        assert!(top[0] > bottom[0], "gradient must darken towards the bottom");
        assert_eq!(top[3], 255);
        assert_eq!(bottom[3], 255);
    }

    #[test]
    fn rect_polygon_has_four_corners() {
        let poly = rect_polygon(10.0, 20.0, 30.0, 40.0);
        assert_eq!(poly.rings.len(), 1);
        let points = &poly.rings[0].points;
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].p.x, Pt(10.0));
        assert_eq!(points[2].p.x, Pt(40.0));
        assert_eq!(points[2].p.y, Pt(60.0));
    }

    #[test]
    fn shadow_sits_below_and_right_of_the_image() {
        let layout = PageLayout::default();
        // In page coordinates (origin bottom-left) the shadow's lower-left
        // corner is right of the image's and lower than it.
        let image_h = layout.scaled_height(100, 100);
        let image_y = layout.page_height - layout.margin() - image_h;
        let shadow_y = layout.page_height - layout.shadow_offset() - image_h;
        assert!(layout.shadow_offset() > layout.margin());
        assert!(shadow_y < image_y);
    }
}
