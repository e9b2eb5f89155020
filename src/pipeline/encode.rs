//! Bitmap encoding: RGBA bitmap → PNG bytes or base64 data-URI.
//!
//! PNG is chosen over JPEG because it is lossless: the composed document
//! embeds the processed bitmap exactly as the preview showed it, with no
//! compression artefacts on text edges. The data-URI form mirrors the
//! processed-image preview of the original design.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbaImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a bitmap as PNG bytes.
pub fn png_bytes(bitmap: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    bitmap.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!("Encoded bitmap → {} bytes PNG", buf.len());
    Ok(buf)
}

/// Encode a bitmap as a `data:image/png;base64,…` URI suitable for an
/// inline preview.
pub fn data_uri(bitmap: &RgbaImage) -> Result<String, image::ImageError> {
    let png = png_bytes(bitmap)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_bytes_are_valid_png() {
        let bitmap = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let png = png_bytes(&bitmap).expect("encode should succeed");
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        let decoded = image::load_from_memory(&png).expect("round-trips").to_rgba8();
        assert_eq!((decoded.width(), decoded.height()), (10, 10));
        assert_eq!(decoded.get_pixel(5, 5), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn data_uri_has_png_prefix_and_valid_base64() {
        let bitmap = RgbaImage::from_pixel(3, 3, Rgba([0, 128, 255, 255]));
        let uri = data_uri(&bitmap).expect("encode should succeed");
        let payload = uri
            .strip_prefix("data:image/png;base64,")
            .expect("data-URI prefix");
        let decoded = STANDARD.decode(payload).expect("valid base64");
        assert!(decoded.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
