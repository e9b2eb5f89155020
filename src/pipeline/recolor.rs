//! Recolorizer: optional in-place grayscale rewrite.
//!
//! Uses the standard perceptual luma weighting
//! `0.299·R + 0.587·G + 0.114·B`, applied independently per pixel with no
//! neighbourhood or blur. Alpha is never touched. The operation is
//! idempotent: once R=G=B=g, the formula returns g again.

use image::{Rgba, RgbaImage};
use tracing::debug;

/// Rewrite every pixel of `bitmap` to its luma value when `grayscale` is
/// set; leave the bitmap untouched otherwise.
///
/// Dimensions never change, only channel values; the alpha channel is
/// preserved exactly.
pub fn recolor(bitmap: &mut RgbaImage, grayscale: bool) {
    if !grayscale {
        return;
    }

    for pixel in bitmap.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let gray = luma(r, g, b);
        *pixel = Rgba([gray, gray, gray, a]);
    }

    debug!(
        "Recolored {}x{} px to grayscale",
        bitmap.width(),
        bitmap.height()
    );
}

/// Perceptual luma of one pixel, rounded to the nearest channel value.
fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bitmap() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| {
            Rgba([
                (x * 60) as u8,
                (y * 60) as u8,
                ((x + y) * 30) as u8,
                200 + (x as u8),
            ])
        })
    }

    #[test]
    fn flag_off_is_identity() {
        let mut bitmap = sample_bitmap();
        let before = bitmap.clone();
        recolor(&mut bitmap, false);
        assert_eq!(bitmap, before);
    }

    #[test]
    fn grayscale_makes_channels_equal_and_preserves_alpha() {
        let mut bitmap = sample_bitmap();
        let before = bitmap.clone();
        recolor(&mut bitmap, true);

        assert_eq!((bitmap.width(), bitmap.height()), (4, 4));
        for (x, y, pixel) in bitmap.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            assert_eq!(r, g);
            assert_eq!(g, b);
            assert_eq!(a, before.get_pixel(x, y).0[3], "alpha changed at ({x},{y})");
        }
    }

    #[test]
    fn grayscale_is_idempotent() {
        let mut once = sample_bitmap();
        recolor(&mut once, true);
        let mut twice = once.clone();
        recolor(&mut twice, true);
        assert_eq!(once, twice);
    }

    #[test]
    fn pure_red_lands_on_luma_weight() {
        // round(255 · 0.299) = 76
        let mut bitmap = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        recolor(&mut bitmap, true);
        assert_eq!(bitmap.get_pixel(0, 0), &Rgba([76, 76, 76, 255]));
    }

    #[test]
    fn white_and_black_are_fixed_points() {
        let mut bitmap = RgbaImage::from_pixel(1, 2, Rgba([255, 255, 255, 255]));
        bitmap.put_pixel(0, 1, Rgba([0, 0, 0, 17]));
        recolor(&mut bitmap, true);
        assert_eq!(bitmap.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(bitmap.get_pixel(0, 1), &Rgba([0, 0, 0, 17]));
    }
}
