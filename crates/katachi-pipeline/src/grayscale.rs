//! Grayscale conversion.
//!
//! The pipeline operates on single-channel intensity; decoding file
//! formats is the caller's responsibility (see `katachi-bench` for the
//! file-reading side). This is the first step: `RgbaImage` in,
//! `GrayImage` out.

use image::GrayImage;

use crate::types::RgbaImage;

/// Convert a decoded RGBA image to grayscale using the standard
/// luminance weighting `0.299*R + 0.587*G + 0.114*B`.
///
/// The alpha channel is ignored.
#[must_use = "returns the grayscale image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn luminance(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _a] = image.get_pixel(x, y).0;
        let luma = 0.114f32.mul_add(
            f32::from(b),
            0.299f32.mul_add(f32::from(r), 0.587 * f32::from(g)),
        );
        image::Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}
