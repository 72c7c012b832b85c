//! Pre-threshold smoothing to suppress noise.
//!
//! Wraps [`imageproc::filter::box_filter`] as a separable mean filter.
//! Smoothing evens out isolated bright or dark pixels that would
//! otherwise survive thresholding as speck regions.

use image::GrayImage;

/// Smooth a grayscale image with a separable box filter of the given
/// odd kernel size.
///
/// Kernel sizes of 0 or 1 return the image unchanged (smoothing
/// disabled). Even sizes greater than 1 are rejected by
/// [`AnalysisConfig::validate`](crate::AnalysisConfig::validate) before
/// the pipeline runs.
#[must_use = "returns the smoothed image"]
pub fn box_blur(image: &GrayImage, kernel_size: u32) -> GrayImage {
    if kernel_size <= 1 {
        return image.clone();
    }

    let radius = (kernel_size - 1) / 2;
    imageproc::filter::box_filter(image, radius, radius)
}
