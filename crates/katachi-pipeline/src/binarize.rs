//! Binarization: grayscale intensity to a 0/255 foreground mask.
//!
//! The threshold is either a fixed value from the configuration or
//! derived from the intensity histogram via Otsu's bimodal separation
//! ([`imageproc::contrast::otsu_level`]). Both strategies share one
//! code path; the right choice is image-dependent and stays a runtime
//! option.

use image::GrayImage;

use crate::types::{AnalysisConfig, Polarity, ThresholdMode};

/// Foreground mask value.
pub const FOREGROUND: u8 = 255;

/// Resolve the threshold level for `gray` under the configured mode.
///
/// [`ThresholdMode::Fixed`] returns the configured value unchanged;
/// [`ThresholdMode::Auto`] computes Otsu's threshold from the image
/// histogram.
#[must_use]
pub fn threshold_level(gray: &GrayImage, config: &AnalysisConfig) -> u8 {
    match config.threshold_mode {
        ThresholdMode::Fixed => config.threshold_value,
        ThresholdMode::Auto => imageproc::contrast::otsu_level(gray),
    }
}

/// Apply a threshold level, producing a 0/255 mask.
///
/// [`Polarity::LightOnDark`] marks pixels strictly brighter than
/// `level` as foreground; [`Polarity::DarkOnLight`] marks pixels
/// strictly darker. `invert` flips the mask afterwards.
#[must_use = "returns the binary mask"]
pub fn apply(gray: &GrayImage, level: u8, polarity: Polarity, invert: bool) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        let foreground = match polarity {
            Polarity::LightOnDark => v > level,
            Polarity::DarkOnLight => v < level,
        };
        if foreground != invert {
            image::Luma([FOREGROUND])
        } else {
            image::Luma([0])
        }
    })
}

/// Binarize a grayscale image under the given configuration.
///
/// Pure function of its inputs. In [`ThresholdMode::Auto`] a uniform
/// image produces an all-background mask: bimodal separation is
/// undefined when the histogram has a single occupied bin, and a blank
/// image contains no objects.
#[must_use = "returns the binary mask"]
pub fn binarize(gray: &GrayImage, config: &AnalysisConfig) -> GrayImage {
    if config.threshold_mode == ThresholdMode::Auto && is_uniform(gray) {
        return GrayImage::new(gray.width(), gray.height());
    }
    apply(
        gray,
        threshold_level(gray, config),
        config.polarity,
        config.invert,
    )
}

/// Whether every pixel has the same intensity.
fn is_uniform(gray: &GrayImage) -> bool {
    let mut pixels = gray.pixels();
    match pixels.next() {
        None => true,
        Some(first) => pixels.all(|p| p == first),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bimodal_image() -> GrayImage {
        // Left half dark (30), right half bright (220).
        GrayImage::from_fn(10, 10, |x, _y| {
            if x < 5 {
                image::Luma([30])
            } else {
                image::Luma([220])
            }
        })
    }

    fn count_foreground(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] == FOREGROUND).count()
    }

    #[test]
    fn fixed_light_on_dark_selects_bright_half() {
        let config = AnalysisConfig {
            threshold_mode: ThresholdMode::Fixed,
            threshold_value: 127,
            ..AnalysisConfig::default()
        };
        let mask = binarize(&bimodal_image(), &config);
        assert_eq!(count_foreground(&mask), 50);
        assert_eq!(mask.get_pixel(9, 0).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn fixed_dark_on_light_selects_dark_half() {
        let config = AnalysisConfig {
            threshold_mode: ThresholdMode::Fixed,
            threshold_value: 127,
            polarity: Polarity::DarkOnLight,
            ..AnalysisConfig::default()
        };
        let mask = binarize(&bimodal_image(), &config);
        assert_eq!(count_foreground(&mask), 50);
        assert_eq!(mask.get_pixel(0, 0).0[0], FOREGROUND);
    }

    #[test]
    fn invert_flips_the_mask() {
        let config = AnalysisConfig {
            threshold_mode: ThresholdMode::Fixed,
            threshold_value: 127,
            ..AnalysisConfig::default()
        };
        let mask = binarize(&bimodal_image(), &config);
        let inverted = binarize(
            &bimodal_image(),
            &AnalysisConfig {
                invert: true,
                ..config
            },
        );
        for (a, b) in mask.pixels().zip(inverted.pixels()) {
            assert_ne!(a.0[0], b.0[0]);
        }
    }

    #[test]
    fn auto_threshold_separates_bimodal_image() {
        let img = bimodal_image();
        let config = AnalysisConfig::default();
        let level = threshold_level(&img, &config);
        assert!(
            (30..220).contains(&level),
            "expected Otsu level between the modes, got {level}",
        );
        let mask = binarize(&img, &config);
        assert_eq!(count_foreground(&mask), 50);
    }

    #[test]
    fn auto_threshold_on_uniform_image_yields_empty_mask() {
        for value in [0u8, 128, 255] {
            let img = GrayImage::from_fn(8, 8, |_, _| image::Luma([value]));
            let mask = binarize(&img, &AnalysisConfig::default());
            assert_eq!(
                count_foreground(&mask),
                0,
                "uniform value {value} should produce no foreground",
            );
        }
    }

    #[test]
    fn fixed_threshold_on_uniform_image_is_not_special_cased() {
        let img = GrayImage::from_fn(4, 4, |_, _| image::Luma([200]));
        let config = AnalysisConfig {
            threshold_mode: ThresholdMode::Fixed,
            threshold_value: 127,
            ..AnalysisConfig::default()
        };
        let mask = binarize(&img, &config);
        assert_eq!(count_foreground(&mask), 16);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let img = GrayImage::from_fn(1, 1, |_, _| image::Luma([127]));
        let config = AnalysisConfig {
            threshold_mode: ThresholdMode::Fixed,
            threshold_value: 127,
            ..AnalysisConfig::default()
        };
        let mask = binarize(&img, &config);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
    }
}
