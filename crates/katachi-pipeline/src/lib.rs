//! katachi-pipeline: Pure shape analysis pipeline (sans-IO).
//!
//! Detects and classifies geometric shapes in raster images through:
//! grayscale -> smoothing -> binarization -> outline extraction ->
//! polygon approximation -> classification -> measurement ->
//! report aggregation.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! images and returns structured data. File decoding and output
//! formatting live in `katachi-bench`.

pub mod aggregate;
pub mod binarize;
pub mod blur;
pub mod classify;
pub mod contour;
pub mod diagnostics;
pub mod grayscale;
pub mod measure;
pub mod simplify;
pub mod types;

use std::time::Instant;

pub use diagnostics::{AnalysisDiagnostics, StageDiagnostics, StageMetrics};
pub use types::{
    AnalysisConfig, AnalysisError, CategoryTallies, Connectivity, Dimensions, GrayImage,
    ObjectGeometry, ObjectRecord, Outline, Point, Polarity, Polygon, Report, RgbaImage,
    ShapeCategory, StagedAnalysis, ThresholdMode,
};

/// Run the full shape analysis pipeline.
///
/// Takes a decoded RGBA image and a configuration, then produces a
/// [`Report`] with one record per detected object plus per-category
/// tallies. An image with no foreground regions yields a report with
/// zero objects; that is not an error.
///
/// # Pipeline steps
///
/// 1. Grayscale conversion
/// 2. Smoothing (skipped when the kernel size disables it)
/// 3. Binarization (fixed or Otsu threshold)
/// 4. Outline extraction (outer boundaries only)
/// 5. Per-outline approximation, classification and measurement,
///    minimum-area filtering, report assembly
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidConfig`] if the configuration fails
/// [`AnalysisConfig::validate`].
/// Returns [`AnalysisError::EmptyInput`] if the image has zero width or
/// height.
pub fn analyze(image: &RgbaImage, config: &AnalysisConfig) -> Result<Report, AnalysisError> {
    analyze_staged(image, config).map(|staged| staged.report)
}

/// Run the full pipeline, keeping every intermediate stage output.
///
/// Identical semantics to [`analyze`]; additionally returns the
/// grayscale, smoothed and mask images and the per-object boundary
/// geometry for previews and overlay drawing.
///
/// # Errors
///
/// Same conditions as [`analyze`].
pub fn analyze_staged(
    image: &RgbaImage,
    config: &AnalysisConfig,
) -> Result<StagedAnalysis, AnalysisError> {
    config.validate()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(AnalysisError::EmptyInput);
    }
    let dimensions = Dimensions {
        width: image.width(),
        height: image.height(),
    };

    // 1. Grayscale conversion.
    let gray = grayscale::luminance(image);

    // 2. Smoothing.
    let blurred = blur::box_blur(&gray, config.blur_kernel_size);

    // 3. Binarization.
    let mask = binarize::binarize(&blurred, config);

    // 4. Outline extraction.
    let outlines = contour::extract_outlines(&mask, config.connectivity);

    // 5. Approximation, classification, measurement, report assembly.
    let (report, geometry) =
        aggregate::aggregate_with_geometry(outlines.clone(), config, dimensions);

    Ok(StagedAnalysis {
        grayscale: gray,
        blurred,
        mask,
        outlines,
        geometry,
        report,
    })
}

/// Run the full pipeline with per-stage timing and metrics.
///
/// # Errors
///
/// Same conditions as [`analyze`].
pub fn analyze_staged_with_diagnostics(
    image: &RgbaImage,
    config: &AnalysisConfig,
) -> Result<(StagedAnalysis, AnalysisDiagnostics), AnalysisError> {
    config.validate()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(AnalysisError::EmptyInput);
    }
    let dimensions = Dimensions {
        width: image.width(),
        height: image.height(),
    };
    let pipeline_start = Instant::now();

    // 1. Grayscale conversion.
    let start = Instant::now();
    let gray = grayscale::luminance(image);
    let grayscale_diag = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Grayscale {
            width: dimensions.width,
            height: dimensions.height,
        },
    };

    // 2. Smoothing.
    let blur_enabled = config.blur_kernel_size > 1;
    let start = Instant::now();
    let blurred = blur::box_blur(&gray, config.blur_kernel_size);
    let blur_diag = blur_enabled.then(|| StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Blur {
            kernel_size: config.blur_kernel_size,
        },
    });

    // 3. Binarization.
    let start = Instant::now();
    let level = binarize::threshold_level(&blurred, config);
    let mask = binarize::binarize(&blurred, config);
    let binarize_diag = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Binarize {
            mode: config.threshold_mode,
            level,
            foreground_pixel_count: diagnostics::count_foreground_pixels(&mask),
            total_pixel_count: u64::from(dimensions.width) * u64::from(dimensions.height),
        },
    };

    // 4. Outline extraction.
    let start = Instant::now();
    let outlines = contour::extract_outlines(&mask, config.connectivity);
    let stats = diagnostics::outline_stats(&outlines);
    let extraction_diag = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Extraction {
            outline_count: outlines.len(),
            total_point_count: stats.total,
            min_outline_points: stats.min,
            max_outline_points: stats.max,
            mean_outline_points: stats.mean,
        },
    };

    // 5. Approximation, classification, measurement, report assembly.
    let raw_outline_count = outlines.len();
    let start = Instant::now();
    let (report, geometry) =
        aggregate::aggregate_with_geometry(outlines.clone(), config, dimensions);
    let aggregation_diag = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Aggregation {
            raw_outline_count,
            filtered_out_count: raw_outline_count - report.total_count,
            object_count: report.total_count,
            min_area: config.min_area,
        },
    };

    let diagnostics = AnalysisDiagnostics {
        grayscale: grayscale_diag,
        blur: blur_diag,
        binarize: binarize_diag,
        extraction: extraction_diag,
        aggregation: aggregation_diag,
        total_duration: pipeline_start.elapsed(),
        summary: diagnostics::AnalysisSummary {
            image_width: dimensions.width,
            image_height: dimensions.height,
            pixel_count: u64::from(dimensions.width) * u64::from(dimensions.height),
            outline_count: raw_outline_count,
            object_count: report.total_count,
        },
    };

    Ok((
        StagedAnalysis {
            grayscale: gray,
            blurred,
            mask,
            outlines,
            geometry,
            report,
        },
        diagnostics,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Black canvas with a white axis-aligned rectangle.
    fn rectangle_image(
        width: u32,
        height: u32,
        x0: u32,
        y0: u32,
        rect_w: u32,
        rect_h: u32,
    ) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let inside = x >= x0 && x < x0 + rect_w && y >= y0 && y < y0 + rect_h;
            if inside {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn analyze_rejects_zero_sized_image() {
        let img = RgbaImage::new(0, 10);
        let result = analyze(&img, &AnalysisConfig::default());
        assert!(matches!(result, Err(AnalysisError::EmptyInput)));
    }

    #[test]
    fn analyze_rejects_invalid_config() {
        let img = rectangle_image(10, 10, 2, 2, 4, 4);
        let config = AnalysisConfig {
            blur_kernel_size: 4,
            ..AnalysisConfig::default()
        };
        let result = analyze(&img, &config);
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn blank_image_yields_empty_report() {
        let img = RgbaImage::from_pixel(50, 50, image::Rgba([0, 0, 0, 255]));
        let report = analyze(&img, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.total_count, 0);
        assert!(report.objects.is_empty());
        assert_eq!(report.tallies.total(), 0);
    }

    #[test]
    fn white_square_on_black_is_one_quadrilateral() {
        let img = rectangle_image(200, 200, 50, 50, 100, 100);
        let report = analyze(&img, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.total_count, 1);
        let record = &report.objects[0];
        assert_eq!(record.category, ShapeCategory::Quadrilateral);
        assert_eq!(record.vertex_count, 4);
        assert!((record.area - 10_000.0).abs() < 1e-9);
        assert!((record.perimeter - 400.0).abs() < 1e-9);
        let c = record.centroid.unwrap();
        assert!((c.x - 100.0).abs() < 1e-9);
        assert!((c.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn staged_run_exposes_intermediate_images() {
        let img = rectangle_image(60, 40, 10, 10, 20, 15);
        let staged = analyze_staged(&img, &AnalysisConfig::default()).unwrap();
        assert_eq!(staged.grayscale.dimensions(), (60, 40));
        assert_eq!(staged.blurred.dimensions(), (60, 40));
        assert_eq!(staged.mask.dimensions(), (60, 40));
        assert_eq!(staged.outlines.len(), 1);
        assert_eq!(staged.geometry.len(), staged.report.objects.len());
        assert_eq!(
            staged.report.dimensions,
            Dimensions {
                width: 60,
                height: 40,
            },
        );
    }

    #[test]
    fn diagnostics_track_stage_counts() {
        let img = rectangle_image(100, 100, 10, 10, 30, 30);
        let (staged, diag) =
            analyze_staged_with_diagnostics(&img, &AnalysisConfig::default()).unwrap();
        assert!(diag.blur.is_none(), "default config disables smoothing");
        assert_eq!(diag.summary.object_count, staged.report.total_count);
        assert_eq!(diag.summary.outline_count, staged.outlines.len());
        assert_eq!(diag.summary.pixel_count, 10_000);
        assert!(!diag.report().is_empty());
    }

    #[test]
    fn diagnostics_include_blur_when_enabled() {
        let img = rectangle_image(100, 100, 10, 10, 30, 30);
        let config = AnalysisConfig {
            blur_kernel_size: 3,
            ..AnalysisConfig::default()
        };
        let (_, diag) = analyze_staged_with_diagnostics(&img, &config).unwrap();
        let blur = diag.blur.unwrap();
        assert!(matches!(
            blur.metrics,
            StageMetrics::Blur { kernel_size: 3 },
        ));
    }

    #[test]
    fn analyze_matches_staged_report() {
        let img = rectangle_image(80, 80, 5, 5, 40, 20);
        let config = AnalysisConfig::default();
        let report = analyze(&img, &config).unwrap();
        let staged = analyze_staged(&img, &config).unwrap();
        assert_eq!(report, staged.report);
    }
}
