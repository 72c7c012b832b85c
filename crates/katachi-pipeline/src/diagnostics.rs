//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! threshold and tolerance tuning. Every call to
//! [`analyze_staged_with_diagnostics`](crate::analyze_staged_with_diagnostics)
//! collects diagnostics alongside the pipeline results.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Outline, ThresholdMode};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
///
/// Each field captures metrics for one logical stage. The smoothing
/// stage is `None` when the configured kernel size disables it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDiagnostics {
    /// Stage 1: grayscale conversion.
    pub grayscale: StageDiagnostics,
    /// Stage 2: smoothing (only when `config.blur_kernel_size > 1`).
    pub blur: Option<StageDiagnostics>,
    /// Stage 3: binarization.
    pub binarize: StageDiagnostics,
    /// Stage 4: outline extraction.
    pub extraction: StageDiagnostics,
    /// Stage 5: approximation, classification, measurement, filtering.
    pub aggregation: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: AnalysisSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Grayscale conversion metrics.
    Grayscale {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
    /// Smoothing metrics.
    Blur {
        /// Kernel size used for the box filter.
        kernel_size: u32,
    },
    /// Binarization metrics.
    Binarize {
        /// Threshold selection strategy.
        mode: ThresholdMode,
        /// Effective threshold level (fixed or computed).
        level: u8,
        /// Number of foreground pixels (value == 255) in the mask.
        foreground_pixel_count: u64,
        /// Total pixel count for computing foreground density.
        total_pixel_count: u64,
    },
    /// Outline extraction metrics.
    Extraction {
        /// Number of outlines traced.
        outline_count: usize,
        /// Total number of points across all outlines.
        total_point_count: usize,
        /// Minimum points in any single outline.
        min_outline_points: usize,
        /// Maximum points in any single outline.
        max_outline_points: usize,
        /// Mean points per outline.
        mean_outline_points: f64,
    },
    /// Aggregation metrics.
    Aggregation {
        /// Outlines before the minimum-area filter.
        raw_outline_count: usize,
        /// Outlines dropped by the minimum-area filter.
        filtered_out_count: usize,
        /// Objects in the final report.
        object_count: usize,
        /// Minimum area threshold in effect.
        min_area: f64,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Number of outlines traced.
    pub outline_count: usize,
    /// Objects in the final report.
    pub object_count: usize,
}

impl AnalysisDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Analysis Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        // Per-stage breakdown.
        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let stages: Vec<(&str, &StageDiagnostics)> = {
            let mut s = vec![("Grayscale", &self.grayscale)];
            if let Some(ref blur) = self.blur {
                s.push(("Blur", blur));
            }
            s.push(("Binarize", &self.binarize));
            s.push(("Extraction", &self.extraction));
            s.push(("Aggregation", &self.aggregation));
            s
        };

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Outlines: {}  |  Reported objects: {}",
            self.summary.outline_count, self.summary.object_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Grayscale { width, height } => format!("{width}x{height}"),
        StageMetrics::Blur { kernel_size } => format!("kernel={kernel_size}"),
        StageMetrics::Binarize {
            mode,
            level,
            foreground_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *foreground_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            let mode = match mode {
                ThresholdMode::Fixed => "fixed",
                ThresholdMode::Auto => "otsu",
            };
            format!("{mode} level={level} foreground={foreground_pixel_count} ({density:.1}%)")
        }
        StageMetrics::Extraction {
            outline_count,
            total_point_count,
            min_outline_points,
            max_outline_points,
            mean_outline_points,
        } => {
            format!(
                "{outline_count} outlines, {total_point_count} pts (min={min_outline_points} max={max_outline_points} mean={mean_outline_points:.1})",
            )
        }
        StageMetrics::Aggregation {
            raw_outline_count,
            filtered_out_count,
            object_count,
            min_area,
        } => {
            format!(
                "{raw_outline_count} outlines -> {object_count} objects ({filtered_out_count} below min_area={min_area})",
            )
        }
    }
}

/// Count foreground pixels (value == 255) in a binary mask.
pub(crate) fn count_foreground_pixels(mask: &image::GrayImage) -> u64 {
    mask.pixels()
        .map(|p| u64::from(u8::from(p.0[0] == 255)))
        .sum()
}

/// Statistics for a set of traced outlines.
pub(crate) struct OutlineStats {
    /// Total number of points across all outlines.
    pub total: usize,
    /// Minimum number of points in any single outline.
    pub min: usize,
    /// Maximum number of points in any single outline.
    pub max: usize,
    /// Mean number of points per outline.
    pub mean: f64,
}

/// Compute outline statistics from a set of traced outlines.
pub(crate) fn outline_stats(outlines: &[Outline]) -> OutlineStats {
    let total: usize = outlines.iter().map(Outline::len).sum();
    let min = outlines.iter().map(Outline::len).min().unwrap_or(0);
    let max = outlines.iter().map(Outline::len).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if outlines.is_empty() {
        0.0
    } else {
        total as f64 / outlines.len() as f64
    };
    OutlineStats {
        total,
        min,
        max,
        mean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        let ms = duration_ms(d);
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn count_foreground_pixels_works() {
        let mut img = image::GrayImage::new(10, 10);
        for i in 0..5 {
            img.put_pixel(i, 0, image::Luma([255]));
        }
        assert_eq!(count_foreground_pixels(&img), 5);
    }

    #[test]
    fn outline_stats_empty() {
        let stats = outline_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.min, 0);
        assert_eq!(stats.max, 0);
        assert!((stats.mean - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn outline_stats_computes() {
        let outlines = vec![
            Outline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]),
            Outline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(3.0, 0.0),
            ]),
        ];
        let stats = outline_stats(&outlines);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.min, 2);
        assert_eq!(stats.max, 4);
        assert!((stats.mean - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn report_produces_nonempty_string() {
        let diag = AnalysisDiagnostics {
            grayscale: StageDiagnostics {
                duration: Duration::from_millis(5),
                metrics: StageMetrics::Grayscale {
                    width: 100,
                    height: 100,
                },
            },
            blur: None,
            binarize: StageDiagnostics {
                duration: Duration::from_millis(10),
                metrics: StageMetrics::Binarize {
                    mode: ThresholdMode::Auto,
                    level: 117,
                    foreground_pixel_count: 2500,
                    total_pixel_count: 10000,
                },
            },
            extraction: StageDiagnostics {
                duration: Duration::from_millis(15),
                metrics: StageMetrics::Extraction {
                    outline_count: 3,
                    total_point_count: 200,
                    min_outline_points: 4,
                    max_outline_points: 120,
                    mean_outline_points: 66.7,
                },
            },
            aggregation: StageDiagnostics {
                duration: Duration::from_millis(5),
                metrics: StageMetrics::Aggregation {
                    raw_outline_count: 3,
                    filtered_out_count: 1,
                    object_count: 2,
                    min_area: 50.0,
                },
            },
            total_duration: Duration::from_millis(35),
            summary: AnalysisSummary {
                image_width: 100,
                image_height: 100,
                pixel_count: 10000,
                outline_count: 3,
                object_count: 2,
            },
        };

        let report = diag.report();
        assert!(!report.is_empty());
        assert!(report.contains("Analysis Diagnostics Report"));
        assert!(report.contains("Binarize"));
        assert!(report.contains("otsu"));
        assert!(!report.contains("Blur"));
    }
}
