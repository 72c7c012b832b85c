//! katachi-bench: CLI tool for shape analysis experimentation and diagnostics.
//!
//! Runs the analysis pipeline on a given image file with configurable
//! parameters, printing the shape report and detailed per-stage
//! diagnostics. Useful for:
//!
//! - Tuning thresholds, smoothing kernels, approximation tolerance
//! - Comparing fixed vs Otsu thresholding on real images
//! - Measuring per-stage durations to identify bottlenecks
//! - Understanding how parameter changes affect object counts
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin katachi-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use katachi_pipeline::{AnalysisConfig, AnalysisDiagnostics, Report, ShapeCategory};

/// Shape analysis experimentation and diagnostics for katachi.
///
/// Runs the analysis pipeline on a given image with configurable
/// parameters and prints the shape report plus per-stage timing and
/// count diagnostics.
#[derive(Parser)]
#[command(name = "katachi-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Threshold selection strategy.
    #[arg(long, value_enum, default_value_t = Mode::Auto)]
    threshold_mode: Mode,

    /// Fixed binarization threshold (used with --threshold-mode fixed).
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_THRESHOLD_VALUE)]
    threshold_value: u8,

    /// Invert the binary mask after thresholding.
    #[arg(long)]
    invert: bool,

    /// Smoothing kernel size (odd; 0 disables smoothing).
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_BLUR_KERNEL_SIZE)]
    blur_kernel_size: u32,

    /// Which side of the threshold counts as foreground.
    #[arg(long, value_enum, default_value_t = Foreground::LightOnDark)]
    polarity: Foreground,

    /// Polygon approximation tolerance as a fraction of outline perimeter.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_APPROX_TOLERANCE_FACTOR)]
    approx_tolerance_factor: f64,

    /// Minimum object area in square pixels.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_MIN_AREA)]
    min_area: f64,

    /// Foreground pixel connectivity.
    #[arg(long, value_enum, default_value_t = Neighbors::Eight)]
    connectivity: Neighbors,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output the report and diagnostics as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Full analysis config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `AnalysisConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Threshold strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Use the fixed --threshold-value.
    Fixed,
    /// Derive the threshold from the histogram (Otsu).
    Auto,
}

/// Foreground polarity selection.
#[derive(Clone, Copy, ValueEnum)]
enum Foreground {
    /// Foreground pixels are darker than the threshold.
    DarkOnLight,
    /// Foreground pixels are brighter than the threshold.
    LightOnDark,
}

/// Pixel connectivity selection.
#[derive(Clone, Copy, ValueEnum)]
enum Neighbors {
    /// Edge-adjacent neighbors only.
    Four,
    /// Edge- and corner-adjacent neighbors.
    Eight,
}

/// Build an [`AnalysisConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.  Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<AnalysisConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(AnalysisConfig {
        threshold_mode: match cli.threshold_mode {
            Mode::Fixed => katachi_pipeline::ThresholdMode::Fixed,
            Mode::Auto => katachi_pipeline::ThresholdMode::Auto,
        },
        threshold_value: cli.threshold_value,
        invert: cli.invert,
        blur_kernel_size: cli.blur_kernel_size,
        polarity: match cli.polarity {
            Foreground::DarkOnLight => katachi_pipeline::Polarity::DarkOnLight,
            Foreground::LightOnDark => katachi_pipeline::Polarity::LightOnDark,
        },
        approx_tolerance_factor: cli.approx_tolerance_factor,
        min_area: cli.min_area,
        connectivity: match cli.connectivity {
            Neighbors::Four => katachi_pipeline::Connectivity::Four,
            Neighbors::Eight => katachi_pipeline::Connectivity::Eight,
        },
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let image = match image::load_from_memory(&image_bytes) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({} bytes, {}x{})",
        cli.image_path.display(),
        image_bytes.len(),
        image.width(),
        image.height(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match katachi_pipeline::analyze_staged_with_diagnostics(&image, &config) {
            Ok((staged, diagnostics)) => {
                if cli.json {
                    let output = serde_json::json!({
                        "report": staged.report,
                        "diagnostics": diagnostics,
                    });
                    match serde_json::to_string_pretty(&output) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing output: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    if run == 0 {
                        println!("{}", format_report(&staged.report));
                        println!();
                    }
                    println!("{}", diagnostics.report());
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Analysis error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Format a shape report as a human-readable table.
fn format_report(report: &Report) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Shape Report\n{}", "=".repeat(60)));
    lines.push(format!(
        "Image: {}x{}  |  Objects: {}",
        report.dimensions.width, report.dimensions.height, report.total_count,
    ));
    lines.push(String::new());

    lines.push(format!(
        "{:>4}  {:<18} {:>8} {:>12} {:>12}  {}",
        "ID", "Category", "Vertices", "Area", "Perimeter", "Centroid"
    ));
    lines.push("-".repeat(80));
    for obj in &report.objects {
        let centroid = obj.centroid.map_or_else(
            || "-".to_string(),
            |c| format!("({:.1}, {:.1})", c.x, c.y),
        );
        lines.push(format!(
            "{:>4}  {:<18} {:>8} {:>12.1} {:>12.1}  {}",
            obj.id,
            obj.category.label(),
            obj.vertex_count,
            obj.area,
            obj.perimeter,
            centroid,
        ));
    }

    lines.push(String::new());
    lines.push("Tallies:".to_string());
    for category in ShapeCategory::ALL {
        let count = report.tallies.count(category);
        if count > 0 {
            lines.push(format!("  {:<18} {count}", category.label()));
        }
    }

    lines.join("\n")
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&AnalysisDiagnostics) -> Option<std::time::Duration>;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[AnalysisDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-stage means.
    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Grayscale", |d| Some(d.grayscale.duration)),
        ("Blur", |d| d.blur.as_ref().map(|s| s.duration)),
        ("Binarize", |d| Some(d.binarize.duration)),
        ("Extraction", |d| Some(d.extraction.duration)),
        ("Aggregation", |d| Some(d.aggregation.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
