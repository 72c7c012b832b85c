//! Shared types for the katachi shape analysis pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference the
/// decoded input image without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// The traced outer boundary of one connected foreground region.
///
/// Points are lattice corners recorded at direction changes of the
/// boundary walk, in a consistent winding order. The first and last
/// point are implicitly connected: the boundary is a closed loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline(Vec<Point>);

impl Outline {
    /// Create a new outline from a vector of boundary points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the outline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of boundary points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all boundary points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the outline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Total length of the closed boundary loop: the sum of Euclidean
    /// distances between consecutive points, including the implicit
    /// segment from the last point back to the first.
    ///
    /// Outlines with fewer than 2 points have perimeter 0.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        if self.0.len() < 2 {
            return 0.0;
        }
        let mut total = 0.0;
        for (i, &p) in self.0.iter().enumerate() {
            let next = self.0[(i + 1) % self.0.len()];
            total += p.distance(next);
        }
        total
    }
}

/// A reduced vertex sequence approximating an [`Outline`] within a
/// deviation tolerance. Consecutive vertices are not collinear within
/// that tolerance; the vertex count is the classification signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Create a new polygon from a vector of vertices.
    #[must_use]
    pub const fn new(vertices: Vec<Point>) -> Self {
        Self(vertices)
    }

    /// Returns `true` if the polygon has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the vertex count.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polygon and returns the underlying vector of vertices.
    #[must_use]
    pub fn into_vertices(self) -> Vec<Point> {
        self.0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// How the binarization threshold is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThresholdMode {
    /// Use [`AnalysisConfig::threshold_value`] directly.
    Fixed,
    /// Derive the threshold from the intensity histogram via Otsu's
    /// bimodal separation.
    #[default]
    Auto,
}

/// Which side of the threshold counts as foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Polarity {
    /// Foreground pixels are darker than the threshold.
    DarkOnLight,
    /// Foreground pixels are brighter than the threshold.
    #[default]
    LightOnDark,
}

/// Whether diagonal neighbor pixels count as connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Only the four edge-adjacent neighbors are connected.
    Four,
    /// Edge- and corner-adjacent neighbors are connected.
    #[default]
    Eight,
}

/// Configuration for the shape analysis pipeline.
///
/// All parameters have defaults matching the `DEFAULT_*` consts.
/// [`AnalysisConfig::validate`] rejects values outside their documented
/// domains before any pixel work starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Threshold selection strategy for binarization.
    pub threshold_mode: ThresholdMode,

    /// Fixed binarization threshold in `[0, 255]`.
    /// Only used when `threshold_mode` is [`ThresholdMode::Fixed`].
    pub threshold_value: u8,

    /// Whether to invert the binary mask after thresholding.
    pub invert: bool,

    /// Kernel size of the pre-threshold smoothing pass. Must be odd;
    /// `0` or `1` disables smoothing.
    pub blur_kernel_size: u32,

    /// Which side of the threshold counts as foreground.
    pub polarity: Polarity,

    /// Polygon approximation tolerance as a fraction of each outline's
    /// perimeter, typically in `[0.01, 0.05]`. Larger values merge more
    /// vertices, biasing classification toward round shapes; smaller
    /// values preserve more vertices.
    pub approx_tolerance_factor: f64,

    /// Minimum object area in square pixels. Outlines with a smaller
    /// measured area are dropped before ID assignment. `0.0` disables
    /// filtering.
    pub min_area: f64,

    /// Connectivity rule for grouping foreground pixels into regions.
    pub connectivity: Connectivity,
}

impl AnalysisConfig {
    /// Default fixed threshold (midpoint of the intensity range).
    pub const DEFAULT_THRESHOLD_VALUE: u8 = 127;

    /// Default smoothing kernel size (disabled).
    pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 0;

    /// Default polygon approximation tolerance factor.
    pub const DEFAULT_APPROX_TOLERANCE_FACTOR: f64 = 0.02;

    /// Default minimum object area (no filtering).
    pub const DEFAULT_MIN_AREA: f64 = 0.0;

    /// Check all fields against their documented domains.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] if the blur kernel is
    /// even (and larger than 1), or if `approx_tolerance_factor` or
    /// `min_area` is negative or non-finite.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.blur_kernel_size > 1 && self.blur_kernel_size.is_multiple_of(2) {
            return Err(AnalysisError::InvalidConfig(format!(
                "blur_kernel_size must be odd, got {}",
                self.blur_kernel_size,
            )));
        }
        if !self.approx_tolerance_factor.is_finite() || self.approx_tolerance_factor < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "approx_tolerance_factor must be finite and non-negative, got {}",
                self.approx_tolerance_factor,
            )));
        }
        if !self.min_area.is_finite() || self.min_area < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_area must be finite and non-negative, got {}",
                self.min_area,
            )));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold_mode: ThresholdMode::default(),
            threshold_value: Self::DEFAULT_THRESHOLD_VALUE,
            invert: false,
            blur_kernel_size: Self::DEFAULT_BLUR_KERNEL_SIZE,
            polarity: Polarity::default(),
            approx_tolerance_factor: Self::DEFAULT_APPROX_TOLERANCE_FACTOR,
            min_area: Self::DEFAULT_MIN_AREA,
            connectivity: Connectivity::default(),
        }
    }
}

/// Shape category assigned from a polygon's vertex count.
///
/// The `Circle` label is a coarse heuristic: any polygon with more than
/// six vertices is assumed to approximate a circle. No circularity
/// ratio is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeCategory {
    /// Three vertices.
    Triangle,
    /// Four vertices (squares and rectangles are not distinguished).
    Quadrilateral,
    /// Five vertices.
    Pentagon,
    /// Six vertices.
    Hexagon,
    /// More than six vertices.
    Circle,
    /// Fewer than three vertices (degenerate outline).
    Unknown,
}

impl ShapeCategory {
    /// Every category, in tally/display order.
    pub const ALL: [Self; 6] = [
        Self::Triangle,
        Self::Quadrilateral,
        Self::Pentagon,
        Self::Hexagon,
        Self::Circle,
        Self::Unknown,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Triangle => "Triangle",
            Self::Quadrilateral => "Square/Rectangle",
            Self::Pentagon => "Pentagon",
            Self::Hexagon => "Hexagon",
            Self::Circle => "Circle",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ShapeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-category object counts for one report.
///
/// One field per [`ShapeCategory`] variant, so every category is
/// present in every report by construction, including zero counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTallies {
    /// Number of triangles.
    pub triangle: u32,
    /// Number of quadrilaterals.
    pub quadrilateral: u32,
    /// Number of pentagons.
    pub pentagon: u32,
    /// Number of hexagons.
    pub hexagon: u32,
    /// Number of circles.
    pub circle: u32,
    /// Number of unclassifiable objects.
    pub unknown: u32,
}

impl CategoryTallies {
    /// Increment the count for `category`.
    pub const fn increment(&mut self, category: ShapeCategory) {
        match category {
            ShapeCategory::Triangle => self.triangle += 1,
            ShapeCategory::Quadrilateral => self.quadrilateral += 1,
            ShapeCategory::Pentagon => self.pentagon += 1,
            ShapeCategory::Hexagon => self.hexagon += 1,
            ShapeCategory::Circle => self.circle += 1,
            ShapeCategory::Unknown => self.unknown += 1,
        }
    }

    /// The count for `category`.
    #[must_use]
    pub const fn count(self, category: ShapeCategory) -> u32 {
        match category {
            ShapeCategory::Triangle => self.triangle,
            ShapeCategory::Quadrilateral => self.quadrilateral,
            ShapeCategory::Pentagon => self.pentagon,
            ShapeCategory::Hexagon => self.hexagon,
            ShapeCategory::Circle => self.circle,
            ShapeCategory::Unknown => self.unknown,
        }
    }

    /// Sum across all categories.
    #[must_use]
    pub const fn total(self) -> u32 {
        self.triangle + self.quadrilateral + self.pentagon + self.hexagon + self.circle
            + self.unknown
    }
}

/// One detected object: classification plus geometric measurements.
///
/// Immutable once built; `id` is 1-based and sequential in mask scan
/// order after minimum-area filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Sequential object ID, starting at 1.
    pub id: usize,
    /// Shape category from the polygon vertex count.
    pub category: ShapeCategory,
    /// Vertex count of the approximating polygon.
    pub vertex_count: usize,
    /// Enclosed area in square pixels (shoelace formula over the
    /// full-resolution outline).
    pub area: f64,
    /// Boundary length in pixels (closed-loop sum over the
    /// full-resolution outline).
    pub perimeter: f64,
    /// Area-weighted centroid. `None` exactly when `area == 0`.
    pub centroid: Option<Point>,
}

/// Final output of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Per-object records in ID order.
    pub objects: Vec<ObjectRecord>,
    /// Number of reported objects. Always equals `objects.len()`;
    /// outlines removed by the minimum-area filter are not counted.
    pub total_count: usize,
    /// Object counts per shape category.
    pub tallies: CategoryTallies,
    /// Dimensions of the analyzed image in pixels.
    pub dimensions: Dimensions,
}

/// Boundary geometry for one reported object, index-aligned with
/// [`Report::objects`]. Display collaborators use these to draw
/// outlines and labels; the pipeline itself draws nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectGeometry {
    /// Full-resolution traced boundary.
    pub outline: Outline,
    /// Simplified polygon used for classification.
    pub polygon: Polygon,
}

/// Result of running the pipeline with all intermediate stage outputs
/// preserved, for previews and overlay drawing.
#[derive(Debug, Clone)]
pub struct StagedAnalysis {
    /// Stage 1: grayscale conversion of the input.
    pub grayscale: GrayImage,
    /// Stage 2: smoothed image (identical to `grayscale` when smoothing
    /// is disabled).
    pub blurred: GrayImage,
    /// Stage 3: binary foreground mask (0/255).
    pub mask: GrayImage,
    /// Stage 4: every traced outline, in scan order, before filtering.
    pub outlines: Vec<Outline>,
    /// Boundary geometry per reported object, aligned with
    /// `report.objects`.
    pub geometry: Vec<ObjectGeometry>,
    /// The final report.
    pub report: Report,
}

/// Errors that can occur during shape analysis.
///
/// Both variants are detected before any per-outline work starts.
/// Degenerate outlines are not errors; they produce
/// [`ShapeCategory::Unknown`] records.
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
pub enum AnalysisError {
    /// Configuration values outside their documented domains.
    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),

    /// The input image has zero width or height.
    #[error("input image is empty")]
    EmptyInput,
}
