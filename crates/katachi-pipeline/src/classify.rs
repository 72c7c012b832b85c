//! Vertex-count shape classification.

use crate::types::{Polygon, ShapeCategory};

/// Classify a polygon by its vertex count.
///
/// Fewer than three vertices means the outline degenerated during
/// approximation and the object is `Unknown`. More than six vertices is
/// taken as an approximation of a round boundary.
#[must_use]
pub const fn classify(vertex_count: usize) -> ShapeCategory {
    match vertex_count {
        0..=2 => ShapeCategory::Unknown,
        3 => ShapeCategory::Triangle,
        4 => ShapeCategory::Quadrilateral,
        5 => ShapeCategory::Pentagon,
        6 => ShapeCategory::Hexagon,
        _ => ShapeCategory::Circle,
    }
}

/// Classify the approximating polygon of an outline.
#[must_use]
pub fn classify_polygon(polygon: &Polygon) -> ShapeCategory {
    classify(polygon.len())
}
