//! Report assembly: per-outline approximation, classification and
//! measurement, minimum-area filtering, ID assignment and tallying.

use crate::classify::classify_polygon;
use crate::measure::measure;
use crate::simplify::approximate;
use crate::types::{
    AnalysisConfig, CategoryTallies, Dimensions, ObjectGeometry, ObjectRecord, Outline, Report,
};

/// Build a report from traced outlines, keeping the boundary geometry
/// of each reported object.
///
/// Outlines are processed in the order given (mask scan order). Each is
/// approximated, classified and measured independently; outlines whose
/// area falls below `min_area` are dropped before IDs are assigned, so
/// reported IDs are contiguous from 1 and `total_count` reflects only
/// reported objects. The returned geometry vector is index-aligned
/// with `report.objects`.
#[must_use]
pub fn aggregate_with_geometry(
    outlines: Vec<Outline>,
    config: &AnalysisConfig,
    dimensions: Dimensions,
) -> (Report, Vec<ObjectGeometry>) {
    let mut objects = Vec::new();
    let mut geometry = Vec::new();
    let mut tallies = CategoryTallies::default();

    for outline in outlines {
        let measurements = measure(&outline);
        if measurements.area < config.min_area {
            continue;
        }

        let polygon = approximate(&outline, config.approx_tolerance_factor);
        let category = classify_polygon(&polygon);
        tallies.increment(category);
        objects.push(ObjectRecord {
            id: objects.len() + 1,
            category,
            vertex_count: polygon.len(),
            area: measurements.area,
            perimeter: measurements.perimeter,
            centroid: measurements.centroid,
        });
        geometry.push(ObjectGeometry { outline, polygon });
    }

    let report = Report {
        total_count: objects.len(),
        objects,
        tallies,
        dimensions,
    };
    (report, geometry)
}

/// Build a report from traced outlines, discarding boundary geometry.
#[must_use]
pub fn aggregate(outlines: Vec<Outline>, config: &AnalysisConfig, dimensions: Dimensions) -> Report {
    aggregate_with_geometry(outlines, config, dimensions).0
}
