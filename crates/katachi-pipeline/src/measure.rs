//! Geometric measurement of traced outlines.
//!
//! All quantities are computed from the full-resolution outline, never
//! from the simplified polygon, so the approximation tolerance cannot
//! perturb area or perimeter. Area and centroid come from [`geo`]'s
//! shoelace-based implementations; perimeter is the closed-loop segment
//! sum on [`Outline`] itself.

use geo::{Area, Centroid, Coord, LineString};

use crate::types::{Outline, Point};

/// Area, perimeter and centroid of one outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    /// Enclosed area in square pixels.
    pub area: f64,
    /// Boundary length in pixels.
    pub perimeter: f64,
    /// Area-weighted centroid, `None` exactly when `area == 0`.
    pub centroid: Option<Point>,
}

/// Measure a traced outline.
///
/// Outlines with fewer than three points enclose nothing: area is 0 and
/// the centroid is `None`, while the perimeter still reflects the
/// closed-loop point sequence.
#[must_use]
pub fn measure(outline: &Outline) -> Measurements {
    let perimeter = outline.perimeter();
    if outline.len() < 3 {
        return Measurements {
            area: 0.0,
            perimeter,
            centroid: None,
        };
    }

    let ring: LineString<f64> = outline
        .points()
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect();
    let polygon = geo::Polygon::new(ring, vec![]);

    let area = polygon.unsigned_area();
    let centroid = if area == 0.0 {
        None
    } else {
        polygon.centroid().map(|c| Point::new(c.x(), c.y()))
    };

    Measurements {
        area,
        perimeter,
        centroid,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square_outline(origin: f64, side: f64) -> Outline {
        Outline::new(vec![
            Point::new(origin, origin),
            Point::new(origin + side, origin),
            Point::new(origin + side, origin + side),
            Point::new(origin, origin + side),
        ])
    }

    #[test]
    fn square_area_perimeter_centroid() {
        let m = measure(&square_outline(0.0, 100.0));
        assert!((m.area - 10_000.0).abs() < 1e-9);
        assert!((m.perimeter - 400.0).abs() < 1e-9);
        let c = m.centroid.unwrap();
        assert!((c.x - 50.0).abs() < 1e-9);
        assert!((c.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn translation_moves_centroid_not_area() {
        let at_origin = measure(&square_outline(0.0, 10.0));
        let shifted = measure(&square_outline(30.0, 10.0));
        assert!((at_origin.area - shifted.area).abs() < 1e-9);
        assert!((at_origin.perimeter - shifted.perimeter).abs() < 1e-9);
        let c = shifted.centroid.unwrap();
        assert!((c.x - 35.0).abs() < 1e-9);
        assert!((c.y - 35.0).abs() < 1e-9);
    }

    #[test]
    fn winding_direction_does_not_flip_area_sign() {
        let mut reversed = square_outline(0.0, 10.0).into_points();
        reversed.reverse();
        let m = measure(&Outline::new(reversed));
        assert!((m.area - 100.0).abs() < 1e-9);
    }

    #[test]
    fn triangle_area_matches_half_base_height() {
        let outline = Outline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(0.0, 10.0),
        ]);
        let m = measure(&outline);
        assert!((m.area - 100.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_outline_has_zero_area_and_no_centroid() {
        let empty = measure(&Outline::new(vec![]));
        assert!(empty.area.abs() < f64::EPSILON);
        assert!(empty.centroid.is_none());
        assert!(empty.perimeter.abs() < f64::EPSILON);

        let pair = measure(&Outline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
        ]));
        assert!(pair.area.abs() < f64::EPSILON);
        assert!(pair.centroid.is_none());
        assert!((pair.perimeter - 8.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_ring_has_no_centroid() {
        let m = measure(&Outline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
        ]));
        assert!(m.area.abs() < f64::EPSILON);
        assert!(m.centroid.is_none());
    }
}
