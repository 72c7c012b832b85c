//! Polygon approximation using the Ramer-Douglas-Peucker algorithm on
//! closed boundary loops.
//!
//! The absolute tolerance is derived per outline: `ε = factor ×
//! perimeter`, so the same factor behaves consistently across object
//! sizes. The resulting vertex count is the classification signal
//! downstream; area and perimeter are measured from the full outline
//! instead, so the tolerance only affects classification.

use crate::types::{Outline, Point, Polygon};

/// Approximate a closed outline as a polygon within `tolerance_factor ×
/// perimeter` deviation.
///
/// The ring is split at the point farthest from the first point, each
/// open half is simplified independently, and a final pass removes
/// vertices that are within tolerance of their neighbours' chord. A
/// factor of 0.0 preserves all points.
///
/// Outlines with fewer than 3 points are passed through unchanged; the
/// classifier maps them to `Unknown`.
#[must_use = "returns the approximating polygon"]
pub fn approximate(outline: &Outline, tolerance_factor: f64) -> Polygon {
    let points = outline.points();
    if points.len() < 3 {
        return Polygon::new(points.to_vec());
    }

    let epsilon = tolerance_factor * outline.perimeter();
    if epsilon <= 0.0 {
        return Polygon::new(points.to_vec());
    }

    // Split the ring at the point farthest from the anchor so both
    // halves are open polylines with well-separated endpoints.
    let mut far_idx = 0;
    let mut far_dist = 0.0;
    for (i, &p) in points.iter().enumerate() {
        let d = points[0].distance_squared(p);
        if d > far_dist {
            far_dist = d;
            far_idx = i;
        }
    }
    if far_dist == 0.0 {
        // Every point coincides with the anchor.
        return Polygon::new(vec![points[0]]);
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[far_idx] = true;
    rdp_recurse(points, 0, far_idx, epsilon, &mut kept);

    // Second half wraps around to the anchor.
    let mut wrapped: Vec<Point> = points[far_idx..].to_vec();
    wrapped.push(points[0]);
    let mut wrapped_kept = vec![false; wrapped.len()];
    wrapped_kept[0] = true;
    wrapped_kept[wrapped.len() - 1] = true;
    rdp_recurse(&wrapped, 0, wrapped.len() - 1, epsilon, &mut wrapped_kept);
    for (i, &keep) in wrapped_kept.iter().enumerate().take(wrapped.len() - 1) {
        if keep {
            kept[far_idx + i] = true;
        }
    }

    let ring: Vec<Point> = points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    Polygon::new(prune_collinear(ring, epsilon))
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// chord between them. If that distance exceeds `epsilon`, the point is
/// kept and both sub-segments are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, epsilon: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;
    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, epsilon, kept);
        rdp_recurse(points, max_idx, end, epsilon, kept);
    }
}

/// Remove ring vertices that lie within `epsilon` of the chord between
/// their cyclic neighbours.
///
/// The split anchor is an arbitrary boundary point; when it falls in
/// the middle of a straight edge the RDP passes keep it anyway. This
/// pass removes such vertices (one at a time, re-evaluating after each
/// removal) and thereby enforces that no vertex is collinear with its
/// neighbours within tolerance. A ring reduced below 3 vertices is
/// degenerate and classifies as `Unknown`.
fn prune_collinear(mut ring: Vec<Point>, epsilon: f64) -> Vec<Point> {
    loop {
        if ring.len() < 3 {
            return ring;
        }
        let redundant = (0..ring.len()).find(|&i| {
            let prev = ring[(i + ring.len() - 1) % ring.len()];
            let next = ring[(i + 1) % ring.len()];
            perpendicular_distance(ring[i], prev, next) <= epsilon
        });
        match redundant {
            Some(i) => {
                ring.remove(i);
            }
            None => return ring,
        }
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and
/// `b`.
///
/// Uses the formula: |cross(b-a, p-a)| / |b-a|.
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}
