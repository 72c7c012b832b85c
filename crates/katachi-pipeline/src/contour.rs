//! Outline extraction: trace the outer boundary of every connected
//! foreground region in a binary mask.
//!
//! Regions are discovered by a raster scan with flood-fill marking, so
//! outlines come back in scan order of each region's first pixel
//! (top-to-bottom, left-to-right) and object IDs assigned downstream
//! are deterministic. Each region's outer boundary is walked along the
//! pixel-boundary cracks, keeping foreground on the right; holes inside
//! a region are never traced.
//!
//! The walk records a vertex only where the direction changes, so
//! straight runs contribute their endpoints only. The compression is
//! lossless: area and perimeter computed from the outline equal those
//! of the full crack boundary.

use image::GrayImage;

use crate::types::{Connectivity, Outline, Point};

/// Walk direction along pixel-boundary cracks, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
    East,
    South,
    West,
    North,
}

impl Dir {
    const fn delta(self) -> (i64, i64) {
        match self {
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::North => (0, -1),
        }
    }

    /// Clockwise rotation (right turn in image coordinates).
    const fn cw(self) -> Self {
        match self {
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
            Self::North => Self::East,
        }
    }

    /// Counterclockwise rotation (left turn in image coordinates).
    const fn ccw(self) -> Self {
        match self {
            Self::East => Self::North,
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
        }
    }
}

/// Binary mask bitmap with bounds-checked lookups.
struct Bitmap {
    fg: Vec<bool>,
    width: i64,
    height: i64,
}

impl Bitmap {
    fn from_mask(mask: &GrayImage) -> Self {
        Self {
            fg: mask.pixels().map(|p| p.0[0] > 0).collect(),
            width: i64::from(mask.width()),
            height: i64::from(mask.height()),
        }
    }

    /// Foreground test; out-of-bounds pixels are background.
    #[allow(clippy::cast_sign_loss)]
    fn fg(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return false;
        }
        self.fg[(y * self.width + x) as usize]
    }
}

/// Extract the outer outline of every maximal connected foreground
/// region in `mask`, in scan order of each region's first pixel.
///
/// An entirely background mask yields an empty vector. Never fails for
/// a well-formed mask.
#[must_use]
pub fn extract_outlines(mask: &GrayImage, connectivity: Connectivity) -> Vec<Outline> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let bitmap = Bitmap::from_mask(mask);
    let mut visited = vec![false; bitmap.fg.len()];
    let mut outlines = Vec::new();

    for y in 0..i64::from(height) {
        for x in 0..i64::from(width) {
            #[allow(clippy::cast_sign_loss)]
            let index = (y * bitmap.width + x) as usize;
            if bitmap.fg[index] && !visited[index] {
                outlines.push(trace_outline(&bitmap, x, y, connectivity));
                flood_fill(&bitmap, &mut visited, x, y, connectivity);
            }
        }
    }

    outlines
}

/// Mark every pixel of the region containing `(x, y)` as visited.
#[allow(clippy::cast_sign_loss)]
fn flood_fill(bitmap: &Bitmap, visited: &mut [bool], x: i64, y: i64, connectivity: Connectivity) {
    let neighbors: &[(i64, i64)] = match connectivity {
        Connectivity::Four => &[(1, 0), (-1, 0), (0, 1), (0, -1)],
        Connectivity::Eight => &[
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ],
    };

    visited[(y * bitmap.width + x) as usize] = true;
    let mut stack = vec![(x, y)];
    while let Some((cx, cy)) = stack.pop() {
        for &(dx, dy) in neighbors {
            let (nx, ny) = (cx + dx, cy + dy);
            if bitmap.fg(nx, ny) {
                let index = (ny * bitmap.width + nx) as usize;
                if !visited[index] {
                    visited[index] = true;
                    stack.push((nx, ny));
                }
            }
        }
    }
}

/// The pixel to the right of the directed crack edge leaving corner
/// `(cx, cy)` in direction `d`.
const fn right_pixel(cx: i64, cy: i64, d: Dir) -> (i64, i64) {
    match d {
        Dir::East => (cx, cy),
        Dir::South => (cx - 1, cy),
        Dir::West => (cx - 1, cy - 1),
        Dir::North => (cx, cy - 1),
    }
}

/// The pixel to the left of the directed crack edge leaving corner
/// `(cx, cy)` in direction `d`.
const fn left_pixel(cx: i64, cy: i64, d: Dir) -> (i64, i64) {
    match d {
        Dir::East => (cx, cy - 1),
        Dir::South => (cx, cy),
        Dir::West => (cx - 1, cy),
        Dir::North => (cx - 1, cy - 1),
    }
}

/// A crack edge belongs to an outer boundary walked clockwise exactly
/// when foreground lies on its right and background on its left.
fn edge_on_boundary(bitmap: &Bitmap, cx: i64, cy: i64, d: Dir) -> bool {
    let (rx, ry) = right_pixel(cx, cy, d);
    let (lx, ly) = left_pixel(cx, cy, d);
    bitmap.fg(rx, ry) && !bitmap.fg(lx, ly)
}

/// Choose the outgoing direction at corner `(cx, cy)` given incoming
/// direction `d`.
///
/// At a corner where two foreground pixels meet diagonally, the
/// leftmost turn keeps them joined (8-connectivity) and the rightmost
/// turn keeps them apart (4-connectivity); the candidate order encodes
/// the connectivity rule.
fn next_dir(bitmap: &Bitmap, cx: i64, cy: i64, d: Dir, connectivity: Connectivity) -> Dir {
    let candidates = match connectivity {
        Connectivity::Eight => [d.ccw(), d, d.cw()],
        Connectivity::Four => [d.cw(), d, d.ccw()],
    };
    for candidate in candidates {
        if edge_on_boundary(bitmap, cx, cy, candidate) {
            return candidate;
        }
    }
    d.cw().cw()
}

/// Trace the outer boundary of the region whose first-in-scan-order
/// pixel is `(x, y)`, recording a vertex at every direction change.
///
/// The start pixel has background above and to its left, so the walk
/// begins eastward along its top edge and the start corner is always a
/// vertex. The walk terminates when it is about to re-traverse the
/// starting crack edge; each directed edge has a unique successor, so
/// the walk is a single closed cycle.
#[allow(clippy::cast_precision_loss)]
fn trace_outline(bitmap: &Bitmap, x: i64, y: i64, connectivity: Connectivity) -> Outline {
    let start = (x, y);
    let mut points = vec![Point::new(x as f64, y as f64)];

    let (mut cx, mut cy) = start;
    let mut d = Dir::East;
    loop {
        let (dx, dy) = d.delta();
        cx += dx;
        cy += dy;
        let nd = next_dir(bitmap, cx, cy, d, connectivity);
        if (cx, cy) == start && nd == Dir::East {
            break;
        }
        if nd != d {
            points.push(Point::new(cx as f64, cy as f64));
        }
        d = nd;
    }

    Outline::new(points)
}
