//! Convex hull over a point set, reported as indices into the source slice.
//!
//! Conventions
//! - Vertices run counter-clockwise, starting at the lexicographically smallest
//!   vertex (smallest x, ties broken by smallest y).
//! - Intermediate collinear boundary points are dropped; only the extreme two
//!   points of a straight edge appear.
//! - Exact duplicates collapse onto the lowest source index.
//! - The vertex geometry depends only on the set of input points, not on their
//!   order; indices naturally follow the caller's indexing.

use std::cmp::Ordering;

use thiserror::Error;

use super::types::{HullCfg, Hs2, Point2};

/// Why a hull could not be built.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HullError {
    /// Fewer than three input points; a hull is undefined.
    #[error("convex hull needs at least 3 points, got {got}")]
    InsufficientPoints { got: usize },
    /// NaN or infinite coordinate at the given index.
    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    /// Zero-area input: all points coincide or lie on one line.
    #[error("point set has zero area ({distinct} distinct points)")]
    Degenerate { distinct: usize },
    /// Coordinates so far apart that the extent or area is not representable.
    #[error("hull area overflows f64 (extent {extent})")]
    AreaOverflow { extent: f64 },
}

/// Convex hull boundary of a point set.
///
/// Invariants:
/// - `vertices.len() == points.len() >= 3`, indices distinct.
/// - `points[k]` is the source point at `vertices[k]`.
/// - Counter-clockwise, strictly convex (no collinear triples), positive area.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<usize>,
    points: Vec<Point2>,
}

impl ConvexHull {
    /// Indices into the source point slice, in boundary order.
    #[inline]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Vertex coordinates, same order as [`ConvexHull::vertices`].
    #[inline]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false for a constructed hull; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Enclosed area (triangle fan from the first vertex). Positive for the CCW ring.
    pub fn area(&self) -> f64 {
        0.5 * fan_cross_sum(&self.points, 1.0)
    }

    /// One outward half-space per edge, with unit normal.
    pub fn halfspaces(&self) -> Vec<Hs2> {
        let k = self.points.len();
        (0..k)
            .map(|i| {
                let p = self.points[i];
                let q = self.points[(i + 1) % k];
                let edge = q - p;
                // CCW ring: outward normal is the edge rotated 90° clockwise.
                let n = Point2::new(edge.y, -edge.x) / edge.norm();
                Hs2::new(n, n.dot(&p))
            })
            .collect()
    }

    /// Membership allowing `p` to lie at most distance `eps` outside each edge line.
    pub fn contains_eps(&self, p: Point2, eps: f64) -> bool {
        self.halfspaces().iter().all(|h| h.satisfies_eps(p, eps))
    }

    /// Rewrite vertex indices through `source`, i.e. `vertices[k] = source[vertices[k]]`.
    ///
    /// Used when the hull was computed on a filtered subset and indices should
    /// refer to the unfiltered rows.
    ///
    /// # Panics
    /// If a vertex index is out of range of `source`.
    pub(crate) fn map_indices(self, source: &[usize]) -> ConvexHull {
        ConvexHull {
            vertices: self.vertices.iter().map(|&i| source[i]).collect(),
            points: self.points,
        }
    }
}

/// Convex hull with default tolerances.
pub fn convex_hull(points: &[Point2]) -> Result<ConvexHull, HullError> {
    convex_hull_with(points, HullCfg::default())
}

/// Andrew's monotone chain over indices (returns hull in CCW order).
pub fn convex_hull_with(points: &[Point2], cfg: HullCfg) -> Result<ConvexHull, HullError> {
    let n = points.len();
    if n < 3 {
        return Err(HullError::InsufficientPoints { got: n });
    }
    if let Some(index) = points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite()))
    {
        return Err(HullError::NonFinite { index });
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| lex_cmp(points[a], points[b]).then(a.cmp(&b)));
    order.dedup_by(|later, kept| points[*later] == points[*kept]);
    let distinct = order.len();
    if distinct < 3 {
        return Err(HullError::Degenerate { distinct });
    }

    let mut lower: Vec<usize> = Vec::with_capacity(distinct);
    for &i in &order {
        while lower.len() >= 2
            && cross(
                points[lower[lower.len() - 2]],
                points[lower[lower.len() - 1]],
                points[i],
            ) <= 0.0
        {
            lower.pop();
        }
        lower.push(i);
    }
    let mut upper: Vec<usize> = Vec::with_capacity(distinct);
    for &i in order.iter().rev() {
        while upper.len() >= 2
            && cross(
                points[upper[upper.len() - 2]],
                points[upper[upper.len() - 1]],
                points[i],
            ) <= 0.0
        {
            upper.pop();
        }
        upper.push(i);
    }
    lower.pop();
    upper.pop();
    let mut vertices = lower;
    vertices.extend(upper);
    if vertices.len() < 3 {
        return Err(HullError::Degenerate { distinct });
    }

    let hull_points: Vec<Point2> = vertices.iter().map(|&i| points[i]).collect();
    // Tolerance check runs on the hull rescaled to unit extent, so it depends
    // on shape only, not on offset or scale.
    let extent = bbox_extent(&hull_points);
    if !extent.is_finite() {
        return Err(HullError::AreaOverflow { extent });
    }
    if 0.5 * fan_cross_sum(&hull_points, extent) <= cfg.eps_area {
        return Err(HullError::Degenerate { distinct });
    }
    let area = 0.5 * fan_cross_sum(&hull_points, 1.0);
    if !area.is_finite() {
        return Err(HullError::AreaOverflow { extent });
    }

    tracing::debug!(n, distinct, vertices = vertices.len(), area, "convex_hull");
    Ok(ConvexHull {
        vertices,
        points: hull_points,
    })
}

#[inline]
fn lex_cmp(a: Point2, b: Point2) -> Ordering {
    match a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal),
        o => o,
    }
}

#[inline]
fn cross(a: Point2, b: Point2, c: Point2) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Twice the signed area of `ring / scale`, summed over the triangle fan at
/// `ring[0]`. Works on differences, so a far-away ring loses no precision.
fn fan_cross_sum(ring: &[Point2], scale: f64) -> f64 {
    let o = ring[0];
    ring.windows(2)
        .skip(1)
        .map(|w| {
            let a = (w[0] - o) / scale;
            let b = (w[1] - o) / scale;
            a.x * b.y - a.y * b.x
        })
        .sum()
}

/// Larger side of the bounding box.
fn bbox_extent(points: &[Point2]) -> f64 {
    let (mut x_lo, mut x_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_lo, mut y_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        x_lo = x_lo.min(p.x);
        x_hi = x_hi.max(p.x);
        y_lo = y_lo.min(p.y);
        y_hi = y_hi.max(p.y);
    }
    (x_hi - x_lo).max(y_hi - y_lo)
}
