//! Basic 2D types and tolerances used by hull selection.
//!
//! - `Point2`: a coordinate pair; the meaning of the axes belongs to the caller
//!   (proper-motion components, sky position, ...).
//! - `HullCfg`: centralizes the area tolerance for degeneracy checks.
//! - `Bounds2`: closed axis-aligned box; builds rectangle rings.
//! - `Hs2`: closed half-space `n·x <= c`, used for hull containment.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// A point in the plane. Immutable value type.
pub type Point2 = Vector2<f64>;

/// Hull configuration (tolerances).
#[derive(Clone, Copy, Debug)]
pub struct HullCfg {
    /// Relative area below which a hull counts as zero-area.
    /// Compared against the squared extent of the bounding box.
    pub eps_area: f64,
}

impl Default for HullCfg {
    fn default() -> Self {
        Self { eps_area: 1e-12 }
    }
}

/// Closed axis-aligned box `[x_min, x_max] × [y_min, y_max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds2 {
    #[inline]
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Inclusive on both ends of each axis.
    #[inline]
    pub fn contains(&self, p: Point2) -> bool {
        self.x_min <= p.x && p.x <= self.x_max && self.y_min <= p.y && p.y <= self.y_max
    }

    /// Closed 5-point ring, see [`rectangle_from_bounds`].
    #[inline]
    pub fn to_ring(&self) -> [Point2; 5] {
        rectangle_from_bounds(self.x_min, self.x_max, self.y_min, self.y_max)
    }
}

/// Closed rectangle ring `(x1,y1), (x1,y2), (x2,y2), (x2,y1), (x1,y1)`.
///
/// The first corner is repeated at the end so polygon consumers see a closed ring.
/// No ordering check is made on the bounds; swapped bounds give the mirrored ring.
pub fn rectangle_from_bounds(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> [Point2; 5] {
    [
        Point2::new(x_min, y_min),
        Point2::new(x_min, y_max),
        Point2::new(x_max, y_max),
        Point2::new(x_max, y_min),
        Point2::new(x_min, y_min),
    ]
}

/// Closed half-space `n · x <= c`. With a unit `n`, `eps` in
/// [`Hs2::satisfies_eps`] is a distance.
#[derive(Clone, Copy, Debug)]
pub struct Hs2 {
    pub n: Vector2<f64>,
    pub c: f64,
}

impl Hs2 {
    #[inline]
    pub fn new(n: Vector2<f64>, c: f64) -> Self {
        Self { n, c }
    }
    #[inline]
    pub fn satisfies_eps(&self, p: Point2, eps: f64) -> bool {
        self.n.dot(&p) <= self.c + eps
    }
}
