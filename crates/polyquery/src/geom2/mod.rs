//! 2D geometry for polygon selection.
//!
//! Purpose
//! - Compute the convex hull of a point set as an ordered ring of source
//!   indices (`ConvexHull`), deterministic and order-independent.
//! - Build the closed rectangle rings used as coarse selection boxes.
//!
//! Conventions
//! - Hull rings are counter-clockwise and open (first vertex not repeated).
//! - Rectangle rings are closed (first corner repeated).
//! - Code cross-refs: `ConvexHull`, `Bounds2`, `Hs2`, `HullCfg`

mod hull;
mod types;

pub use hull::{convex_hull, convex_hull_with, ConvexHull, HullError};
pub use types::{rectangle_from_bounds, Bounds2, HullCfg, Hs2, Point2};
