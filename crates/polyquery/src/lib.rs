//! Polygon selection for catalog queries.
//!
//! Stages (each a pure function of its inputs)
//! - `points`: two numeric table columns → `PointSet`.
//! - `geom2`: `PointSet` → `ConvexHull` (CCW ring of source indices); rectangle rings.
//! - `query`: rings → polygon strings; `{name}` templates → query text.
//! - `store`: polygon strings persisted under fixed names for later runs.
//! - `pipeline`: the candidate-selection workflow wired from the above.
//!
//! Frame transforms, query execution, and plotting live outside this crate.

pub mod error;
pub mod geom2;
pub mod pipeline;
pub mod points;
pub mod query;
pub mod store;

pub use error::{Error, Result};

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::geom2::{
        convex_hull, convex_hull_with, rectangle_from_bounds, Bounds2, ConvexHull, HullCfg,
        HullError, Point2,
    };
    pub use crate::pipeline::{select_pm_polygon, CandidateFilters, Selection, PM_KEY, SKY_KEY};
    pub use crate::points::{LoadError, PointSet};
    pub use crate::query::{
        assemble_query, format_coord, serialize_polygon, FormatError, QueryParams, QueryTemplate,
        TemplateError, CANDIDATE_QUERY,
    };
    pub use crate::store::{PolygonStore, StoreError};
}
