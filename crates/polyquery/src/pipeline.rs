//! Candidate selection: proper-motion hull + sky ring → stored polygon strings → query.
//!
//! Flow
//! - Optionally narrow the proper-motion points with a row mask (typically a
//!   rectangle in another frame's proper-motion columns, see `PointSet::mask_within`).
//! - Hull the remaining points; vertex indices refer to the unfiltered rows.
//! - Serialize the sky ring and hull ring, persist both under fixed names,
//!   and render the candidate query from them.
//!
//! Frame transforms happen outside this crate: the sky ring arrives already
//! expressed in the catalog frame.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geom2::{convex_hull, convex_hull_with, ConvexHull, HullCfg, Point2};
use crate::points::PointSet;
use crate::query::{serialize_polygon, QueryParams, QueryTemplate, CANDIDATE_QUERY};
use crate::store::PolygonStore;

/// Store name of the sky-position polygon string.
pub const SKY_KEY: &str = "sky_point_list";
/// Store name of the proper-motion polygon string.
pub const PM_KEY: &str = "pm_point_list";

/// Table, columns, and scalar cuts of the candidate query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateFilters {
    pub table: String,
    pub columns: Vec<String>,
    pub parallax_max: f64,
    pub bp_rp_min: f64,
    pub bp_rp_max: f64,
}

impl Default for CandidateFilters {
    fn default() -> Self {
        Self {
            table: "gaiadr2.gaia_source".to_string(),
            columns: ["source_id", "ra", "dec", "pmra", "pmdec", "parallax"]
                .map(String::from)
                .to_vec(),
            parallax_max: 1.0,
            bp_rp_min: -0.75,
            bp_rp_max: 2.0,
        }
    }
}

/// Hull of the rows of `points` kept by `mask` (all rows when `None`).
///
/// Returned vertex indices refer to rows of `points`, not of the masked subset.
pub fn select_pm_polygon(
    points: &PointSet,
    mask: Option<&[bool]>,
    cfg: HullCfg,
) -> Result<ConvexHull> {
    let Some(mask) = mask else {
        return Ok(convex_hull_with(points.points(), cfg)?);
    };
    if mask.len() != points.len() {
        return Err(Error::MaskLength {
            expected: points.len(),
            got: mask.len(),
        });
    }
    let (rows, subset): (Vec<usize>, Vec<Point2>) = points
        .points()
        .iter()
        .zip(mask)
        .enumerate()
        .filter(|(_, (_, keep))| **keep)
        .map(|(i, (p, _))| (i, *p))
        .unzip();
    tracing::debug!(rows = points.len(), kept = rows.len(), "pm_prefilter");
    Ok(convex_hull_with(&subset, cfg)?.map_indices(&rows))
}

/// The two polygon strings a candidate query needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub sky_point_list: String,
    pub pm_point_list: String,
}

impl Selection {
    /// Serialize a sky ring and a proper-motion hull.
    ///
    /// The sky ring must enclose positive area; it is checked with the same
    /// hull rules as proper-motion points.
    pub fn build(sky_ring: &[Point2], pm_hull: &ConvexHull) -> Result<Self> {
        convex_hull(sky_ring)?;
        Ok(Self {
            sky_point_list: serialize_polygon(sky_ring)?,
            pm_point_list: serialize_polygon(pm_hull.points())?,
        })
    }

    /// Write both polygon strings in a single store update.
    pub fn persist(&self, store: &PolygonStore) -> Result<()> {
        store.put_all(&[
            (SKY_KEY, self.sky_point_list.as_str()),
            (PM_KEY, self.pm_point_list.as_str()),
        ])?;
        Ok(())
    }

    pub fn load(store: &PolygonStore) -> Result<Self> {
        Ok(Self {
            sky_point_list: store.get(SKY_KEY)?,
            pm_point_list: store.get(PM_KEY)?,
        })
    }

    /// Parameters for `CANDIDATE_QUERY` (or any template using the same names).
    pub fn params(&self, filters: &CandidateFilters) -> Result<QueryParams> {
        let mut params = QueryParams::new();
        params
            .set("table", filters.table.as_str())
            .set("columns", filters.columns.join(", "))
            .set(SKY_KEY, self.sky_point_list.as_str())
            .set(PM_KEY, self.pm_point_list.as_str());
        params.set_number("parallax_max", filters.parallax_max)?;
        params.set_number("bp_rp_min", filters.bp_rp_min)?;
        params.set_number("bp_rp_max", filters.bp_rp_max)?;
        Ok(params)
    }

    pub fn query(&self, filters: &CandidateFilters) -> Result<String> {
        let template = QueryTemplate::parse(CANDIDATE_QUERY)?;
        self.query_with(&template, filters)
    }

    pub fn query_with(&self, template: &QueryTemplate, filters: &CandidateFilters) -> Result<String> {
        Ok(template.render(&self.params(filters)?)?)
    }
}
