use anyhow::{Context, Result};
use polyquery::geom2::{Bounds2, HullCfg, Point2};
use polyquery::pipeline::CandidateFilters;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Two table columns read as (x, y).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub x: String,
    pub y: String,
}

impl ColumnPair {
    fn pm_icrs() -> Self {
        Self {
            x: "pmra".to_string(),
            y: "pmdec".to_string(),
        }
    }
}

/// Rows kept before hulling: those whose `columns` fall inside `bounds`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prefilter {
    pub columns: ColumnPair,
    pub bounds: Bounds2,
}

/// Sky region in the catalog frame: a box, or corners transformed elsewhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyRegion {
    Bounds(Bounds2),
    Ring(Vec<[f64; 2]>),
}

impl SkyRegion {
    pub fn ring(&self) -> Vec<Point2> {
        match self {
            SkyRegion::Bounds(b) => b.to_ring().to_vec(),
            SkyRegion::Ring(corners) => corners.iter().map(|&[x, y]| Point2::new(x, y)).collect(),
        }
    }
}

/// `select` run configuration (JSON).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionCfg {
    #[serde(default = "ColumnPair::pm_icrs")]
    pub pm_columns: ColumnPair,
    #[serde(default)]
    pub prefilter: Option<Prefilter>,
    pub sky: SkyRegion,
    #[serde(default)]
    pub filters: CandidateFilters,
    #[serde(default = "default_eps_area")]
    pub eps_area: f64,
}

fn default_eps_area() -> f64 {
    HullCfg::default().eps_area
}

impl SelectionCfg {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn hull_cfg(&self) -> HullCfg {
        HullCfg {
            eps_area: self.eps_area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg: SelectionCfg = serde_json::from_value(json!({
            "sky": {"bounds": {"x_min": 146.0, "x_max": 162.5, "y_min": 31.0, "y_max": 39.0}}
        }))
        .unwrap();
        assert_eq!(cfg.pm_columns.x, "pmra");
        assert_eq!(cfg.pm_columns.y, "pmdec");
        assert!(cfg.prefilter.is_none());
        assert_eq!(cfg.filters, CandidateFilters::default());
        assert_eq!(cfg.hull_cfg().eps_area, HullCfg::default().eps_area);
        assert_eq!(cfg.sky.ring().len(), 5);
    }

    #[test]
    fn ring_and_prefilter_parse() {
        let cfg: SelectionCfg = serde_json::from_value(json!({
            "pm_columns": {"x": "pmra", "y": "pmdec"},
            "prefilter": {
                "columns": {"x": "pm_phi1", "y": "pm_phi2"},
                "bounds": {"x_min": -8.9, "x_max": -6.9, "y_min": -2.2, "y_max": 1.0}
            },
            "sky": {"ring": [[135.3, 8.4], [126.5, 13.4], [163.0, 54.2], [172.2, 46.5], [135.3, 8.4]]},
            "filters": {"parallax_max": 0.5}
        }))
        .unwrap();
        let pf = cfg.prefilter.unwrap();
        assert_eq!(pf.columns.x, "pm_phi1");
        assert_eq!(pf.bounds, Bounds2::new(-8.9, -6.9, -2.2, 1.0));
        assert_eq!(cfg.sky.ring()[2], Point2::new(163.0, 54.2));
        assert_eq!(cfg.filters.parallax_max, 0.5);
        assert_eq!(cfg.filters.table, "gaiadr2.gaia_source");
    }

    #[test]
    fn sky_is_required_and_typos_rejected() {
        assert!(serde_json::from_value::<SelectionCfg>(json!({})).is_err());
        assert!(serde_json::from_value::<SelectionCfg>(json!({
            "sky": {"ring": []},
            "pm_colums": {"x": "a", "y": "b"}
        }))
        .is_err());
    }
}
