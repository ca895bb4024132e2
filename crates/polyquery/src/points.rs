//! Point sets extracted from tabular data.
//!
//! A `PointSet` is built once from two numeric columns and never mutated.
//! Rows with a missing or non-finite value fail the load instead of being
//! dropped, since a silently shortened set would change the hull.

use polars::prelude::*;
use thiserror::Error;

use crate::geom2::{Bounds2, Point2};

/// Why a table could not be turned into a point set.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("column `{column}` not found")]
    MissingColumn { column: String },
    #[error("column `{column}` has non-numeric dtype {dtype}")]
    NonNumericColumn { column: String, dtype: String },
    #[error("column `{column}` has a missing or non-finite value at row {row}")]
    MissingValue { column: String, row: usize },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Ordered 2D points with stable indexing.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet {
    columns: (String, String),
    points: Vec<Point2>,
}

impl PointSet {
    /// One point per row from the numeric columns `x_col` and `y_col`, in row order.
    pub fn from_columns(df: &DataFrame, x_col: &str, y_col: &str) -> Result<Self, LoadError> {
        let xs = numeric_column(df, x_col)?;
        let ys = numeric_column(df, y_col)?;
        let points = xs
            .into_iter()
            .zip(ys)
            .map(|(x, y)| Point2::new(x, y))
            .collect::<Vec<_>>();
        tracing::debug!(x_col, y_col, rows = points.len(), "point_set_loaded");
        Ok(Self {
            columns: (x_col.to_string(), y_col.to_string()),
            points,
        })
    }

    /// Build from in-memory `(x, y)` rows.
    pub fn from_pairs<I>(x_col: &str, y_col: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self {
            columns: (x_col.to_string(), y_col.to_string()),
            points: rows.into_iter().map(|(x, y)| Point2::new(x, y)).collect(),
        }
    }

    #[inline]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Source column names `(x, y)`.
    #[inline]
    pub fn columns(&self) -> (&str, &str) {
        (&self.columns.0, &self.columns.1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points inside `bounds` (inclusive), plus their row indices in `self`.
    pub fn select_within(&self, bounds: &Bounds2) -> (PointSet, Vec<usize>) {
        let (rows, points): (Vec<usize>, Vec<Point2>) = self
            .points
            .iter()
            .enumerate()
            .filter(|(_, p)| bounds.contains(**p))
            .map(|(i, p)| (i, *p))
            .unzip();
        let subset = PointSet {
            columns: self.columns.clone(),
            points,
        };
        (subset, rows)
    }

    /// Row mask for `bounds`, aligned with the source rows.
    pub fn mask_within(&self, bounds: &Bounds2) -> Vec<bool> {
        self.points.iter().map(|p| bounds.contains(*p)).collect()
    }
}

/// Values of a numeric column as f64, failing on nulls and non-finite entries.
fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, LoadError> {
    let series = df.column(name).map_err(|_| LoadError::MissingColumn {
        column: name.to_string(),
    })?;
    if !series.dtype().is_numeric() {
        return Err(LoadError::NonNumericColumn {
            column: name.to_string(),
            dtype: series.dtype().to_string(),
        });
    }
    let cast = series.cast(&DataType::Float64)?;
    let ca = cast.f64()?;
    ca.into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(LoadError::MissingValue {
                column: name.to_string(),
                row,
            }),
        })
        .collect()
}
