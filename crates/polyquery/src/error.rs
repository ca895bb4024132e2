//! Crate-level error aggregating the per-stage errors.

use thiserror::Error;

use crate::geom2::HullError;
use crate::points::LoadError;
use crate::query::{FormatError, TemplateError};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Hull(#[from] HullError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("row mask has {got} entries for {expected} points")]
    MaskLength { expected: usize, got: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
