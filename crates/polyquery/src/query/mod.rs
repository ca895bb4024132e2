//! Polygon strings and query assembly.
//!
//! - `numeral`: canonical coordinate numerals and `serialize_polygon`.
//! - `template`: `{name}` templates, parameters, and the candidate query.

mod numeral;
mod template;

pub use numeral::{format_coord, serialize_polygon, FormatError};
pub use template::{
    assemble_query, QueryParams, QueryTemplate, TemplateError, CANDIDATE_QUERY, RESERVED,
};
