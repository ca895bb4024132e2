//! Query templates with named placeholders.
//!
//! Syntax: `{name}` is a placeholder (`name` = ASCII letter or `_`, then
//! letters, digits, `_`); `{{` and `}}` are literal braces. Everything else is
//! copied verbatim. Values are substituted as-is, so numerals must already be
//! formatted (see `format_coord`).

use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;

use super::numeral::{format_coord, FormatError};

/// Characters a substituted value may not carry into the query text.
pub const RESERVED: &[char] = &['[', ']', '{', '}', '\'', '"'];

/// Candidate selection: sky-position polygon, proper-motion polygon,
/// parallax cut, and colour window.
pub const CANDIDATE_QUERY: &str = "SELECT
{columns}
FROM {table}
WHERE parallax < {parallax_max}
  AND bp_rp BETWEEN {bp_rp_min} AND {bp_rp_max}
  AND 1 = CONTAINS(POINT(ra, dec),
                   POLYGON({sky_point_list}))
  AND 1 = CONTAINS(POINT(pmra, pmdec),
                   POLYGON({pm_point_list}))
";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template is malformed at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },
    #[error("no value for template parameter `{name}`")]
    MissingParameter { name: String },
    #[error("value for `{name}` contains reserved character {ch:?}")]
    ReservedCharacter { name: String, ch: char },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Parsed template: literal text interleaved with named parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryTemplate {
    segments: Vec<Segment>,
}

impl QueryTemplate {
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(TemplateError::Malformed {
                        offset,
                        reason: "unmatched `}`",
                    })
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, ch)) if is_name_char(ch, name.is_empty()) => name.push(ch),
                            Some(_) => {
                                return Err(TemplateError::Malformed {
                                    offset,
                                    reason: "invalid parameter name",
                                })
                            }
                            None => {
                                return Err(TemplateError::Malformed {
                                    offset,
                                    reason: "unterminated `{`",
                                })
                            }
                        }
                    }
                    if name.is_empty() {
                        return Err(TemplateError::Malformed {
                            offset,
                            reason: "empty parameter name",
                        });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Param(name));
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Parameter names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for s in &self.segments {
            if let Segment::Param(name) = s {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
        }
        out
    }

    /// Substitute every placeholder. Unused parameters are ignored.
    pub fn render(&self, params: &QueryParams) -> Result<String, TemplateError> {
        let mut out = String::new();
        for s in &self.segments {
            match s {
                Segment::Literal(text) => out.push_str(text),
                Segment::Param(name) => {
                    let value =
                        params
                            .get(name)
                            .ok_or_else(|| TemplateError::MissingParameter {
                                name: name.clone(),
                            })?;
                    if let Some(ch) = value.chars().find(|c| RESERVED.contains(c)) {
                        return Err(TemplateError::ReservedCharacter {
                            name: name.clone(),
                            ch,
                        });
                    }
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl FromStr for QueryTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[inline]
fn is_name_char(ch: char, first: bool) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || (!first && ch.is_ascii_digit())
}

/// Named values for template substitution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a textual value (column lists, table names, polygon strings).
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Set a numeric value using the canonical numeral format.
    pub fn set_number(&mut self, name: impl Into<String>, value: f64) -> Result<&mut Self, FormatError> {
        let numeral = format_coord(value)?;
        Ok(self.set(name, numeral))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Parse `template` and substitute `params`.
pub fn assemble_query(template: &str, params: &QueryParams) -> Result<String, TemplateError> {
    QueryTemplate::parse(template)?.render(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_named_parameters() {
        let mut params = QueryParams::new();
        params.set("polygon", "0.0,0.0,0.0,1.0,1.0,1.0");
        let q = assemble_query("SELECT * WHERE 1 = CONTAINS(POINT(ra, dec), POLYGON({polygon}))", &params)
            .unwrap();
        assert_eq!(
            q,
            "SELECT * WHERE 1 = CONTAINS(POINT(ra, dec), POLYGON(0.0,0.0,0.0,1.0,1.0,1.0))"
        );
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let err = assemble_query("POLYGON({polygon})", &QueryParams::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingParameter {
                name: "polygon".to_string()
            }
        );
    }

    #[test]
    fn escaped_braces_and_repeats() {
        let t = QueryTemplate::parse("{{{a}}} {b} {a}").unwrap();
        assert_eq!(t.placeholders(), vec!["a", "b"]);
        let mut params = QueryParams::new();
        params.set("a", "1").set("b", "2").set("unused", "3");
        assert_eq!(t.render(&params).unwrap(), "{1} 2 1");
    }

    #[test]
    fn malformed_templates_rejected() {
        for bad in ["POLYGON({polygon)", "x } y", "{}", "{1abc}", "{a b}"] {
            assert!(
                matches!(
                    QueryTemplate::parse(bad),
                    Err(TemplateError::Malformed { .. })
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn reserved_characters_never_reach_query() {
        let mut params = QueryParams::new();
        params.set("polygon", "[1.0, 2.0]");
        let err = assemble_query("POLYGON({polygon})", &params).unwrap_err();
        assert_eq!(
            err,
            TemplateError::ReservedCharacter {
                name: "polygon".to_string(),
                ch: '['
            }
        );
    }

    #[test]
    fn numbers_use_canonical_numerals() {
        let mut params = QueryParams::new();
        params.set_number("parallax_max", 1.0).unwrap();
        params.set_number("bp_rp_min", -0.75).unwrap();
        assert_eq!(params.get("parallax_max"), Some("1.0"));
        assert_eq!(params.get("bp_rp_min"), Some("-0.75"));
        assert!(params.set_number("bad", f64::NAN).is_err());
    }

    #[test]
    fn candidate_query_placeholders() {
        let t: QueryTemplate = CANDIDATE_QUERY.parse().unwrap();
        assert_eq!(
            t.placeholders(),
            vec![
                "columns",
                "table",
                "parallax_max",
                "bp_rp_min",
                "bp_rp_max",
                "sky_point_list",
                "pm_point_list"
            ]
        );
    }
}
