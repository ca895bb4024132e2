//! Canonical numerals and polygon strings.
//!
//! Numeral format: shortest decimal that round-trips to the same `f64`,
//! written positionally (never in exponent form) and always carrying a decimal
//! point. Negative zero is written as `0.0`. Non-finite values have no numeral.

use thiserror::Error;

use crate::geom2::Point2;

#[derive(Clone, Debug, Error)]
pub enum FormatError {
    #[error("value {value} has no decimal numeral")]
    NonFinite { value: f64 },
    #[error("polygon has no points")]
    Empty,
}

/// Canonical locale-invariant numeral for `v`, e.g. `-2.0`, `4.25`, `0.0000001`.
pub fn format_coord(v: f64) -> Result<String, FormatError> {
    if !v.is_finite() {
        return Err(FormatError::NonFinite { value: v });
    }
    // -0.0 == 0.0; fold the sign away.
    let v = if v == 0.0 { 0.0 } else { v };
    let mut s = v.to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    Ok(s)
}

/// Flatten points to `x0,y0,x1,y1,...` with no brackets and no trailing separator.
///
/// Point order is preserved as given; closed rings keep their repeated corner.
pub fn serialize_polygon(points: &[Point2]) -> Result<String, FormatError> {
    if points.is_empty() {
        return Err(FormatError::Empty);
    }
    let mut parts = Vec::with_capacity(2 * points.len());
    for p in points {
        parts.push(format_coord(p.x)?);
        parts.push(format_coord(p.y)?);
    }
    Ok(parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom2::rectangle_from_bounds;
    use nalgebra::vector;

    #[test]
    fn numerals_are_plain_decimals() {
        assert_eq!(format_coord(1.5).unwrap(), "1.5");
        assert_eq!(format_coord(-2.0).unwrap(), "-2.0");
        assert_eq!(format_coord(4.25).unwrap(), "4.25");
        assert_eq!(format_coord(-0.0).unwrap(), "0.0");
        assert_eq!(format_coord(1e-7).unwrap(), "0.0000001");
        assert_eq!(format_coord(1e20).unwrap(), "100000000000000000000.0");
        assert_eq!(format_coord(-6.921_372_5).unwrap(), "-6.9213725");
    }

    #[test]
    fn numerals_round_trip() {
        for v in [0.1, -135.77712345678, 2.0 / 3.0, 1.0e-12, 359.999_999_999] {
            let s = format_coord(v).unwrap();
            assert_eq!(s.parse::<f64>().unwrap(), v);
        }
    }

    #[test]
    fn non_finite_has_no_numeral() {
        assert!(matches!(
            format_coord(f64::NAN),
            Err(FormatError::NonFinite { .. })
        ));
        assert!(matches!(
            format_coord(f64::NEG_INFINITY),
            Err(FormatError::NonFinite { .. })
        ));
    }

    #[test]
    fn polygon_string_flattens_in_order() {
        let s = serialize_polygon(&[vector![1.5, -2.0], vector![3.0, 4.25]]).unwrap();
        assert_eq!(s, "1.5,-2.0,3.0,4.25");
    }

    #[test]
    fn rectangle_ring_serializes_closed() {
        let s = serialize_polygon(&rectangle_from_bounds(0.0, 1.0, 0.0, 1.0)).unwrap();
        assert_eq!(s, "0.0,0.0,0.0,1.0,1.0,1.0,1.0,0.0,0.0,0.0");
    }

    #[test]
    fn empty_or_non_finite_polygon_rejected() {
        assert!(matches!(serialize_polygon(&[]), Err(FormatError::Empty)));
        assert!(matches!(
            serialize_polygon(&[vector![1.0, f64::INFINITY]]),
            Err(FormatError::NonFinite { .. })
        ));
    }
}
