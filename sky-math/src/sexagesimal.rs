//! Parsing of user-entered sky coordinates.
//!
//! Screens accept either decimal degrees or colon-separated sexagesimal text
//! (`HH:MM[:SS.s]` for right ascension, `±DD:MM[:SS.s]` for declination) and
//! convert to decimal degrees before calling the astrometric core.

use thiserror::Error;

use crate::spherical::normalize_ra;

/// Errors that can occur while parsing a coordinate string
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AngleError {
    #[error("Malformed {context}: {raw:?}")]
    MalformedValue { context: &'static str, raw: String },
}

impl AngleError {
    fn malformed(context: &'static str, raw: &str) -> Self {
        AngleError::MalformedValue {
            context,
            raw: raw.to_string(),
        }
    }
}

/// Parse a right ascension into decimal degrees.
///
/// Plain decimal input is taken as degrees. Sexagesimal input is read as
/// hours and converted (×15). Either way the result is normalized into
/// [0, 360).
///
/// # Errors
/// * `AngleError::MalformedValue` - empty or negative input, fewer than two
///   fields, a non-numeric field, or minutes/seconds outside [0, 60)
pub fn parse_ra_deg(text: &str) -> Result<f64, AngleError> {
    const CONTEXT: &str = "right ascension";

    let t = text.trim();
    if t.is_empty() || t.starts_with('-') {
        return Err(AngleError::malformed(CONTEXT, text));
    }
    let deg = match t.parse::<f64>() {
        Ok(deg) => deg,
        Err(_) => split_fields(t).ok_or_else(|| AngleError::malformed(CONTEXT, text))? * 15.0,
    };
    if !deg.is_finite() {
        return Err(AngleError::malformed(CONTEXT, text));
    }
    Ok(normalize_ra(deg))
}

/// Parse a declination into decimal degrees.
///
/// Plain decimal input is taken as degrees. For sexagesimal input the sign
/// is taken from a leading `-` and applies to the whole value, so
/// `-00:30:00` is −0.5°.
///
/// # Errors
/// * `AngleError::MalformedValue` - same conditions as [`parse_ra_deg`]
///   (except the sign), plus a magnitude above 90°
pub fn parse_dec_deg(text: &str) -> Result<f64, AngleError> {
    const CONTEXT: &str = "declination";

    let t = text.trim();
    if t.is_empty() {
        return Err(AngleError::malformed(CONTEXT, text));
    }
    let deg = match t.parse::<f64>() {
        Ok(deg) => deg,
        Err(_) => {
            let (sign, unsigned) = match t.strip_prefix('-') {
                Some(rest) => (-1.0, rest),
                None => (1.0, t.strip_prefix('+').unwrap_or(t)),
            };
            let magnitude =
                split_fields(unsigned).ok_or_else(|| AngleError::malformed(CONTEXT, text))?;
            if magnitude < 0.0 {
                return Err(AngleError::malformed(CONTEXT, text));
            }
            sign * magnitude
        }
    };
    if !(-90.0..=90.0).contains(&deg) {
        return Err(AngleError::malformed(CONTEXT, text));
    }
    Ok(deg)
}

/// Combine `A:B[:C]` into `A + B/60 + C/3600`.
fn split_fields(text: &str) -> Option<f64> {
    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let whole: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts[1].parse().ok()?;
    let seconds: f64 = match parts.get(2) {
        Some(s) => s.parse().ok()?,
        None => 0.0,
    };

    let in_range = |v: f64| (0.0..60.0).contains(&v);
    if !whole.is_finite() || !in_range(minutes) || !in_range(seconds) {
        return None;
    }

    Some(whole + minutes / 60.0 + seconds / 3600.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case("10:00:00", 150.0)]
    #[case("10:00", 150.0)]
    #[case("00:00:01", 15.0 / 3600.0)]
    #[case(" 23:59:59.9 ", 359.999_583_333_333_3)]
    #[case("12:30:00", 187.5)]
    #[case("24:00:00", 0.0)]
    fn test_parse_ra_sexagesimal(#[case] text: &str, #[case] expected: f64) {
        assert_relative_eq!(parse_ra_deg(text).unwrap(), expected, epsilon = 1e-9);
    }

    #[rstest]
    #[case("150.25", 150.25)]
    #[case("  83.633 ", 83.633)]
    #[case("0", 0.0)]
    #[case("360", 0.0)]
    #[case("400.5", 40.5)]
    fn test_parse_ra_decimal_normalized(#[case] text: &str, #[case] expected: f64) {
        assert_relative_eq!(parse_ra_deg(text).unwrap(), expected, epsilon = 1e-12);
    }

    #[rstest]
    #[case("+02:30:00", 2.5)]
    #[case("-02:30:00", -2.5)]
    #[case("-00:30:00", -0.5)]
    #[case("45:00", 45.0)]
    #[case("-89:59:59.5", -(89.0 + 59.0 / 60.0 + 59.5 / 3600.0))]
    fn test_parse_dec_sexagesimal(#[case] text: &str, #[case] expected: f64) {
        assert_relative_eq!(parse_dec_deg(text).unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_dec_decimal_passthrough() {
        assert_eq!(parse_dec_deg("-12.5").unwrap(), -12.5);
        assert_eq!(parse_dec_deg("90").unwrap(), 90.0);
        assert_eq!(parse_dec_deg("-90.0").unwrap(), -90.0);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("10:")]
    #[case("10:xx:00")]
    #[case("10:61:00")]
    #[case("1:2:3:4")]
    #[case("-01:00:00")]
    #[case("-00:30:00")]
    #[case("-10.5")]
    #[case("inf")]
    #[case("nan")]
    fn test_parse_ra_rejects(#[case] text: &str) {
        let err = parse_ra_deg(text).unwrap_err();
        assert!(matches!(err, AngleError::MalformedValue { context: "right ascension", .. }));
    }

    #[rstest]
    #[case("")]
    #[case("91:00:00")]
    #[case("+ab:00")]
    #[case("-89:59:60")]
    #[case("95")]
    #[case("-90.5")]
    #[case("95:00")]
    #[case("nan")]
    fn test_parse_dec_rejects(#[case] text: &str) {
        assert!(parse_dec_deg(text).is_err());
    }

    #[test]
    fn test_error_carries_raw_text() {
        let err = parse_dec_deg("north").unwrap_err();
        assert_eq!(
            err,
            AngleError::MalformedValue {
                context: "declination",
                raw: "north".to_string()
            }
        );
        assert_eq!(err.to_string(), "Malformed declination: \"north\"");
    }
}
