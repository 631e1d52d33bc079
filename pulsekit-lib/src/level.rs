//! Helpers for parsing numeric arguments with metric suffixes and for
//! converting between linear and dB levels.

use thiserror::Error;

/// Error returned when a numeric argument cannot be parsed.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("invalid number \"{0}\"")]
    Invalid(String),
    #[error("number \"{0}\" is out of range")]
    OutOfRange(String),
}

/// Convert a dB value to linear gain.
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear gain to dB.
pub fn linear_to_db(value: f64) -> f64 {
    let v = value.max(f64::MIN_POSITIVE);
    20.0 * v.log10()
}

/// Parse a number with an optional metric suffix (`k`, `M`, `G`).
///
/// `"2048k"` is 2 048 000 and `"159.5M"` is 159 500 000. Lowercase `m` and
/// `g` are accepted as aliases of `M` and `G`.
pub fn parse_metric(value: &str) -> Result<f64, ParseError> {
    let trimmed = value.trim();
    let (number, scale) = match trimmed.chars().last() {
        Some('k') | Some('K') => (&trimmed[..trimmed.len() - 1], 1e3),
        Some('m') | Some('M') => (&trimmed[..trimmed.len() - 1], 1e6),
        Some('g') | Some('G') => (&trimmed[..trimmed.len() - 1], 1e9),
        _ => (trimmed, 1.0),
    };
    let parsed = number
        .trim()
        .parse::<f64>()
        .map_err(|_| ParseError::Invalid(value.to_string()))?;
    if !parsed.is_finite() {
        return Err(ParseError::Invalid(value.to_string()));
    }
    Ok(parsed * scale)
}

/// Parse a signed integer with an optional metric suffix.
pub fn parse_i32_metric(value: &str) -> Result<i32, ParseError> {
    let parsed = parse_metric(value)?.round();
    if parsed < f64::from(i32::MIN) || parsed > f64::from(i32::MAX) {
        return Err(ParseError::OutOfRange(value.to_string()));
    }
    Ok(parsed as i32)
}

/// Parse an unsigned integer with an optional metric suffix.
pub fn parse_u32_metric(value: &str) -> Result<u32, ParseError> {
    let parsed = parse_metric(value)?.round();
    if parsed < 0.0 || parsed > f64::from(u32::MAX) {
        return Err(ParseError::OutOfRange(value.to_string()));
    }
    Ok(parsed as u32)
}

/// Parse a byte count with an optional metric suffix (`256k` is 256 000).
pub fn parse_usize_metric(value: &str) -> Result<usize, ParseError> {
    let parsed = parse_metric(value)?.round();
    if parsed < 0.0 || parsed > usize::MAX as f64 {
        return Err(ParseError::OutOfRange(value.to_string()));
    }
    Ok(parsed as usize)
}

/// Parse a level given either in dBFS or as a linear amplitude multiplier.
///
/// A `db` suffix (`"-6db"`, `"3 dB"`) is always read as dBFS. Without a suffix
/// a negative value is read as dBFS attenuation and anything else as a plain
/// multiplier, so `"1"` stays exactly `1.0`.
pub fn parse_level(value: &str) -> Result<f64, ParseError> {
    if let Some(db) = parse_db_suffix(value) {
        return Ok(db_to_linear(db));
    }
    let parsed = parse_metric(value)?;
    if parsed < 0.0 {
        Ok(db_to_linear(parsed))
    } else {
        Ok(parsed)
    }
}

fn parse_db_suffix(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    let db_part = lower.strip_suffix("db")?;
    db_part.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_suffixes_scale() {
        assert_eq!(parse_metric("2048k").unwrap(), 2_048_000.0);
        assert_eq!(parse_metric("159.5M").unwrap(), 159_500_000.0);
        assert_eq!(parse_metric("1G").unwrap(), 1e9);
        assert_eq!(parse_metric("14").unwrap(), 14.0);
        assert_eq!(parse_metric("-20").unwrap(), -20.0);
    }

    #[test]
    fn integer_helpers_reject_garbage_and_range() {
        assert_eq!(parse_i32_metric("159M").unwrap(), 159_000_000);
        assert_eq!(parse_u32_metric("4000").unwrap(), 4000);
        assert_eq!(parse_usize_metric("256k").unwrap(), 256_000);
        assert!(matches!(parse_u32_metric("-1"), Err(ParseError::OutOfRange(_))));
        assert!(matches!(parse_i32_metric("3G"), Err(ParseError::OutOfRange(_))));
        assert!(matches!(parse_metric("abc"), Err(ParseError::Invalid(_))));
        assert!(matches!(parse_metric(""), Err(ParseError::Invalid(_))));
    }

    #[test]
    fn level_accepts_db_and_multiplier() {
        assert_eq!(parse_level("1").unwrap(), 1.0);
        assert_eq!(parse_level("0db").unwrap(), 1.0);
        assert_eq!(parse_level("0.25").unwrap(), 0.25);
        let attenuated = parse_level("-20").unwrap();
        assert!((attenuated - 0.1).abs() < 1e-12);
        let suffixed = parse_level("-20dB").unwrap();
        assert!((suffixed - 0.1).abs() < 1e-12);
    }

    #[test]
    fn db_round_trip_is_close() {
        let db = linear_to_db(db_to_linear(-6.0));
        assert!((db + 6.0).abs() < 1e-9);
    }
}
