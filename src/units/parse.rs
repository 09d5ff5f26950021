//! Permissive parsing of `<number><suffix>` magnitude strings
//!
//! Parsing never fails. A string that does not start with a number scans as
//! zero, and a trailing character that is not one of `kKmMgG` leaves the
//! number unscaled.

use crate::units::scale::{Base, ScaleLevel};

/// Outcome of scanning a magnitude string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnitude {
    /// Scaled value
    pub value: f64,
    /// Whether a numeric prefix was found at all
    pub number_found: bool,
    /// Suffix that scaled the value, if one was recognized
    pub suffix: Option<ScaleLevel>,
}

/// Scan `s` as a float optionally followed by a one-character suffix
pub fn scan_magnitude(s: &str, base: Base) -> Magnitude {
    let trimmed = s.trim_start();
    let len = float_prefix_len(trimmed);
    let number = trimmed[..len].parse::<f64>().ok();

    let suffix = number
        .and_then(|_| trimmed[len..].chars().next())
        .and_then(ScaleLevel::from_suffix);

    let raw = number.unwrap_or(0.0);
    let value = match suffix {
        Some(level) => raw * base.multiplier(level),
        None => raw,
    };

    Magnitude {
        value,
        number_found: number.is_some(),
        suffix,
    }
}

/// Parse a size with binary (1024-based) suffixes
pub fn parse_magnitude(s: &str) -> f64 {
    scan_magnitude(s, Base::Binary).value
}

/// Parse a rate with decimal (1000-based) suffixes
pub fn parse_magnitude_rate(s: &str) -> f64 {
    scan_magnitude(s, Base::Decimal).value
}

/// Binary-suffixed parse truncated toward zero.
///
/// Negative and NaN inputs saturate to 0, as the float-to-int cast does.
pub fn parse_magnitude_int(s: &str) -> u64 {
    parse_magnitude(s) as u64
}

/// Length in bytes of the longest leading float literal in `s`
fn float_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        i = j;
    }

    if digits == 0 {
        return 0;
    }

    // Exponent only counts when at least one digit follows it
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}
