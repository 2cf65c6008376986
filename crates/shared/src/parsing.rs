//! Value parsing for imported field data.
//!
//! Vendor exports are inconsistent about formats; these helpers accept the
//! variants seen in the wild and produce canonical representations. Parsers
//! return `Option` rather than errors so callers decide whether a missing
//! value is tolerable.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Everything that is not part of a decimal number.
    static ref NON_NUMERIC: Regex = Regex::new(r"[^0-9.\-]").expect("valid regex");
}

/// Date formats accepted from import sources, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%m-%d-%Y"];

/// Parse a date in ISO, US slash, or US dash format.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Parse a number, stripping currency symbols, commas and other noise.
///
/// Returns `None` when nothing numeric remains after stripping.
pub fn parse_number(value: &str) -> Option<f64> {
    let stripped = NON_NUMERIC.replace_all(value.trim(), "");
    if stripped.is_empty() || stripped == "-" || stripped == "." {
        return None;
    }
    stripped.parse::<f64>().ok()
}

/// Canonical email form: trimmed and lower-cased.
pub fn canonical_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Canonical phone form: digits only, with a leading US country code removed.
pub fn phone_digits(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    }
}
