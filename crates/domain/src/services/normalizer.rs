//! Header and value normalization.
//!
//! The first stage of the pipeline: source files arrive with arbitrary
//! casing, padding and punctuation in their column names ("Email Address",
//! " EMAIL ", "e-mail"). Normalization makes the rest of the pipeline see
//! one spelling per column. Total function: any input map, including an
//! empty one, normalizes successfully.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::import::RawRow;

lazy_static! {
    /// Runs of anything that is not a lower-case letter or digit.
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").expect("valid regex");
}

/// Normalize one column header: lower-case, collapse non-alphanumeric runs
/// to a single underscore, strip leading/trailing underscores.
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Normalize a whole row: headers canonicalized, values trimmed.
///
/// When two raw headers collapse to the same normalized key ("Email" and
/// "E-Mail"), the first non-empty value wins. Missing values become empty
/// strings, never nulls.
pub fn normalize_row(raw: &RawRow) -> RawRow {
    let mut normalized = RawRow::new();
    for (key, value) in raw {
        let norm_key = normalize_header(key);
        if norm_key.is_empty() {
            continue;
        }
        let norm_value = value.trim().to_string();
        match normalized.get(&norm_key) {
            Some(existing) if !existing.is_empty() => {}
            _ => {
                normalized.insert(norm_key, norm_value);
            }
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_header_basic() {
        assert_eq!(normalize_header("Email Address"), "email_address");
        assert_eq!(normalize_header("  First Name  "), "first_name");
        assert_eq!(normalize_header("email"), "email");
    }

    #[test]
    fn test_normalize_header_punctuation_runs() {
        assert_eq!(normalize_header("Member #"), "member");
        assert_eq!(normalize_header("D.O.B."), "d_o_b");
        assert_eq!(normalize_header("Plan -- Name"), "plan_name");
        assert_eq!(normalize_header("__status__"), "status");
    }

    #[test]
    fn test_normalize_header_empty_and_symbols() {
        assert_eq!(normalize_header(""), "");
        assert_eq!(normalize_header("###"), "");
    }

    #[test]
    fn test_normalize_row_trims_values() {
        let normalized = normalize_row(&row(&[("First Name", "  Jane "), ("City", "")]));
        assert_eq!(normalized.get("first_name").unwrap(), "Jane");
        assert_eq!(normalized.get("city").unwrap(), "");
    }

    #[test]
    fn test_normalize_row_idempotent() {
        let input = row(&[
            ("Email Address", " JANE@X.COM "),
            ("Member #", "M-100"),
            ("  Plan Name ", "Gold"),
        ]);
        let once = normalize_row(&input);
        let twice = normalize_row(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_row_colliding_headers_first_nonempty_wins() {
        let mut input = RawRow::new();
        input.insert("E-Mail".to_string(), "".to_string());
        input.insert("Email".to_string(), "a@b.com".to_string());
        let normalized = normalize_row(&input);
        assert_eq!(normalized.get("email").unwrap(), "a@b.com");
    }

    #[test]
    fn test_normalize_row_empty_input() {
        assert!(normalize_row(&RawRow::new()).is_empty());
    }

    #[test]
    fn test_normalize_row_drops_unusable_headers() {
        let normalized = normalize_row(&row(&[("###", "x"), ("ok", "y")]));
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.get("ok").unwrap(), "y");
    }
}
