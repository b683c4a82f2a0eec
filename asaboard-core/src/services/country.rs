//! Country code heuristic for campaign names
//!
//! Campaigns are conventionally named `<CC>_<rest>`; there is no validation
//! against a real country list and false positives are accepted.

use crate::domain::CellValue;

/// Code returned for non-text campaign names
pub const UNKNOWN_COUNTRY: &str = "Unknown";

const DELIMITERS: &[char] = &['_', ' ', '-'];

/// Derive a two-letter country code from a campaign name cell
///
/// Surrounding whitespace is ignored, matching the stored campaign name.
pub fn extract_country(value: &CellValue) -> String {
    match value {
        CellValue::Text(name) => country_from_name(name.trim()),
        _ => UNKNOWN_COUNTRY.to_string(),
    }
}

/// Derive a country code from a campaign name
///
/// Uses the first delimited segment when it is exactly two characters,
/// otherwise the first two characters of the whole name.
pub fn country_from_name(name: &str) -> String {
    let first = name.split(DELIMITERS).next().unwrap_or_default();
    if first.chars().count() == 2 {
        return first.to_uppercase();
    }
    name.chars().take(2).collect::<String>().to_uppercase()
}
