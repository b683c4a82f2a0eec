//! Numeric normalization of raw metric cells

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::CellValue;

/// Formatting artifacts stripped before parsing
const STRIPPED: &[char] = &['$', '¥', ',', ' '];

/// Coerce a raw cell to a number
///
/// Currency symbols, thousands separators and spaces are removed first.
/// Anything that still fails to parse becomes zero; this is a lossy
/// default, not an error.
pub fn normalize_number(value: &CellValue) -> Decimal {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => parse_decimal(s).unwrap_or(Decimal::ZERO),
        CellValue::Date(_) | CellValue::Empty => Decimal::ZERO,
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.chars().filter(|c| !STRIPPED.contains(c)).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_strips_currency_and_separators() {
        assert_eq!(normalize_number(&text("$1,234.50")), Decimal::new(123450, 2));
        assert_eq!(normalize_number(&text("¥25")), Decimal::from(25));
        assert_eq!(normalize_number(&text(" 1 000 ")), Decimal::from(1000));
    }

    #[test]
    fn test_unparsable_becomes_zero() {
        assert_eq!(normalize_number(&text("N/A")), Decimal::ZERO);
        assert_eq!(normalize_number(&text("--")), Decimal::ZERO);
        assert_eq!(normalize_number(&CellValue::Empty), Decimal::ZERO);
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(normalize_number(&CellValue::Number(Decimal::new(5, 1))), Decimal::new(5, 1));
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(normalize_number(&text("1.5e3")), Decimal::from(1500));
    }

    #[test]
    fn test_idempotent() {
        for raw in ["$50.00", "¥1,000", "abc", "-3", "", "7"] {
            let once = normalize_number(&text(raw));
            let twice = normalize_number(&CellValue::Number(once));
            assert_eq!(once, twice, "not idempotent for {:?}", raw);
        }
    }
}
