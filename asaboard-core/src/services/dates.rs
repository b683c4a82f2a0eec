//! Date parsing for export date columns

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::domain::CellValue;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y年%m月%d日",
    "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse a raw cell as a calendar date
///
/// Returns `None` for anything that is not recognisably a date, including
/// summary rows such as "Total"; callers drop those rows.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(date) => Some(*date),
        CellValue::Text(s) => parse_date_str(s),
        CellValue::Number(_) | CellValue::Empty => None,
    }
}

pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_common_formats() {
        assert_eq!(parse_date_str("2024-01-05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_str("2024/1/5"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_str("01/05/2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_str("25/01/2024"), Some(ymd(2024, 1, 25)));
        assert_eq!(parse_date_str("2024年1月5日"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_str("20240105"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_datetimes_keep_the_date() {
        assert_eq!(parse_date_str("2024-01-05 00:00:00"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_str("2024-01-05T13:45:00Z"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_non_dates() {
        assert_eq!(parse_date_str("Total"), None);
        assert_eq!(parse_date_str("合计"), None);
        assert_eq!(parse_date_str(""), None);
        assert_eq!(parse_date_str("2024.01.05"), None);
        assert_eq!(parse_date_str("Jan 05, 2024"), None);
        assert_eq!(parse_date(&CellValue::from(45000)), None);
    }

    #[test]
    fn test_native_date_cell() {
        assert_eq!(parse_date(&CellValue::Date(ymd(2024, 2, 29))), Some(ymd(2024, 2, 29)));
    }
}
