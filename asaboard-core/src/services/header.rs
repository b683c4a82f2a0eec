//! Header row detection
//!
//! Exports may carry title and filter-summary rows above the real header.
//! The locator scans the first rows of a headerless grid for marker
//! keywords and reports where the header lives.

use serde::{Deserialize, Serialize};

use crate::domain::RawGrid;

/// Default number of leading rows scanned
pub const DEFAULT_SCAN_ROWS: usize = 20;

/// Default bilingual marker keywords
pub const DEFAULT_MARKERS: &[&str] = &["广告", "Campaign", "日期", "Date"];

/// Where the header sits relative to the row that matched a marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderOffset {
    /// The matched row is the header itself
    #[default]
    MatchedRow,
    /// The matched row is a label row directly above the header
    FollowingRow,
}

impl std::str::FromStr for HeaderOffset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "matched" | "matchedrow" => Ok(HeaderOffset::MatchedRow),
            "following" | "followingrow" | "next" => Ok(HeaderOffset::FollowingRow),
            other => Err(format!("Unknown header offset: {}", other)),
        }
    }
}

/// Scans leading rows for header marker keywords
#[derive(Debug, Clone)]
pub struct HeaderLocator {
    scan_rows: usize,
    markers: Vec<String>,
    offset: HeaderOffset,
}

impl Default for HeaderLocator {
    fn default() -> Self {
        Self::new(
            DEFAULT_SCAN_ROWS,
            DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
            HeaderOffset::default(),
        )
    }
}

impl HeaderLocator {
    pub fn new(scan_rows: usize, markers: Vec<String>, offset: HeaderOffset) -> Self {
        Self {
            scan_rows,
            markers,
            offset,
        }
    }

    /// Index of the first scanned row containing any marker
    ///
    /// A row matches when its cells, joined with spaces, contain a marker.
    /// `None` is a normal outcome meaning the default header applies.
    pub fn locate(&self, grid: &RawGrid) -> Option<usize> {
        grid.rows().iter().take(self.scan_rows).position(|row| {
            let joined = row
                .iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            self.markers.iter().any(|m| joined.contains(m.as_str()))
        })
    }

    /// Physical row to treat as the header
    ///
    /// A match at row 0 (or no match) keeps the default header, the first
    /// physical row. Otherwise the configured offset decides.
    pub fn header_line(&self, grid: &RawGrid) -> usize {
        match self.locate(grid) {
            None | Some(0) => 0,
            Some(found) => match self.offset {
                HeaderOffset::MatchedRow => found,
                HeaderOffset::FollowingRow => found + 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellValue;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        RawGrid::new(
            rows.iter()
                .map(|r| r.iter().map(|c| CellValue::text(*c)).collect())
                .collect(),
        )
    }

    fn with_metadata() -> RawGrid {
        grid(&[
            &["Report: Search Results"],
            &["Time Zone: UTC"],
            &["Currency: USD"],
            &["Campaign Name", "Day", "Installs", "Spend"],
            &["US_A", "2024-01-01", "10", "5"],
        ])
    }

    #[test]
    fn test_locates_header_after_metadata() {
        let locator = HeaderLocator::default();
        assert_eq!(locator.locate(&with_metadata()), Some(3));
        assert_eq!(locator.header_line(&with_metadata()), 3);
    }

    #[test]
    fn test_following_row_offset() {
        let locator = HeaderLocator::new(20, vec!["Campaign".to_string()], HeaderOffset::FollowingRow);
        assert_eq!(locator.locate(&with_metadata()), Some(3));
        assert_eq!(locator.header_line(&with_metadata()), 4);
    }

    #[test]
    fn test_match_on_first_row_keeps_default() {
        let g = grid(&[&["日期", "广告名称"], &["2024-01-01", "US_A"]]);
        let locator = HeaderLocator::new(20, vec!["日期".to_string()], HeaderOffset::FollowingRow);
        assert_eq!(locator.locate(&g), Some(0));
        assert_eq!(locator.header_line(&g), 0);
    }

    #[test]
    fn test_no_match_within_window() {
        let noise: &[&str] = &["noise"];
        let header: &[&str] = &["Campaign Name"];
        let mut rows = vec![noise; 25];
        rows.push(header);
        let locator = HeaderLocator::default();
        assert_eq!(locator.locate(&grid(&rows)), None);
        assert_eq!(locator.header_line(&grid(&rows)), 0);
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!("following-row".parse::<HeaderOffset>(), Ok(HeaderOffset::FollowingRow));
        assert_eq!("matchedRow".parse::<HeaderOffset>(), Ok(HeaderOffset::MatchedRow));
        assert!("above".parse::<HeaderOffset>().is_err());
    }
}
