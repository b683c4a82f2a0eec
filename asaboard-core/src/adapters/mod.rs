//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - csv + encoding_rs for CSV exports (with encoding fallback)
//! - calamine for spreadsheet exports

pub mod csv;
pub mod spreadsheet;

pub use self::csv::CsvGridReader;
pub use self::spreadsheet::SpreadsheetGridReader;
