//! Spreadsheet reader (xlsx, xlsm, xlsb, xls, ods) backed by calamine

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{CellValue, RawGrid};
use crate::ports::{DecodedGrid, GridReader};

/// Spreadsheet implementation of the grid reader port. First sheet only.
#[derive(Debug, Default)]
pub struct SpreadsheetGridReader;

impl GridReader for SpreadsheetGridReader {
    fn read_grid(&self, bytes: &[u8]) -> Result<DecodedGrid> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| Error::unreadable(format!("Failed to open spreadsheet: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::unreadable("Spreadsheet has no sheets"))?
            .map_err(|e| Error::unreadable(format!("Failed to read first sheet: {}", e)))?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();

        Ok(DecodedGrid {
            grid: RawGrid::new(rows),
            encoding: None,
        })
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Int(i) => CellValue::Number(Decimal::from(*i)),
        Data::Float(f) => Decimal::from_f64(*f)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Empty),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::text(cell.to_string())),
        Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let err = SpreadsheetGridReader.read_grid(b"definitely not a workbook").unwrap_err();
        assert_eq!(err.code(), "unreadable_file");
    }

    #[test]
    fn test_convert_cells() {
        assert_eq!(convert_cell(&Data::Int(7)), CellValue::Number(Decimal::from(7)));
        assert_eq!(convert_cell(&Data::Float(2.5)), CellValue::Number(Decimal::new(25, 1)));
        assert_eq!(convert_cell(&Data::String("  ".to_string())), CellValue::Empty);
        assert_eq!(convert_cell(&Data::String("US_A".to_string())), CellValue::text("US_A"));
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_convert_iso_date_cell() {
        let cell = Data::DateTimeIso("2024-01-02T00:00:00".to_string());
        assert_eq!(
            convert_cell(&cell),
            CellValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }
}
