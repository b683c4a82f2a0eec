//! Raw tabular data before any normalization

use super::cell::CellValue;

/// Rows read with no assumed header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<CellValue>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reinterpret the grid with physical row `header_line` as the header
    ///
    /// Rows above the header are discarded. Labels are whitespace-trimmed.
    /// Data rows wider than the header are skipped as malformed, narrower
    /// ones are padded with empty cells.
    pub fn with_header(&self, header_line: usize) -> RawTable {
        let Some(header) = self.rows.get(header_line) else {
            return RawTable::default();
        };

        let columns: Vec<String> = header
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut skipped = 0;
        for row in &self.rows[header_line + 1..] {
            if row.len() > width {
                // Tolerate trailing empty cells (trailing delimiters, ragged sheets)
                if row[width..].iter().all(CellValue::is_empty) {
                    rows.push(row[..width].to_vec());
                } else {
                    skipped += 1;
                }
                continue;
            }
            let mut row = row.clone();
            row.resize(width, CellValue::Empty);
            rows.push(row);
        }

        RawTable {
            columns,
            rows,
            skipped_rows: skipped,
        }
    }
}

/// Rows keyed positionally by (possibly duplicated) column labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    skipped_rows: usize,
}

impl RawTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Rows dropped for having more fields than the header
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::text(*c)).collect()
    }

    #[test]
    fn test_with_header_trims_labels() {
        let grid = RawGrid::new(vec![row(&[" Date ", "Campaign Name  "]), row(&["2024-01-01", "US_A"])]);
        let table = grid.with_header(0);
        assert_eq!(table.columns(), &["Date".to_string(), "Campaign Name".to_string()]);
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn test_with_header_drops_rows_above_header() {
        let grid = RawGrid::new(vec![
            row(&["Report"]),
            row(&["Date", "Campaign"]),
            row(&["2024-01-01", "US_A"]),
        ]);
        let table = grid.with_header(1);
        assert_eq!(table.columns()[0], "Date");
        assert_eq!(table.rows(), &[row(&["2024-01-01", "US_A"])]);
    }

    #[test]
    fn test_ragged_rows() {
        let grid = RawGrid::new(vec![
            row(&["Date", "Campaign", "Installs"]),
            row(&["2024-01-01"]),
            row(&["2024-01-02", "US_A", "3", "extra"]),
            row(&["2024-01-03", "US_B", "4", ""]),
        ]);
        let table = grid.with_header(0);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0][2], CellValue::Empty);
        assert_eq!(table.skipped_rows(), 1);
    }

    #[test]
    fn test_header_beyond_grid_is_empty() {
        let grid = RawGrid::new(vec![row(&["Date"])]);
        assert!(grid.with_header(5).columns().is_empty());
    }
}
