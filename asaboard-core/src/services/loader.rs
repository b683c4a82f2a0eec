//! Table Loader - raw upload to canonical table
//!
//! A load is all-or-nothing: either a fully cleaned `CanonicalTable` comes
//! back, or a structured error. The loader holds no state between calls,
//! so the same bytes always produce the same table.

use rust_decimal::Decimal;

use crate::adapters::{CsvGridReader, SpreadsheetGridReader};
use crate::domain::result::{Error, Result};
use crate::domain::{
    CanonicalRecord, CanonicalTable, CellValue, ColumnRole, CostMetric, LoadProvenance,
    MetricVariant, SourceFile, SourceFormat,
};
use crate::ports::GridReader;

use super::classifier::ColumnClassifier;
use super::country::extract_country;
use super::dates::parse_date;
use super::header::HeaderLocator;
use super::normalize::normalize_number;

/// Loader for one source variant
pub struct TableLoader {
    csv: CsvGridReader,
    spreadsheet: SpreadsheetGridReader,
    locator: HeaderLocator,
    classifier: ColumnClassifier,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new(
            CsvGridReader::default(),
            HeaderLocator::default(),
            ColumnClassifier::default(),
        )
    }
}

impl TableLoader {
    pub fn new(csv: CsvGridReader, locator: HeaderLocator, classifier: ColumnClassifier) -> Self {
        Self {
            csv,
            spreadsheet: SpreadsheetGridReader,
            locator,
            classifier,
        }
    }

    pub fn variant(&self) -> MetricVariant {
        self.classifier.variant()
    }

    pub fn classifier(&self) -> &ColumnClassifier {
        &self.classifier
    }

    fn reader_for(&self, format: SourceFormat) -> &dyn GridReader {
        match format {
            SourceFormat::Csv => &self.csv,
            SourceFormat::Spreadsheet => &self.spreadsheet,
        }
    }

    /// Trimmed header labels after header relocation, without classifying
    pub fn detect_columns(&self, source: &SourceFile) -> Result<Vec<String>> {
        self.locate_columns(source).map(|(_, columns)| columns)
    }

    /// Header line and its trimmed labels
    pub fn locate_columns(&self, source: &SourceFile) -> Result<(usize, Vec<String>)> {
        let decoded = self.reader_for(source.format()).read_grid(&source.bytes)?;
        if decoded.grid.is_empty() {
            return Err(Error::unreadable("File contains no rows"));
        }
        let header_line = self.locator.header_line(&decoded.grid);
        Ok((header_line, decoded.grid.with_header(header_line).columns().to_vec()))
    }

    /// Run the full pipeline on one upload
    pub fn load(&self, source: &SourceFile) -> Result<CanonicalTable> {
        let format = source.format();
        let decoded = self.reader_for(format).read_grid(&source.bytes)?;
        if decoded.grid.is_empty() {
            return Err(Error::unreadable("File contains no rows"));
        }

        let header_line = self.locator.header_line(&decoded.grid);
        let raw = decoded.grid.with_header(header_line);

        let mapping = self.classifier.resolve(raw.columns())?;
        let column = |role: ColumnRole| {
            mapping
                .index_of(role)
                .ok_or_else(|| Error::Other(format!("{} column not mapped", role)))
        };
        let date_idx = column(ColumnRole::Date)?;
        let campaign_idx = column(ColumnRole::CampaignName)?;
        let installs_idx = column(ColumnRole::Installs)?;
        let cost_idx = column(self.variant().cost_role())?;

        let mut records = Vec::with_capacity(raw.rows().len());
        let mut dropped = 0;
        for row in raw.rows() {
            // Rows without a valid date are dropped, never defaulted; this
            // is also what removes trailing "Total" rows
            let Some(date) = parse_date(&row[date_idx]) else {
                dropped += 1;
                continue;
            };

            let installs = non_negative(normalize_number(&row[installs_idx]));
            let cost = non_negative(normalize_number(&row[cost_idx]));
            let cost = match self.variant() {
                MetricVariant::Spend => CostMetric::Spend(cost),
                MetricVariant::Cpi => CostMetric::Cpi(cost),
            };

            let campaign = &row[campaign_idx];
            records.push(CanonicalRecord {
                date,
                campaign_name: campaign_label(campaign),
                installs,
                cost,
                country: extract_country(campaign),
            });
        }

        if records.is_empty() {
            return Err(Error::EmptyResult);
        }

        let provenance = LoadProvenance {
            format,
            encoding: decoded.encoding,
            header_line,
            detected_columns: raw.columns().to_vec(),
            mapping,
            rows_read: raw.rows().len(),
            rows_dropped: dropped,
            rows_malformed: raw.skipped_rows(),
        };

        Ok(CanonicalTable::new(self.variant(), records, provenance))
    }
}

fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

fn campaign_label(value: &CellValue) -> String {
    value.to_string().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::header::HeaderOffset;
    use chrono::NaiveDate;

    fn csv(content: &str) -> SourceFile {
        SourceFile::new("export.csv", content.as_bytes().to_vec())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_simple_export() {
        let table = TableLoader::default()
            .load(&csv(
                "Date,Campaign Name,Installs,Spend\n\
                 2024-01-01,US_A,100,$50.00\n\
                 2024-01-01,UK_B,50,¥25\n\
                 Total,,150,$75.00\n",
            ))
            .unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.records()[0];
        assert_eq!(first.date, ymd(2024, 1, 1));
        assert_eq!(first.campaign_name, "US_A");
        assert_eq!(first.installs, Decimal::from(100));
        assert_eq!(first.cost, CostMetric::Spend(Decimal::from(50)));
        assert_eq!(first.country, "US");
        assert_eq!(table.provenance().rows_read, 3);
        assert_eq!(table.provenance().rows_dropped, 1);
    }

    #[test]
    fn test_padded_campaign_cell_is_trimmed_before_country() {
        let table = TableLoader::default()
            .load(&csv("Date,Campaign Name,Installs,Spend
2024-01-01, US_A ,3,1
"))
            .unwrap();

        let record = &table.records()[0];
        assert_eq!(record.campaign_name, "US_A");
        assert_eq!(record.country, "US");
    }

    #[test]
    fn test_relocates_header_below_metadata() {
        let content = "ASA Report\n\
                       Time Zone: UTC\n\
                       Currency: USD\n\
                       Campaign Name,Day,Installs (Tap-Through),Spend\n\
                       US_A,2024-01-01,10,5.5\n";
        let table = TableLoader::default().load(&csv(content)).unwrap();
        assert_eq!(table.provenance().header_line, 3);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].spend(), Decimal::new(55, 1));
    }

    #[test]
    fn test_following_row_offset() {
        let content = "Campaign Report\n\
                       Report Date 2024-01-02\n\
                       日期,广告名称,下载量,花费\n\
                       2024-01-01,US_A,10,5\n";
        let loader = TableLoader::new(
            CsvGridReader::default(),
            HeaderLocator::new(20, vec!["Report Date".to_string()], HeaderOffset::FollowingRow),
            ColumnClassifier::default(),
        );
        let table = loader.load(&csv(content)).unwrap();
        assert_eq!(table.provenance().header_line, 2);
        assert_eq!(table.records()[0].installs, Decimal::from(10));
    }

    #[test]
    fn test_garbage_numbers_become_zero_and_negatives_clamp() {
        let table = TableLoader::default()
            .load(&csv("Date,Campaign,Installs,Spend\n2024-01-01,US_A,n/a,-3\n"))
            .unwrap();
        assert_eq!(table.records()[0].installs, Decimal::ZERO);
        assert_eq!(table.records()[0].cost, CostMetric::Spend(Decimal::ZERO));
    }

    #[test]
    fn test_missing_columns() {
        let err = TableLoader::default()
            .load(&csv("Date,Campaign,Impressions\n2024-01-01,US_A,5\n"))
            .unwrap_err();
        match err {
            Error::MissingColumns { missing, detected } => {
                assert_eq!(missing, vec![ColumnRole::Installs, ColumnRole::Spend]);
                assert_eq!(detected, vec!["Date", "Campaign", "Impressions"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_dated_rows_is_empty_result() {
        let err = TableLoader::default()
            .load(&csv("Date,Campaign,Installs,Spend\nTotal,,1,2\n"))
            .unwrap_err();
        assert!(err.is_empty_result());
    }

    #[test]
    fn test_empty_file_is_unreadable() {
        let err = TableLoader::default().load(&csv("")).unwrap_err();
        assert_eq!(err.code(), "unreadable_file");
    }

    #[test]
    fn test_cpi_variant_load() {
        let loader = TableLoader::new(
            CsvGridReader::default(),
            HeaderLocator::default(),
            ColumnClassifier::for_variant(MetricVariant::Cpi),
        );
        let table = loader
            .load(&csv("Date,Campaign,Installs,Avg CPA\n2024-01-01,US_A,4,$2.50\n"))
            .unwrap();
        assert_eq!(table.variant(), MetricVariant::Cpi);
        assert_eq!(table.records()[0].cost, CostMetric::Cpi(Decimal::new(25, 1)));
        assert_eq!(table.records()[0].spend(), Decimal::from(10));
    }

    #[test]
    fn test_load_is_repeatable() {
        let loader = TableLoader::default();
        let source = csv("Date,Campaign,Installs,Spend\n2024-01-01,US_A,1,2\n");
        assert_eq!(loader.load(&source).unwrap(), loader.load(&source).unwrap());
    }

    #[test]
    fn test_detect_columns() {
        let columns = TableLoader::default()
            .detect_columns(&csv(" Date , Campaign Name ,Foo\n"))
            .unwrap();
        assert_eq!(columns, vec!["Date", "Campaign Name", "Foo"]);
    }
}
