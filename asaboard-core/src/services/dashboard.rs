//! Dashboard service - one upload in, dashboard projections out
//!
//! Wraps a configured `TableLoader` with the load cache so each command
//! reads an upload once and then asks for as many views as it needs.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{CacheSettings, DashboardSettings, LoaderSettings};
use crate::domain::result::{Error, Result};
use crate::domain::{
    CanonicalTable, CountryInstalls, DailyPoint, DashboardSummary, SourceFile, SourceFormat,
};

use super::aggregate;
use super::cache::LoadCache;
use super::classifier::ColumnDiagnosis;
use super::loader::TableLoader;

/// Dates available in a table and the default comparison pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSummary {
    pub dates: Vec<NaiveDate>,
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub default_now: NaiveDate,
    pub default_prev: NaiveDate,
}

/// Column diagnosis for an upload that may not load
#[derive(Debug, Clone, Serialize)]
pub struct ColumnReport {
    pub header_line: usize,
    pub columns: Vec<ColumnDiagnosis>,
    pub complete: bool,
}

pub struct DashboardService {
    loader: TableLoader,
    cache: LoadCache,
    fingerprint: String,
    top_campaigns: usize,
}

impl DashboardService {
    pub fn new(
        loader: &LoaderSettings,
        dashboard: &DashboardSettings,
        cache: &CacheSettings,
    ) -> Result<Self> {
        Ok(Self {
            loader: loader.build_loader()?,
            cache: LoadCache::new(cache.max_entries),
            fingerprint: loader.fingerprint(),
            top_campaigns: dashboard.top_campaigns,
        })
    }

    pub fn loader(&self) -> &TableLoader {
        &self.loader
    }

    /// Read an upload from disk
    pub fn read_path(&self, path: &Path, format: Option<SourceFormat>) -> Result<SourceFile> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::unreadable(format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = SourceFile::new(name, bytes);
        Ok(match format {
            Some(format) => source.with_format(format),
            None => source,
        })
    }

    /// Read an upload from a stream; CSV unless told otherwise
    pub fn read_stream(&self, mut input: impl Read, format: Option<SourceFormat>) -> Result<SourceFile> {
        let mut bytes = Vec::new();
        input
            .read_to_end(&mut bytes)
            .map_err(|e| Error::unreadable(format!("stdin: {}", e)))?;
        Ok(SourceFile::new("stdin", bytes).with_format(format.unwrap_or(SourceFormat::Csv)))
    }

    /// Load through the cache
    pub fn load(&self, source: &SourceFile) -> Result<Arc<CanonicalTable>> {
        self.cache.get_or_load(&self.loader, &self.fingerprint, source)
    }

    /// Classify every header label without requiring a full load
    pub fn columns(&self, source: &SourceFile) -> Result<ColumnReport> {
        let (header_line, labels) = self.loader.locate_columns(source)?;
        let classifier = self.loader.classifier();
        Ok(ColumnReport {
            header_line,
            complete: classifier.resolve(&labels).is_ok(),
            columns: classifier.diagnose(&labels),
        })
    }

    pub fn dates(&self, table: &CanonicalTable) -> Result<DateSummary> {
        let (default_now, default_prev) = aggregate::resolve_comparison_dates(table, None, None)?;
        let dates = table.dates();
        let (first, last) = table.date_range().ok_or(Error::EmptyResult)?;
        Ok(DateSummary {
            dates,
            first,
            last,
            default_now,
            default_prev,
        })
    }

    /// Headline metrics for the requested (or default) pair of dates
    pub fn summary(
        &self,
        table: &CanonicalTable,
        date_now: Option<NaiveDate>,
        date_prev: Option<NaiveDate>,
        top: Option<usize>,
    ) -> Result<DashboardSummary> {
        let (now, prev) = aggregate::resolve_comparison_dates(table, date_now, date_prev)?;
        Ok(aggregate::dashboard_summary(
            table,
            now,
            prev,
            top.unwrap_or(self.top_campaigns),
        ))
    }

    pub fn country_trend(&self, table: &CanonicalTable) -> Vec<CountryInstalls> {
        aggregate::country_trend(table)
    }

    pub fn cpi_trend(&self, table: &CanonicalTable) -> Vec<DailyPoint> {
        aggregate::daily_cpi_series(table)
    }

    pub fn cached_tables(&self) -> usize {
        self.cache.len()
    }
}
