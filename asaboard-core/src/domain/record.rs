//! Canonical records and the immutable table produced by a load

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::role::{ColumnRole, MetricVariant};
use super::source::SourceFormat;

/// One raw column chosen for a canonical role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnAssignment {
    pub role: ColumnRole,
    /// Zero-based position in the source header
    pub index: usize,
    pub label: String,
}

/// Role -> source column resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    assignments: Vec<ColumnAssignment>,
}

impl ColumnMapping {
    pub fn new(mut assignments: Vec<ColumnAssignment>) -> Self {
        assignments.sort_by_key(|a| a.role);
        Self { assignments }
    }

    pub fn assignments(&self) -> &[ColumnAssignment] {
        &self.assignments
    }

    pub fn get(&self, role: ColumnRole) -> Option<&ColumnAssignment> {
        self.assignments.iter().find(|a| a.role == role)
    }

    pub fn index_of(&self, role: ColumnRole) -> Option<usize> {
        self.get(role).map(|a| a.index)
    }
}

/// Cost figure carried by a record, per source variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum CostMetric {
    Spend(Decimal),
    Cpi(Decimal),
}

/// A single cleaned row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    pub date: NaiveDate,
    pub campaign_name: String,
    pub installs: Decimal,
    pub cost: CostMetric,
    /// Two-letter code derived from the campaign name, or "Unknown"
    pub country: String,
}

impl CanonicalRecord {
    /// Spend for this row; CPI-only rows imply `cpi * installs`,
    /// saturating at `Decimal::MAX`
    pub fn spend(&self) -> Decimal {
        match self.cost {
            CostMetric::Spend(spend) => spend,
            CostMetric::Cpi(cpi) => cpi.saturating_mul(self.installs),
        }
    }
}

/// How a table was read, kept for diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadProvenance {
    pub format: SourceFormat,
    /// Encoding that decoded the file (CSV only)
    pub encoding: Option<String>,
    /// Zero-based physical row used as the header
    pub header_line: usize,
    /// Trimmed source labels, in source order
    pub detected_columns: Vec<String>,
    pub mapping: ColumnMapping,
    /// Data rows below the header
    pub rows_read: usize,
    /// Rows discarded for lacking a valid date (includes summary rows)
    pub rows_dropped: usize,
    /// Rows discarded as malformed (more fields than the header)
    pub rows_malformed: usize,
}

/// The cleaned, role-mapped record set. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalTable {
    variant: MetricVariant,
    records: Vec<CanonicalRecord>,
    provenance: LoadProvenance,
}

impl CanonicalTable {
    pub fn new(
        variant: MetricVariant,
        records: Vec<CanonicalRecord>,
        provenance: LoadProvenance,
    ) -> Self {
        Self {
            variant,
            records,
            provenance,
        }
    }

    pub fn variant(&self) -> MetricVariant {
        self.variant
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn provenance(&self) -> &LoadProvenance {
        &self.provenance
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct dates present, ascending
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.records.iter().map(|r| r.date).collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// First and last date present
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.dates();
        Some((*dates.first()?, *dates.last()?))
    }

    pub fn records_on(&self, date: NaiveDate) -> impl Iterator<Item = &CanonicalRecord> {
        self.records.iter().filter(move |r| r.date == date)
    }
}
