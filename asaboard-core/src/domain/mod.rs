//! Core domain entities
//!
//! All pipeline data is defined here. These are pure data structures
//! with no I/O or external dependencies.

mod cell;
pub mod comparison;
mod record;
pub mod result;
mod role;
mod source;
mod table;

pub use cell::CellValue;
pub use comparison::{
    ComparisonRow, CountryInstalls, DailyPoint, DailyTotals, DashboardSummary,
};
pub use record::{
    CanonicalRecord, CanonicalTable, ColumnAssignment, ColumnMapping, CostMetric,
    LoadProvenance,
};
pub use role::{ColumnRole, MetricVariant};
pub use source::{SourceFile, SourceFormat};
pub use table::{RawGrid, RawTable};
