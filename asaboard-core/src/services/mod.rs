//! Service layer - the load pipeline and its projections
//!
//! Each stage is its own module so it can be tested in isolation:
//! header location, column classification, cell normalization and
//! aggregation. `DashboardService` ties them together for callers.

pub mod aggregate;
pub mod cache;
pub mod classifier;
pub mod country;
mod dashboard;
pub mod dates;
pub mod header;
pub mod loader;
pub mod logging;
pub mod normalize;

pub use cache::LoadCache;
pub use classifier::{ClassificationRule, ColumnClassifier, ColumnDiagnosis};
pub use dashboard::{ColumnReport, DashboardService, DateSummary};
pub use header::{HeaderLocator, HeaderOffset};
pub use loader::TableLoader;
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
