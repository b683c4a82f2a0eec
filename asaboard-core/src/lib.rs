//! Asaboard Core - Apple Search Ads report loading and comparison
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Pipeline data (cells, grids, canonical records, aggregates)
//! - **ports**: Trait definitions for external dependencies (GridReader)
//! - **services**: The load pipeline and dashboard projections
//! - **adapters**: Concrete readers (csv + encoding_rs, calamine)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod log_migrations;

use std::path::Path;

use anyhow::Result;

use config::Config;
use services::DashboardService;

// Re-export commonly used types at crate root
pub use domain::{
    CanonicalRecord, CanonicalTable, ColumnRole, ComparisonRow, CountryInstalls, DailyPoint,
    DailyTotals, DashboardSummary, MetricVariant, SourceFile, SourceFormat,
};
pub use domain::result::{Error, OperationResult};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for Asaboard operations
///
/// Holds the configuration and the services built from it.
pub struct AsaboardContext {
    pub config: Config,
    pub dashboard_service: DashboardService,
}

impl AsaboardContext {
    /// Create a context from the settings in the asaboard directory
    pub fn new(asaboard_dir: &Path) -> Result<Self> {
        let config = Config::load(asaboard_dir)?;
        Self::with_config(config)
    }

    /// Create a context from an already adjusted configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let dashboard_service =
            DashboardService::new(&config.loader, &config.dashboard, &config.cache)?;
        Ok(Self {
            config,
            dashboard_service,
        })
    }
}
