//! Derived aggregates handed to the presentation layer

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Zero-guarded cost per install, saturating at `Decimal::MAX`
pub fn cost_per_install(spend: Decimal, installs: Decimal) -> Decimal {
    if installs > Decimal::ZERO {
        spend.checked_div(installs).unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    }
}

/// Totals for a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTotals {
    pub installs: Decimal,
    pub spend: Decimal,
    pub cpi: Decimal,
}

impl DailyTotals {
    pub fn new(installs: Decimal, spend: Decimal) -> Self {
        Self {
            installs,
            spend,
            cpi: cost_per_install(spend, installs),
        }
    }

    pub fn zero() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO)
    }
}

/// One campaign compared across two dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub campaign_name: String,
    pub installs_now: Decimal,
    pub installs_prev: Decimal,
    pub spend_now: Decimal,
    pub spend_prev: Decimal,
    pub cpi_now: Decimal,
    pub cpi_prev: Decimal,
    /// `installs_now - installs_prev`
    pub diff: Decimal,
}

/// Installs for one (date, country) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryInstalls {
    pub date: NaiveDate,
    pub country: String,
    pub installs: Decimal,
}

/// Per-date totals in a time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: DailyTotals,
}

/// Headline metrics for two dates plus the top movers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub date_now: NaiveDate,
    pub date_prev: NaiveDate,
    pub now: DailyTotals,
    pub prev: DailyTotals,
    pub installs_delta: Decimal,
    pub spend_delta: Decimal,
    pub cpi_delta: Decimal,
    pub top_campaigns: Vec<ComparisonRow>,
}
