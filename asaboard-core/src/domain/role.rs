//! Canonical column roles and source variants

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semantic category a raw column is mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnRole {
    Date,
    CampaignName,
    Installs,
    Spend,
    Cpi,
    Unmapped,
}

impl ColumnRole {
    /// Canonical column name
    pub fn label(&self) -> &'static str {
        match self {
            ColumnRole::Date => "Date",
            ColumnRole::CampaignName => "Campaign Name",
            ColumnRole::Installs => "Installs",
            ColumnRole::Spend => "Spend",
            ColumnRole::Cpi => "CPI",
            ColumnRole::Unmapped => "Unmapped",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ColumnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "date" => Ok(ColumnRole::Date),
            "campaignname" | "campaign" => Ok(ColumnRole::CampaignName),
            "installs" => Ok(ColumnRole::Installs),
            "spend" => Ok(ColumnRole::Spend),
            "cpi" => Ok(ColumnRole::Cpi),
            other => Err(format!("Unknown column role: {}", other)),
        }
    }
}

/// Which cost column an export carries
///
/// Most exports report total spend per row; some report only cost-per-install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricVariant {
    #[default]
    Spend,
    Cpi,
}

impl MetricVariant {
    /// The role holding this variant's cost figure
    pub fn cost_role(&self) -> ColumnRole {
        match self {
            MetricVariant::Spend => ColumnRole::Spend,
            MetricVariant::Cpi => ColumnRole::Cpi,
        }
    }

    /// Roles that must resolve for a load to succeed, in report order
    pub fn required_roles(&self) -> [ColumnRole; 4] {
        [
            ColumnRole::Date,
            ColumnRole::CampaignName,
            ColumnRole::Installs,
            self.cost_role(),
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricVariant::Spend => "spend",
            MetricVariant::Cpi => "cpi",
        }
    }
}

impl FromStr for MetricVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spend" => Ok(MetricVariant::Spend),
            "cpi" => Ok(MetricVariant::Cpi),
            other => Err(format!("Unknown variant '{}' (expected spend or cpi)", other)),
        }
    }
}
