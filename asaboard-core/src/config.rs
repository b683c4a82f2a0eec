//! Configuration management
//!
//! Settings live in `settings.json` inside the asaboard directory:
//! ```json
//! {
//!   "loader": { "variant": "spend", "headerOffset": "matchedRow", ... },
//!   "dashboard": { "topCampaigns": 10 },
//!   "cache": { "maxEntries": 8 }
//! }
//! ```
//! Keys this crate does not know about are preserved on save.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::CsvGridReader;
use crate::domain::{ColumnRole, MetricVariant};
use crate::services::cache::DEFAULT_CAPACITY;
use crate::services::classifier::ColumnClassifier;
use crate::services::header::{HeaderLocator, HeaderOffset, DEFAULT_MARKERS, DEFAULT_SCAN_ROWS};
use crate::services::loader::TableLoader;

/// Environment override for the source variant
pub const VARIANT_ENV: &str = "ASABOARD_VARIANT";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    loader: LoaderSettings,
    #[serde(default)]
    dashboard: DashboardSettings,
    #[serde(default)]
    cache: CacheSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// How uploads are read and classified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderSettings {
    pub variant: MetricVariant,
    pub header_scan_rows: usize,
    pub header_markers: Vec<String>,
    pub header_offset: HeaderOffset,
    /// WHATWG encoding labels tried in order for CSV files
    pub encodings: Vec<String>,
    /// Extra include keywords per role
    pub extra_keywords: HashMap<ColumnRole, Vec<String>>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            variant: MetricVariant::default(),
            header_scan_rows: DEFAULT_SCAN_ROWS,
            header_markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
            header_offset: HeaderOffset::default(),
            encodings: vec!["utf-8".to_string(), "gbk".to_string()],
            extra_keywords: HashMap::new(),
        }
    }
}

impl LoaderSettings {
    /// Build a loader from these settings
    pub fn build_loader(&self) -> crate::domain::result::Result<TableLoader> {
        let csv = CsvGridReader::from_labels(&self.encodings)?;
        let locator = HeaderLocator::new(
            self.header_scan_rows,
            self.header_markers.clone(),
            self.header_offset,
        );

        // Sorted so the rule order is stable across runs
        let mut roles: Vec<&ColumnRole> = self.extra_keywords.keys().collect();
        roles.sort();
        let classifier = roles.into_iter().fold(
            ColumnClassifier::for_variant(self.variant),
            |classifier, role| classifier.with_keywords(*role, &self.extra_keywords[role][..]),
        );

        Ok(TableLoader::new(csv, locator, classifier))
    }

    /// Stable string identifying these settings, for cache keys
    pub fn fingerprint(&self) -> String {
        let mut extra: Vec<(&ColumnRole, &Vec<String>)> = self.extra_keywords.iter().collect();
        extra.sort();
        format!(
            "{}|{}|{}|{:?}|{}|{:?}",
            self.variant.as_str(),
            self.header_scan_rows,
            self.header_markers.join("\u{1f}"),
            self.header_offset,
            self.encodings.join(","),
            extra
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSettings {
    /// Campaign variance rows shown
    pub top_campaigns: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self { top_campaigns: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSettings {
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CAPACITY,
        }
    }
}

/// Asaboard configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub loader: LoaderSettings,
    pub dashboard: DashboardSettings,
    pub cache: CacheSettings,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the asaboard directory
    ///
    /// The source variant can be overridden with ASABOARD_VARIANT.
    pub fn load(asaboard_dir: &Path) -> Result<Self> {
        let settings_path = asaboard_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings file: {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        let mut loader = raw.loader.clone();
        if let Ok(value) = std::env::var(VARIANT_ENV) {
            loader.variant = value
                .parse()
                .map_err(|e: String| anyhow::anyhow!("{}: {}", VARIANT_ENV, e))?;
        }

        Ok(Self {
            loader,
            dashboard: raw.dashboard.clone(),
            cache: raw.cache.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the asaboard directory
    /// Preserves other settings this crate doesn't manage
    pub fn save(&self, asaboard_dir: &Path) -> Result<()> {
        let settings_path = asaboard_dir.join("settings.json");

        let mut settings = self._raw_settings.clone();
        settings.loader = self.loader.clone();
        settings.dashboard = self.dashboard.clone();
        settings.cache = self.cache.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}
