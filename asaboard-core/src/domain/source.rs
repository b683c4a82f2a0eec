//! Uploaded source files

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Physical format of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Detect the format from a file name
    ///
    /// Only a `.csv` suffix selects CSV; anything else is handed to the
    /// spreadsheet reader, which rejects what it cannot open.
    pub fn detect(name: &str) -> Self {
        let is_csv = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            SourceFormat::Csv
        } else {
            SourceFormat::Spreadsheet
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Spreadsheet => "spreadsheet",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "spreadsheet" | "excel" | "xlsx" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            other => Err(format!("Unknown format: {}", other)),
        }
    }
}

/// An uploaded file: its name (for format detection) and raw bytes
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Explicit format, overriding detection by name
    pub format: Option<SourceFormat>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            format: None,
        }
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Effective format of this file
    pub fn format(&self) -> SourceFormat {
        self.format.unwrap_or_else(|| SourceFormat::detect(&self.name))
    }
}
