//! CSV reader with encoding fallback
//!
//! Exports come out of the ad console in whatever encoding the user's
//! locale picked, so each configured encoding is tried in order and the
//! first one that decodes cleanly wins.

use encoding_rs::{Encoding, UTF_8};

use crate::domain::result::{Error, Result};
use crate::domain::{CellValue, RawGrid};
use crate::ports::{DecodedGrid, GridReader};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV implementation of the grid reader port
pub struct CsvGridReader {
    encodings: Vec<&'static Encoding>,
}

impl Default for CsvGridReader {
    fn default() -> Self {
        Self {
            encodings: vec![UTF_8, encoding_rs::GBK],
        }
    }
}

impl CsvGridReader {
    pub fn new(encodings: Vec<&'static Encoding>) -> Self {
        Self { encodings }
    }

    /// Build from WHATWG encoding labels ("utf-8", "gbk", "shift_jis", ...)
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        let encodings = labels
            .iter()
            .map(|label| {
                Encoding::for_label(label.as_ref().trim().as_bytes())
                    .ok_or_else(|| Error::config(format!("Unknown encoding: {}", label.as_ref())))
            })
            .collect::<Result<Vec<_>>>()?;
        if encodings.is_empty() {
            return Err(Error::config("At least one CSV encoding is required"));
        }
        Ok(Self { encodings })
    }

    /// Decode bytes with the first encoding that produces no malformed sequences
    fn decode(&self, bytes: &[u8]) -> Option<(String, &'static Encoding)> {
        self.encodings.iter().find_map(|&encoding| {
            let body = if encoding == UTF_8 {
                bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
            } else {
                bytes
            };
            encoding
                .decode_without_bom_handling_and_without_replacement(body)
                .map(|text| (text.into_owned(), encoding))
        })
    }
}

impl GridReader for CsvGridReader {
    fn read_grid(&self, bytes: &[u8]) -> Result<DecodedGrid> {
        let names: Vec<&str> = self.encodings.iter().map(|e| e.name()).collect();
        let (text, encoding) = self.decode(bytes).ok_or_else(|| {
            Error::unreadable(format!("CSV could not be decoded as {}", names.join(" or ")))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        // Malformed records are skipped, matching how the console's own
        // exports are usually opened
        let rows: Vec<Vec<CellValue>> = reader
            .records()
            .filter_map(|r| r.ok())
            .map(|record| record.iter().map(CellValue::text).collect())
            .collect();

        Ok(DecodedGrid {
            grid: RawGrid::new(rows),
            encoding: Some(encoding.name().to_string()),
        })
    }
}
