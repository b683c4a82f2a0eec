//! Raw grid reader port
//!
//! Defines the interface for turning uploaded bytes into headerless rows.
//! The Table Loader picks an implementation by source format and never
//! touches csv or spreadsheet libraries directly.

use crate::domain::result::Result;
use crate::domain::RawGrid;

/// Rows decoded from an upload, plus how they were decoded
#[derive(Debug, Clone, Default)]
pub struct DecodedGrid {
    pub grid: RawGrid,
    /// Text encoding that succeeded (text formats only)
    pub encoding: Option<String>,
}

/// Reader for one physical source format
pub trait GridReader: Send + Sync {
    /// Read every physical row with no assumed header
    ///
    /// Fails with `Error::UnreadableFile` when the bytes cannot be decoded.
    fn read_grid(&self, bytes: &[u8]) -> Result<DecodedGrid>;
}
