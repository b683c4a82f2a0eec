//! Content-addressed cache of loaded tables
//!
//! Repeated renders of the same upload skip parsing. Entries are keyed by a
//! SHA-256 of the bytes plus everything that influences how they are read,
//! so a key can never map to a table built under different settings.
//! Failures are never cached.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

use crate::domain::result::{Error, Result};
use crate::domain::{CanonicalTable, SourceFile};

use super::loader::TableLoader;

/// Default number of tables kept
pub const DEFAULT_CAPACITY: usize = 8;

#[derive(Default)]
struct Entries {
    tables: HashMap<String, Arc<CanonicalTable>>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
}

/// Bounded content-addressed cache of canonical tables
pub struct LoadCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl Default for LoadCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LoadCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Cache key for a source under the given settings fingerprint
    pub fn key(source: &SourceFile, settings: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.format().as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(settings.as_bytes());
        hasher.update([0u8]);
        hasher.update(&source.bytes);
        hex::encode(hasher.finalize())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Entries>> {
        self.entries
            .lock()
            .map_err(|e| Error::Other(format!("Lock poisoned: {}", e)))
    }

    pub fn get(&self, key: &str) -> Result<Option<Arc<CanonicalTable>>> {
        Ok(self.lock()?.tables.get(key).cloned())
    }

    pub fn insert(&self, key: String, table: Arc<CanonicalTable>) -> Result<()> {
        let mut entries = self.lock()?;
        if entries.tables.insert(key.clone(), table).is_none() {
            entries.order.push_back(key);
        }
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.tables.remove(&oldest);
            }
        }
        Ok(())
    }

    /// Return the cached table for this content, loading it on a miss
    pub fn get_or_load(
        &self,
        loader: &TableLoader,
        settings: &str,
        source: &SourceFile,
    ) -> Result<Arc<CanonicalTable>> {
        let key = Self::key(source, settings);
        if let Some(table) = self.get(&key)? {
            return Ok(table);
        }

        let table = Arc::new(loader.load(source)?);
        self.insert(key, Arc::clone(&table))?;
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|e| e.tables.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
