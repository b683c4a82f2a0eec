//! Event log backed by DuckDB
//!
//! Each asaboard directory holds a `logs.duckdb` file with one row per
//! event. Upload contents never reach it: no file names, campaign names or
//! metric values, only the event, its format, a row count and error codes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::domain::result::Error as CoreError;
use crate::domain::{CanonicalTable, SourceFormat};
use crate::log_migrations::LOG_MIGRATIONS;

/// Disambiguates ids minted within one millisecond
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Milliseconds since the unix epoch
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Millisecond timestamp in the high bits, a wrapping 16-bit sequence below
fn next_id() -> u64 {
    let seq = SEQUENCE.fetch_add(1, AtomicOrdering::Relaxed) & 0xFFFF;
    ((now_ms() as u64) << 16) | seq
}

/// Which front end wrote an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
}

impl EntryPoint {
    fn label(self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
        }
    }
}

/// An event waiting to be written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Default::default()
        }
    }

    /// Outcome of a successful load
    pub fn loaded(table: &CanonicalTable) -> Self {
        Self::new("file_loaded")
            .with_format(table.provenance().format)
            .with_row_count(table.len())
    }

    /// Outcome of a failed load
    ///
    /// Only the error code and the role names of missing columns are kept;
    /// detected column labels can carry customer naming and are left out.
    pub fn load_failed(format: SourceFormat, error: &CoreError) -> Self {
        let event = Self::new("load_failed")
            .with_format(format)
            .with_error_code(error.code());
        match error {
            CoreError::MissingColumns { missing, detected } => event
                .with_error(format!(
                    "missing {}",
                    missing.iter().map(|r| r.label()).collect::<Vec<_>>().join(", ")
                ))
                .with_error_details(format!("{} columns detected", detected.len())),
            other => event.with_error(other.code()),
        }
    }

    /// CLI subcommand that produced the event
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.source_format = Some(format.as_str().to_string());
        self
    }

    pub fn with_row_count(mut self, rows: usize) -> Self {
        self.row_count = Some(rows as i64);
        self
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// One persisted `sys_logs` row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub command: Option<String>,
    pub source_format: Option<String>,
    pub row_count: Option<i64>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

const ERROR_FILTER: &str = "WHERE error_message IS NOT NULL OR error_code IS NOT NULL";

const SELECT_COLUMNS: &str = "id, timestamp, entry_point, app_version, platform, event, \
     command, source_format, row_count, error_code, error_message, error_details";

fn entry_from_row(row: &duckdb::Row<'_>) -> duckdb::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        entry_point: row.get(2)?,
        app_version: row.get(3)?,
        platform: row.get(4)?,
        event: row.get(5)?,
        command: row.get(6)?,
        source_format: row.get(7)?,
        row_count: row.get(8)?,
        error_code: row.get(9)?,
        error_message: row.get(10)?,
        error_details: row.get(11)?,
    })
}

/// Writer and reader for the event log
///
/// The connection sits behind a mutex so one service can be shared by
/// every request handler.
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Open (creating if needed) `logs.duckdb` under `asaboard_dir` and
    /// bring its schema up to date
    pub fn new(
        asaboard_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = asaboard_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)?;

        let service = Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
            platform: std::env::consts::OS,
        };

        service.migrate()?;
        Ok(service)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Apply every embedded migration not yet recorded in `sys_migrations`
    ///
    /// The first migration creates the bookkeeping table itself and is
    /// written with `IF NOT EXISTS`, so it runs unconditionally.
    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        let ((_, bootstrap), pending) = LOG_MIGRATIONS
            .split_first()
            .ok_or_else(|| anyhow!("No log migrations embedded"))?;
        conn.execute_batch(bootstrap)?;

        let applied: HashSet<String> = conn
            .prepare("SELECT migration_name FROM sys_migrations")?
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<duckdb::Result<_>>()?;

        for (name, sql) in pending.iter().filter(|(name, _)| !applied.contains(*name)) {
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO sys_migrations (migration_name) VALUES (?)",
                [*name],
            )?;
        }
        Ok(())
    }

    /// Persist one event, stamped with this service's entry point,
    /// version and platform
    pub fn log(&self, event: LogEvent) -> Result<()> {
        self.lock()?.execute(
            "INSERT INTO sys_logs (
                id, timestamp, entry_point, app_version, platform, event,
                command, source_format, row_count, error_code, error_message, error_details
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            duckdb::params![
                next_id(),
                now_ms(),
                self.entry_point.label(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.command,
                &event.source_format,
                &event.row_count,
                &event.error_code,
                &event.error_message,
                &event.error_details,
            ],
        )?;
        Ok(())
    }

    /// Record that a CLI subcommand ran
    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    fn query(&self, filter: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM sys_logs {} ORDER BY timestamp DESC, id DESC LIMIT ?",
            SELECT_COLUMNS, filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map([limit as i64], entry_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(entries)
    }

    /// Most recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query("", limit)
    }

    /// Most recent entries carrying an error
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query(ERROR_FILTER, limit)
    }

    fn count_where(&self, filter: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM sys_logs {}", filter);
        let n: i64 = self.lock()?.query_row(&sql, [], |row| row.get(0))?;
        Ok(n as u64)
    }

    pub fn count(&self) -> Result<u64> {
        self.count_where("")
    }

    pub fn error_count(&self) -> Result<u64> {
        self.count_where(ERROR_FILTER)
    }

    /// Remove entries stamped before `timestamp_ms`; returns how many went
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let deleted = self
            .lock()?
            .execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
