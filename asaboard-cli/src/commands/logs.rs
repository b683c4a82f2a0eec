//! Logs command - inspect and prune the local event log

use anyhow::Result;
use chrono::{TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use serde::Serialize;

use asaboard_core::services::logging::now_ms;
use asaboard_core::services::LogEntry;
use asaboard_core::{EntryPoint, LoggingService};

use super::get_asaboard_dir;
use crate::output;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only failed reads and loads
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old log entries
    Clear {
        /// Delete entries older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show entry counts and where the log lives
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct LogStats {
    total_entries: u64,
    error_count: u64,
    database_path: String,
    database_size_bytes: u64,
}

fn open_log() -> Result<LoggingService> {
    let dir = get_asaboard_dir()?;
    std::fs::create_dir_all(&dir)?;
    LoggingService::new(&dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn timestamp(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ms.to_string(),
    }
}

pub fn run(command: LogsCommands) -> Result<()> {
    let log = open_log()?;
    match command {
        LogsCommands::List { limit, errors, json } => list(&log, limit, errors, json),
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(&log, older_than_days, force, json),
        LogsCommands::Stats { json } => stats(&log, json),
    }
}

fn error_marker(entry: &LogEntry) -> String {
    match (&entry.error_code, &entry.error_message) {
        (Some(code), _) => code.red().to_string(),
        (None, Some(_)) => "!".red().to_string(),
        (None, None) => String::new(),
    }
}

fn list(log: &LoggingService, limit: usize, errors_only: bool, json: bool) -> Result<()> {
    let entries = if errors_only {
        log.get_errors(limit)?
    } else {
        log.get_recent(limit)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No log entries found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Event", "Command", "Format", "Rows", "Error"]);
    for entry in &entries {
        table.add_row(vec![
            timestamp(entry.timestamp),
            entry.event.clone(),
            entry.command.clone().unwrap_or_default(),
            entry.source_format.clone().unwrap_or_default(),
            entry.row_count.map(|n| n.to_string()).unwrap_or_default(),
            error_marker(entry),
        ]);
    }
    println!("{}", table);

    if errors_only {
        return Ok(());
    }
    let recent = log.get_errors(3)?;
    if !recent.is_empty() {
        println!();
        println!("{}", "Recent failures".red().bold());
        for entry in &recent {
            println!(
                "  {} {}: {}",
                timestamp(entry.timestamp).dimmed(),
                entry.event,
                entry.error_message.as_deref().unwrap_or("no message")
            );
        }
    }
    Ok(())
}

fn clear(log: &LoggingService, older_than_days: u64, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete log entries older than {} days?", older_than_days))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let deleted = log.delete_before(now_ms() - older_than_days as i64 * DAY_MS)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
    } else {
        println!("Deleted {} log entries", deleted);
    }
    Ok(())
}

fn stats(log: &LoggingService, json: bool) -> Result<()> {
    let path = log.db_path();
    let stats = LogStats {
        total_entries: log.count()?,
        error_count: log.error_count()?,
        database_path: path.display().to_string(),
        database_size_bytes: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("{}", "Event Log".bold());
    println!("  Entries:  {}", stats.total_entries);
    println!("  Failures: {}", stats.error_count);
    println!("  Database: {}", stats.database_path);
    println!("  Size:     {}", output::format_size(stats.database_size_bytes));
    Ok(())
}
