//! Asaboard CLI - Apple Search Ads day-over-day dashboard in your terminal

use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{columns, compare, dates, load, logs, trend, SourceArgs};

/// Asaboard - compare Apple Search Ads exports day over day
#[derive(Parser)]
#[command(name = "asaboard", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load an export and show how it was read
    Load {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show how each header label was classified
    Columns {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List the dates present in an export
    Dates {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Compare two dates: headline totals and campaign movers
    Compare {
        #[command(flatten)]
        source: SourceArgs,
        /// Date to report on (defaults to the latest date)
        #[arg(long)]
        now: Option<NaiveDate>,
        /// Date to compare against (defaults to the date before the latest)
        #[arg(long)]
        prev: Option<NaiveDate>,
        /// Number of campaign movers to show
        #[arg(long)]
        top: Option<usize>,
        /// Show every campaign
        #[arg(long, conflicts_with = "top")]
        all: bool,
    },

    /// Show a trend across every date in the export
    Trend {
        #[command(flatten)]
        source: SourceArgs,
        /// What to break the trend down by
        #[arg(long, value_enum, default_value = "country")]
        by: trend::TrendBy,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Load { source } => load::run(&source),
        Commands::Columns { source } => columns::run(&source),
        Commands::Dates { source } => dates::run(&source),
        Commands::Compare { source, now, prev, top, all } => {
            let top = if all { Some(usize::MAX) } else { top };
            compare::run(&source, now, prev, top)
        }
        Commands::Trend { source, by } => trend::run(&source, by),
        Commands::Logs { command } => logs::run(command),
    }
}
