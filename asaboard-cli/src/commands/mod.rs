//! CLI command implementations

pub mod columns;
pub mod compare;
pub mod dates;
pub mod load;
pub mod logs;
pub mod trend;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use asaboard_core::config::Config;
use asaboard_core::domain::result::Result as CoreResult;
use asaboard_core::services::HeaderOffset;
use asaboard_core::{
    AsaboardContext, CanonicalTable, EntryPoint, Error, LogEvent, LoggingService, MetricVariant,
    OperationResult, SourceFile, SourceFormat,
};

use crate::output;

/// Where an export comes from and how to read it
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Export file (.csv, .xlsx, .xls, .ods); "-" or piped input reads stdin
    pub file: Option<PathBuf>,
    /// Force the file format instead of detecting it from the extension
    #[arg(long)]
    pub format: Option<SourceFormat>,
    /// Source variant: spend or cpi
    #[arg(long)]
    pub variant: Option<MetricVariant>,
    /// Header position relative to the marker row: matched or following
    #[arg(long)]
    pub header_offset: Option<HeaderOffset>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let asaboard_dir = get_asaboard_dir().ok()?;
    std::fs::create_dir_all(&asaboard_dir).ok()?;
    LoggingService::new(&asaboard_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Record a command execution, ignoring logging errors
pub fn log_command(logger: &Option<LoggingService>, command: &str) {
    if let Some(l) = logger {
        let _ = l.log_command(command);
    }
}

/// Get the asaboard directory from environment or default
pub fn get_asaboard_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ASABOARD_DIR") {
        Ok(PathBuf::from(dir))
    } else {
        Ok(dirs::home_dir()
            .context("Could not find home directory")?
            .join(".asaboard"))
    }
}

/// Build a context from settings.json plus command-line overrides
pub fn get_context(args: &SourceArgs) -> Result<AsaboardContext> {
    let asaboard_dir = get_asaboard_dir()?;
    std::fs::create_dir_all(&asaboard_dir)
        .with_context(|| format!("Failed to create asaboard directory: {:?}", asaboard_dir))?;

    let mut config = Config::load(&asaboard_dir)?;
    if let Some(variant) = args.variant {
        config.loader.variant = variant;
    }
    if let Some(offset) = args.header_offset {
        config.loader.header_offset = offset;
    }

    AsaboardContext::with_config(config).context("Failed to initialize asaboard context")
}

/// Read the export named on the command line, or stdin
pub fn read_source(ctx: &AsaboardContext, args: &SourceArgs) -> CoreResult<SourceFile> {
    let service = &ctx.dashboard_service;
    match &args.file {
        Some(path) if path.as_os_str() != "-" => service.read_path(path, args.format),
        Some(_) => service.read_stream(std::io::stdin().lock(), args.format),
        None if atty::isnt(atty::Stream::Stdin) => {
            service.read_stream(std::io::stdin().lock(), args.format)
        }
        None => Err(Error::validation(
            "No export provided. Pass a file path, \"-\", or pipe from stdin.",
        )),
    }
}

/// Load an export and render a view of it
///
/// Handles the outcomes every data command shares: an empty export renders
/// a zero state and succeeds, other failures are printed (as JSON with
/// `--json`) and exit non-zero.
pub fn with_table<T, F, R>(command: &str, args: &SourceArgs, compute: F, render: R) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&AsaboardContext, &CanonicalTable) -> CoreResult<T>,
    R: FnOnce(&T),
{
    let logger = get_logger();
    log_command(&logger, command);

    let ctx = get_context(args)?;
    let source = match read_source(&ctx, args) {
        Ok(source) => source,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("read_failed").with_command(command).with_error_code(e.code()),
            );
            report_failure::<T>(args.json, e)
        }
    };

    let loaded = ctx.dashboard_service.load(&source);
    match &loaded {
        Ok(table) => log_event(&logger, LogEvent::loaded(table).with_command(command)),
        Err(e) => log_event(
            &logger,
            LogEvent::load_failed(source.format(), e).with_command(command),
        ),
    }

    match loaded.and_then(|table| compute(&ctx, table.as_ref())) {
        Ok(data) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
            } else {
                render(&data);
            }
            Ok(())
        }
        Err(e) if e.is_empty_result() => {
            render_empty::<T>(args.json)?;
            Ok(())
        }
        Err(e) => report_failure::<T>(args.json, e),
    }
}

/// Zero state for an export with no dated rows
pub fn render_empty<T: Serialize>(json: bool) -> Result<()> {
    if json {
        let result: OperationResult<T> = OperationResult {
            success: true,
            data: None,
            error: None,
            context: Some(HashMap::from([(
                "code".to_string(),
                serde_json::Value::from(Error::EmptyResult.code()),
            )])),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::warning("No dated rows found in this export.");
    let mut table = output::create_table();
    table.set_header(vec!["Installs", "Spend", "CPI"]);
    table.add_row(vec!["0", "0.00", "0.00"]);
    println!("{}", table);
    Ok(())
}

/// Print a pipeline failure and exit non-zero
pub fn report_failure<T: Serialize>(json: bool, error: Error) -> ! {
    if json {
        let failed: CoreResult<T> = Err(error);
        let result = OperationResult::from(failed);
        match serde_json::to_string_pretty(&result) {
            Ok(text) => println!("{}", text),
            Err(e) => output::error(&e.to_string()),
        }
        std::process::exit(1);
    }

    output::error(&error.to_string());
    match &error {
        Error::MissingColumns { detected, .. } => {
            if detected.is_empty() {
                eprintln!("{}", "No column headers were found.".dimmed());
            } else {
                eprintln!("{}", "Columns found in this export:".dimmed());
                for label in detected {
                    eprintln!("  {}", label.dimmed());
                }
            }
            eprintln!(
                "{}",
                "Run `asaboard columns <file>` to see how each header was classified.".dimmed()
            );
        }
        Error::UnreadableFile(_) => {
            eprintln!("{}", "Check the file is a CSV or spreadsheet export and try again.".dimmed());
        }
        _ => {}
    }
    std::process::exit(1);
}
