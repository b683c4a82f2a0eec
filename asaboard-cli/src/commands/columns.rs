//! Columns command - show how each header label was classified
//!
//! Works on exports that fail to load, which is when it is most useful.

use anyhow::Result;
use colored::Colorize;

use asaboard_core::services::ColumnReport;
use asaboard_core::{ColumnRole, OperationResult};

use super::{get_context, get_logger, log_command, read_source, report_failure, SourceArgs};
use crate::output;

pub fn run(args: &SourceArgs) -> Result<()> {
    let logger = get_logger();
    log_command(&logger, "columns");

    let ctx = get_context(args)?;
    let report = match read_source(&ctx, args).and_then(|s| ctx.dashboard_service.columns(&s)) {
        Ok(report) => report,
        Err(e) => report_failure::<ColumnReport>(args.json, e),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(report))?);
        return Ok(());
    }

    println!("{}", "Detected Columns".bold());
    println!("Header row: {}", report.header_line + 1);
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["#", "Label", "Role", "Used"]);
    for c in &report.columns {
        let role = if c.role == ColumnRole::Unmapped {
            c.role.to_string().dimmed().to_string()
        } else {
            c.role.to_string()
        };
        let used = if c.selected { "✓".green().to_string() } else { String::new() };
        table.add_row(vec![(c.index + 1).to_string(), c.label.clone(), role, used]);
    }
    println!("{}", table);
    println!();

    let variant = ctx.config.loader.variant;
    let missing: Vec<&str> = variant
        .required_roles()
        .iter()
        .filter(|role| !report.columns.iter().any(|c| c.selected && c.role == **role))
        .map(|role| role.label())
        .collect();

    if missing.is_empty() {
        output::info(&format!("All columns for the {} variant were found", variant.as_str()));
    } else {
        output::warning(&format!("Missing columns: {}", missing.join(", ")));
    }

    Ok(())
}
