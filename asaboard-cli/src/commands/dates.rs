//! Dates command - list the dates present in an export

use anyhow::Result;
use colored::Colorize;

use asaboard_core::services::DateSummary;

use super::{with_table, SourceArgs};

pub fn run(args: &SourceArgs) -> Result<()> {
    with_table(
        "dates",
        args,
        |ctx, table| ctx.dashboard_service.dates(table),
        render,
    )
}

fn render(summary: &DateSummary) {
    println!("{}", "Dates".bold());
    for date in &summary.dates {
        let marker = if *date == summary.default_now {
            " (now)".green().to_string()
        } else if *date == summary.default_prev {
            " (prev)".cyan().to_string()
        } else {
            String::new()
        };
        println!("  {}{}", date, marker);
    }
    println!();
    println!(
        "{} date(s), {} to {}",
        summary.dates.len(),
        summary.first,
        summary.last
    );
}
