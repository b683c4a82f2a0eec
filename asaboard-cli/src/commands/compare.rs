//! Compare command - day-over-day dashboard for two dates

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;

use asaboard_core::DashboardSummary;

use super::{with_table, SourceArgs};
use crate::output::{self, cost_delta, format_count, format_money, installs_delta, number_cell};

pub fn run(
    args: &SourceArgs,
    now: Option<NaiveDate>,
    prev: Option<NaiveDate>,
    top: Option<usize>,
) -> Result<()> {
    with_table(
        "compare",
        args,
        |ctx, table| ctx.dashboard_service.summary(table, now, prev, top),
        render,
    )
}

fn render(summary: &DashboardSummary) {
    println!(
        "{}",
        format!("{} vs {}", summary.date_now, summary.date_prev).bold()
    );
    println!();

    let mut headline = output::create_table();
    headline.set_header(vec![
        "Metric".to_string(),
        summary.date_prev.to_string(),
        summary.date_now.to_string(),
        "Change".to_string(),
    ]);
    headline.add_row(vec![
        "Installs".into(),
        number_cell(format_count(summary.prev.installs)),
        number_cell(format_count(summary.now.installs)),
        number_cell(installs_delta(summary.installs_delta)),
    ]);
    headline.add_row(vec![
        "Spend".into(),
        number_cell(format_money(summary.prev.spend)),
        number_cell(format_money(summary.now.spend)),
        number_cell(cost_delta(summary.spend_delta)),
    ]);
    headline.add_row(vec![
        "CPI".into(),
        number_cell(format_money(summary.prev.cpi)),
        number_cell(format_money(summary.now.cpi)),
        number_cell(cost_delta(summary.cpi_delta)),
    ]);
    println!("{}", headline);
    println!();

    if summary.top_campaigns.is_empty() {
        println!("{}", "No campaigns on either date.".dimmed());
        return;
    }

    println!("{}", "Campaign Movers".bold());
    let mut movers = output::create_table();
    movers.set_header(vec![
        "Campaign", "Installs", "Prev", "Change", "Spend", "Prev", "CPI", "Prev",
    ]);
    for row in &summary.top_campaigns {
        movers.add_row(vec![
            row.campaign_name.as_str().into(),
            number_cell(format_count(row.installs_now)),
            number_cell(format_count(row.installs_prev)),
            number_cell(installs_delta(row.diff)),
            number_cell(format_money(row.spend_now)),
            number_cell(format_money(row.spend_prev)),
            number_cell(format_money(row.cpi_now)),
            number_cell(format_money(row.cpi_prev)),
        ]);
    }
    println!("{}", movers);
}
