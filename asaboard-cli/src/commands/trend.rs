//! Trend command - installs by country or CPI across every date

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use chrono::NaiveDate;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::Cell;
use rust_decimal::Decimal;
use serde::Serialize;

use asaboard_core::{CountryInstalls, DailyPoint};

use super::{with_table, SourceArgs};
use crate::output::{self, format_count, format_money, number_cell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrendBy {
    /// Installs per country per date
    Country,
    /// Daily installs, spend and CPI
    Cpi,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Trend {
    Country(Vec<CountryInstalls>),
    Cpi(Vec<DailyPoint>),
}

pub fn run(args: &SourceArgs, by: TrendBy) -> Result<()> {
    with_table(
        "trend",
        args,
        |ctx, table| {
            let service = &ctx.dashboard_service;
            Ok(match by {
                TrendBy::Country => Trend::Country(service.country_trend(table)),
                TrendBy::Cpi => Trend::Cpi(service.cpi_trend(table)),
            })
        },
        |trend| match trend {
            Trend::Country(points) => render_country(points),
            Trend::Cpi(points) => render_cpi(points),
        },
    )
}

/// Dates down, countries across
fn render_country(points: &[CountryInstalls]) {
    let countries: BTreeSet<&str> = points.iter().map(|p| p.country.as_str()).collect();
    let mut by_date: BTreeMap<NaiveDate, BTreeMap<&str, Decimal>> = BTreeMap::new();
    for p in points {
        by_date
            .entry(p.date)
            .or_default()
            .insert(p.country.as_str(), p.installs);
    }

    println!("{}", "Installs by Country".bold());
    let mut table = output::create_table();
    let mut header = vec!["Date".to_string()];
    header.extend(countries.iter().map(|c| c.to_string()));
    table.set_header(header);

    for (date, installs) in &by_date {
        let mut row: Vec<Cell> = vec![date.to_string().into()];
        row.extend(countries.iter().map(|c| {
            number_cell(format_count(installs.get(c).copied().unwrap_or(Decimal::ZERO)))
        }));
        table.add_row(row);
    }
    println!("{}", table);
}

fn render_cpi(points: &[DailyPoint]) {
    println!("{}", "Daily CPI".bold());
    let mut table = output::create_table();
    table.set_header(vec!["Date", "Installs", "Spend", "CPI"]);
    for p in points {
        table.add_row(vec![
            p.date.to_string().into(),
            number_cell(format_count(p.totals.installs)),
            number_cell(format_money(p.totals.spend)),
            number_cell(format_money(p.totals.cpi)),
        ]);
    }
    println!("{}", table);
}
