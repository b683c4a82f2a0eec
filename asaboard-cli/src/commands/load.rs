//! Load command - read an export and show how it was interpreted

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;

use asaboard_core::domain::LoadProvenance;
use asaboard_core::MetricVariant;

use super::{with_table, SourceArgs};
use crate::output;

#[derive(Debug, Serialize)]
pub struct LoadReport {
    pub variant: MetricVariant,
    pub records: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub provenance: LoadProvenance,
}

pub fn run(args: &SourceArgs) -> Result<()> {
    with_table(
        "load",
        args,
        |_, table| {
            let range = table.date_range();
            Ok(LoadReport {
                variant: table.variant(),
                records: table.len(),
                first_date: range.map(|(first, _)| first),
                last_date: range.map(|(_, last)| last),
                provenance: table.provenance().clone(),
            })
        },
        render,
    )
}

fn render(report: &LoadReport) {
    let p = &report.provenance;

    println!("{}", "Export Loaded".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Format".to_string(), p.format.to_string()]);
    if let Some(encoding) = &p.encoding {
        table.add_row(vec!["Encoding".to_string(), encoding.clone()]);
    }
    table.add_row(vec!["Variant".to_string(), report.variant.as_str().to_string()]);
    table.add_row(vec!["Header row".to_string(), (p.header_line + 1).to_string()]);
    table.add_row(vec!["Rows read".to_string(), p.rows_read.to_string()]);
    table.add_row(vec!["Records".to_string(), report.records.to_string()]);
    table.add_row(vec!["Rows without a date".to_string(), p.rows_dropped.to_string()]);
    table.add_row(vec!["Malformed rows".to_string(), p.rows_malformed.to_string()]);
    println!("{}", table);
    println!();

    if let (Some(first), Some(last)) = (report.first_date, report.last_date) {
        println!("Date range: {} to {}", first, last);
        println!();
    }

    println!("{}", "Column Mapping".bold());
    let mut mapping = output::create_table();
    mapping.set_header(vec!["Role", "Column", "Position"]);
    for a in p.mapping.assignments() {
        mapping.add_row(vec![
            a.role.to_string(),
            a.label.clone(),
            (a.index + 1).to_string(),
        ]);
    }
    println!("{}", mapping);

    if p.rows_malformed > 0 {
        output::warning(&format!(
            "{} row(s) had more fields than the header and were skipped",
            p.rows_malformed
        ));
    }
}
