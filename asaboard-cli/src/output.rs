//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Right-aligned cell for numeric columns
pub fn number_cell(text: impl Into<String>) -> Cell {
    Cell::new(text.into()).set_alignment(CellAlignment::Right)
}

/// Install counts, without trailing zeros
pub fn format_count(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Money and CPI, two decimal places
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn signed(text: String, value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{}", text)
    } else {
        text
    }
}

/// Install change: gains are good
pub fn installs_delta(value: Decimal) -> String {
    let text = signed(format_count(value), value);
    if value > Decimal::ZERO {
        text.green().to_string()
    } else if value < Decimal::ZERO {
        text.red().to_string()
    } else {
        text.dimmed().to_string()
    }
}

/// Spend or CPI change: increases are bad
pub fn cost_delta(value: Decimal) -> String {
    let text = signed(format_money(value), value);
    if value > Decimal::ZERO {
        text.red().to_string()
    } else if value < Decimal::ZERO {
        text.green().to_string()
    } else {
        text.dimmed().to_string()
    }
}
