//! Table, TOML and JSON output for CLI commands.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (TOML for documents)
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Prints rows under a titled heading, or as a JSON array.
pub fn print_rows<T: Serialize + Tabled>(title: &str, rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{} ({})", title, rows.len());
            if !rows.is_empty() {
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Prints a whole document: TOML for humans, JSON otherwise.
pub fn print_document<T: Serialize>(document: &T, format: OutputFormat) {
    let rendered = match format {
        OutputFormat::Table => toml::to_string_pretty(document).unwrap_or_default(),
        OutputFormat::Json => serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".to_string()),
    };
    println!("{}", rendered.trim_end());
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<20} {}", format!("{}:", key), value);
}
