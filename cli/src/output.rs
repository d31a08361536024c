//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use connecta_forms::application::{Notice, NoticeKind, Recovery};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(raw, true).ok()
    }

    /// Structured output; `Table` falls back to pretty JSON.
    pub fn print<T: Serialize>(&self, data: &T) {
        match self {
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
            OutputFormat::Json | OutputFormat::Table => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
        }
    }

    /// Rows as a table, or serialized for the other formats.
    pub fn print_rows<T: Serialize + Tabled>(&self, rows: &[T]) {
        match self {
            OutputFormat::Table => {
                if rows.is_empty() {
                    println!("{}", "(no rows)".dimmed());
                } else {
                    println!("{}", Table::new(rows).with(Style::rounded()));
                }
            }
            _ => self.print(&rows),
        }
    }
}

pub fn notice(notice: &Notice) {
    let title = match notice.kind {
        NoticeKind::Success => notice.title.green().bold(),
        NoticeKind::Error => notice.title.red().bold(),
    };
    println!();
    println!("  {}", title);
    println!("  {}", notice.message);
    println!();
}

pub fn recovery(screen: &Recovery) {
    println!();
    println!("  {}", screen.title.red().bold());
    println!("  {}", screen.heading.bold());
    println!("  {}", screen.message);
    if let Some(detail) = &screen.detail {
        println!("  {} {}", "Error:".red(), detail);
    }
    if let Some(warning) = &screen.warning {
        println!("  {}", warning.yellow());
    }
    let actions: Vec<&str> = screen.actions.iter().map(|a| a.label()).collect();
    println!("  [{}]", actions.join(" / "));
    println!();
}

pub fn field_error(field: &str, message: &str) {
    println!("    {} {}: {}", "✗".red(), field, message.red());
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
