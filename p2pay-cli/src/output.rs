//! Output formatting utilities

use std::time::Duration;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use p2pay_core::FeedEntry;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

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

/// Render the activity feed as a table
pub fn feed_table(feed: &[FeedEntry]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Time", "From", "To", "Amount", "Message"]);

    for entry in feed {
        table.add_row(vec![
            Cell::new(entry.timestamp.as_deref().map(format_timestamp).unwrap_or_default()),
            Cell::new(&entry.sender),
            Cell::new(&entry.recipient),
            Cell::new(format!("{} $", entry.amount.normalize())).set_alignment(CellAlignment::Right),
            Cell::new(&entry.message),
        ]);
    }
    table
}

/// Print the feed, or a hint when it is empty
pub fn print_feed(feed: &[FeedEntry]) {
    if feed.is_empty() {
        println!("No transfers yet.");
    } else {
        println!("{}", feed_table(feed));
    }
}

/// Shorten backend timestamps like `2025-01-15T10:00:00.123456` for display
fn format_timestamp(raw: &str) -> String {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Spinner shown while a request is in flight
///
/// Draws to stderr and stays hidden when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
