//! Output formatting utilities for CLI commands.
//!
//! Provides a unified `OutputFormat` enum plus the small text helpers the
//! listing commands share.

use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;

/// Content longer than this is cut in text listings.
pub const PREVIEW_CHARS: usize = 150;

/// Output format options for CLI commands.
///
/// - `Text` for human-readable terminal output (default)
/// - `Json` for machine-readable output and scripting
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default).
    #[default]
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Formats how long ago `timestamp` was, relative to `now`.
///
/// Anything a week or older is shown as a local date.
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(timestamp).num_seconds();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 60 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d")
            .to_string()
    }
}

/// Produces a single-line preview of entry content.
///
/// Newlines and tabs are shown as spaces; content over `max_chars`
/// characters is cut and "..." appended.
pub fn preview(content: &str, max_chars: usize) -> String {
    let flat: String = content
        .chars()
        .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
        .collect();

    if flat.chars().count() <= max_chars {
        flat
    } else {
        format!("{}...", flat.chars().take(max_chars).collect::<String>())
    }
}
