//! List command - show, search and filter the history.
//!
//! Pinned entries are listed in their own section above the rest, both in
//! history order.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use copycache::query::{self, Query, TypeFilter};
use copycache::storage::{Entry, EntryType};

use crate::cli::client::Client;
use crate::cli::format::{preview, time_ago, PREVIEW_CHARS};
use crate::cli::OutputFormat;

/// Arguments for the list command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    copycache list                    Show the whole history\n    \
    copycache list token              Entries containing 'token'\n    \
    copycache list --type url         Only URLs\n    \
    copycache list --pinned           Only pinned entries\n    \
    copycache list --format json      Output as JSON")]
pub struct Args {
    /// Case-insensitive text to search for
    pub query: Option<String>,

    /// Restrict to one content type: all (default), url, text
    #[arg(short = 't', long = "type", default_value = "all", value_name = "TYPE")]
    pub kind: TypeFilter,

    /// Only show pinned entries
    #[arg(short, long)]
    pub pinned: bool,

    /// Maximum number of entries to display
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the list command.
pub fn run(args: Args) -> Result<()> {
    let client = Client::connect()?;
    let history = client.get_all()?;

    let query = Query {
        text: args.query.unwrap_or_default(),
        kind: args.kind,
        pinned_only: args.pinned,
        limit: args.limit,
    };
    let entries = query::apply(&history, &query);

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries)?;
            println!("{json}");
        }
        OutputFormat::Text => print_text(&entries, history.is_empty()),
    }

    Ok(())
}

fn print_text(entries: &[Entry], history_empty: bool) {
    if entries.is_empty() {
        if history_empty {
            println!("{}", "History is empty.".dimmed());
            println!();
            println!("Copy something with the daemon running, or use 'copycache add'.");
        } else {
            println!("{}", "No entries match.".dimmed());
        }
        return;
    }

    let (pinned, recent): (Vec<&Entry>, Vec<&Entry>) = entries.iter().partition(|e| e.pinned);

    if !pinned.is_empty() {
        println!("{}", "Pinned".bold());
        for entry in &pinned {
            print_entry(entry);
        }
        println!();
    }

    if !recent.is_empty() {
        println!("{}", "Recent".bold());
        for entry in &recent {
            print_entry(entry);
        }
    }
}

fn print_entry(entry: &Entry) {
    // Column widths for consistent alignment
    const TYPE_WIDTH: usize = 4;
    const TIME_WIDTH: usize = 10;

    let id_short = &entry.id.to_string()[..8];
    let kind = format!("{:<TYPE_WIDTH$}", entry.kind.to_string());
    let kind = match entry.kind {
        EntryType::Url => kind.blue(),
        EntryType::Text => kind.normal(),
    };
    let when = format!("{:<TIME_WIDTH$}", time_ago(entry.timestamp, Utc::now()));

    println!(
        "  {}  {}  {}  {}",
        id_short.cyan(),
        kind,
        when.dimmed(),
        preview(&entry.content, PREVIEW_CHARS)
    );
}
