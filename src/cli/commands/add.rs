//! Add command - record content in the history.

use std::io::{self, IsTerminal, Read};

use anyhow::{bail, Context, Result};
use colored::Colorize;

use copycache::history::Status;
use copycache::storage::{EntryType, NewEntry};

use crate::cli::client::Client;

/// Arguments for the add command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    copycache add \"some text\"                 Record text\n    \
    pbpaste | copycache add                   Record whatever is piped in\n    \
    copycache add https://docs.rs --source cli  Record with an origin")]
pub struct Args {
    /// Content to record (read from stdin when omitted)
    pub content: Option<String>,

    /// Override the detected content type
    #[arg(short = 't', long = "type", value_enum, value_name = "TYPE")]
    pub kind: Option<EntryType>,

    /// Where the content came from
    #[arg(short, long, value_name = "SOURCE")]
    pub source: Option<String>,
}

/// Executes the add command.
pub fn run(args: Args) -> Result<()> {
    let content = match args.content {
        Some(content) => content,
        None => {
            if io::stdin().is_terminal() {
                bail!("No content given. Pass it as an argument or pipe it on stdin.");
            }
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    if content.trim().is_empty() {
        bail!("Nothing to add: content is empty");
    }

    let client = Client::connect()?;
    let outcome = client.insert(NewEntry {
        content,
        kind: args.kind,
        source: args.source,
        timestamp: None,
    })?;

    match outcome.status {
        Status::Mutated => {
            if let Some(head) = outcome.history.first() {
                let id_short = &head.id.to_string()[..8];
                println!(
                    "{} {} ({})",
                    "Added".green(),
                    id_short.cyan(),
                    head.kind
                );
            }
        }
        Status::Unchanged => {
            println!(
                "{}",
                "Not added: same as the most recent entry, from a blacklisted source,\n\
                 or every slot is taken by a pinned entry".dimmed()
            );
        }
    }

    Ok(())
}
