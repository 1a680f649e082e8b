//! Pin command - toggle whether an entry is protected from eviction.

use anyhow::Result;
use colored::Colorize;

use crate::cli::client::{resolve_id, Client};

/// Arguments for the pin command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    copycache pin 3f2a9c1b     Pin the entry (or unpin it if already pinned)")]
pub struct Args {
    /// Entry ID prefix to pin or unpin
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Executes the pin command.
pub fn run(args: Args) -> Result<()> {
    let client = Client::connect()?;
    let id = resolve_id(&client.get_all()?, &args.id)?;

    let outcome = client.toggle_pin(id)?;
    let id_short = &id.to_string()[..8];

    match outcome.history.iter().find(|e| e.id == id) {
        Some(entry) if outcome.is_mutated() => {
            let verb = if entry.pinned { "Pinned" } else { "Unpinned" };
            println!("{} {}", verb.green(), id_short.cyan());
        }
        _ => println!("{} {} was already gone", "Entry".dimmed(), id_short.cyan()),
    }

    Ok(())
}
