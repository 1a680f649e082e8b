//! Delete command - remove a single entry from the history.

use anyhow::Result;
use colored::Colorize;

use crate::cli::client::{resolve_id, Client};

/// Arguments for the delete command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    copycache delete 3f2a9c1b     Delete the entry with this id prefix")]
pub struct Args {
    /// Entry ID prefix to delete
    #[arg(value_name = "ID")]
    #[arg(
        long_help = "The entry ID prefix to delete. Must uniquely identify a\n\
        single entry. Use 'copycache list' to find entry IDs."
    )]
    pub id: String,
}

/// Executes the delete command.
pub fn run(args: Args) -> Result<()> {
    let client = Client::connect()?;
    let id = resolve_id(&client.get_all()?, &args.id)?;

    let outcome = client.delete(id)?;
    let id_short = &id.to_string()[..8];

    if outcome.is_mutated() {
        println!("{} {}", "Deleted".green(), id_short.cyan());
    } else {
        // Removed by someone else between lookup and delete
        println!("{} {} was already gone", "Entry".dimmed(), id_short.cyan());
    }

    Ok(())
}
