//! Clear command - remove every unpinned entry.

use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;

use crate::cli::client::Client;

/// Arguments for the clear command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    copycache clear            Clear history (prompts for confirmation)\n    \
    copycache clear --force    Clear without confirmation")]
pub struct Args {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

/// Executes the clear command.
///
/// Pinned entries are kept.
pub fn run(args: Args) -> Result<()> {
    let client = Client::connect()?;
    let history = client.get_all()?;
    let unpinned = history.iter().filter(|e| !e.pinned).count();

    if unpinned == 0 {
        println!("{}", "Nothing to clear".dimmed());
        return Ok(());
    }

    if !args.force {
        print!(
            "Remove {} unpinned entries? Pinned entries are kept. [y/N] ",
            unpinned
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let outcome = client.clear_unpinned()?;
    println!(
        "{} history ({} pinned entries kept)",
        "Cleared".green(),
        outcome.history.len()
    );

    Ok(())
}
