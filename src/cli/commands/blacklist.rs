//! Blacklist command - sites whose copies are never recorded.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use copycache::config::Config;

#[derive(clap::Args)]
#[command(after_help = "PATTERNS:\n    \
    example.com        Exactly that host (or any host containing it)\n    \
    *.example.com      example.com and all of its subdomains\n    \
    bank.*             bank.com, bank.co.uk, ...")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<BlacklistCommand>,
}

#[derive(Subcommand)]
pub enum BlacklistCommand {
    /// List blacklist patterns
    List,
    /// Add a pattern
    Add { pattern: String },
    /// Remove a pattern
    Remove { pattern: String },
}

pub fn run(args: Args) -> Result<()> {
    let mut config = Config::load()?;

    match args.command {
        Some(BlacklistCommand::List) | None => {
            if config.blacklist.is_empty() {
                println!("{}", "Blacklist is empty".dimmed());
            }
            for pattern in &config.blacklist {
                println!("{pattern}");
            }
        }
        Some(BlacklistCommand::Add { pattern }) => {
            if config.add_to_blacklist(&pattern) {
                config.save()?;
                println!("{} {}", "Added".green(), pattern);
            } else {
                println!("{} is already blacklisted", pattern.yellow());
            }
        }
        Some(BlacklistCommand::Remove { pattern }) => {
            if config.remove_from_blacklist(&pattern) {
                config.save()?;
                println!("{} {}", "Removed".green(), pattern);
            } else {
                println!("{} is not blacklisted", pattern.yellow());
            }
        }
    }

    Ok(())
}
