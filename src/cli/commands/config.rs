//! Config command - manage configuration

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use copycache::config::{Config, KEYS};
use copycache::storage::db::default_db_path;

#[derive(clap::Args)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Restore all settings to their defaults
    Reset,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(ConfigCommand::Show) | None => show_config(),
        Some(ConfigCommand::Get { key }) => get_config(&key),
        Some(ConfigCommand::Set { key, value }) => set_config(&key, &value),
        Some(ConfigCommand::Reset) => reset_config(),
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "copycache Configuration".bold());
    println!();
    println!(
        "  {}  {}",
        "Config:  ".dimmed(),
        Config::config_path()?.display()
    );
    println!("  {}  {}", "Database:".dimmed(), default_db_path()?.display());
    println!();

    for key in KEYS {
        let value = config.get(key).unwrap_or_default();
        let value = if value.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            value
        };
        println!("  {:<26}{}", key, value);
    }

    Ok(())
}

fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;
    match config.get(key) {
        Some(value) => println!("{value}"),
        None => bail!("Unknown config key '{key}'. Valid keys: {}", KEYS.join(", ")),
    }
    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    println!("{} {} = {}", "Set".green(), key, value);
    if key.starts_with("history.") {
        println!(
            "{}",
            "Restart the daemon for history settings to take effect.".dimmed()
        );
    }
    Ok(())
}

fn reset_config() -> Result<()> {
    Config::default().save()?;
    println!("{}", "Configuration reset to defaults".green());
    Ok(())
}
