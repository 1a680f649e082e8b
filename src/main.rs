use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::commands;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "copycache")]
#[command(version)]
#[command(about = "Clipboard history - keep, search and pin what you copy")]
#[command(long_about = "copycache records the text you copy into a bounded history,\n\
    classifies each entry as a URL or plain text, and lets you search,\n\
    filter and pin entries so they survive clearing and eviction.")]
#[command(after_help = "EXAMPLES:\n    \
    copycache add \"hello\"            Record a copy\n    \
    echo hi | copycache add          Record stdin\n    \
    copycache list                   Show the history\n    \
    copycache list github -t url     Search URLs for 'github'\n    \
    copycache pin 3f2a               Pin an entry by id prefix\n    \
    copycache show 3f2a | pbcopy     Copy an entry back\n    \
    copycache daemon start           Start the background daemon\n\n\
    For more information about a command, run 'copycache <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Record a copied piece of text
    #[command(long_about = "Adds an entry to the history. The entry is classified as a URL\n\
        or text unless --type is given. Content equal to the newest entry\n\
        is ignored, so copying the same thing twice in a row records it once.")]
    Add(commands::add::Args),

    /// List, search and filter the history
    #[command(long_about = "Shows the history newest first, pinned entries in their own\n\
        section. An optional query matches case-insensitively anywhere in\n\
        the content, and --type restricts the results to URLs or text.")]
    List(commands::list::Args),

    /// Print an entry's full content
    #[command(long_about = "Prints the complete content of an entry exactly as it was\n\
        copied, ready to be piped back into the clipboard.")]
    Show(commands::show::Args),

    /// Delete an entry
    Delete(commands::delete::Args),

    /// Pin or unpin an entry
    #[command(long_about = "Toggles the pinned flag of an entry. Pinned entries are never\n\
        evicted when the history is full and survive 'copycache clear'.")]
    Pin(commands::pin::Args),

    /// Remove every unpinned entry
    Clear(commands::clear::Args),

    /// View and manage configuration settings
    #[command(long_about = "Provides subcommands to show, get, and set configuration values.\n\
        Configuration is stored in ~/.copycache/config.yaml.")]
    Config(commands::config::Args),

    /// Manage the capture blacklist
    #[command(long_about = "Copies whose source matches a blacklist pattern are never\n\
        recorded. Patterns match the host of the source page.")]
    Blacklist(commands::blacklist::Args),

    /// Manage the background daemon
    #[command(long_about = "Controls the background daemon that accepts capture requests\n\
        over a local socket and applies history changes one at a time.")]
    Daemon(commands::daemon::Args),

    /// Generate shell completion scripts
    Completions(commands::completions::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The daemon installs its own file logger
    if !matches!(cli.command, Commands::Daemon(_)) {
        let filter = if cli.verbose {
            "copycache=debug"
        } else {
            "copycache=info"
        };

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().without_time())
            .init();
    }

    match cli.command {
        Commands::Add(args) => commands::add::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Show(args) => commands::show::run(args),
        Commands::Delete(args) => commands::delete::run(args),
        Commands::Pin(args) => commands::pin::run(args),
        Commands::Clear(args) => commands::clear::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Blacklist(args) => commands::blacklist::run(args),
        Commands::Daemon(args) => commands::daemon::run(args),
        Commands::Completions(args) => {
            commands::completions::generate_completions(&mut Cli::command(), args.shell);
            Ok(())
        }
    }
}
