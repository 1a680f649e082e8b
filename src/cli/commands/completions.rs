//! Completions command - generate shell completion scripts.

use clap::Command;
use clap_complete::{generate, Shell};
use std::io;

/// Arguments for the completions command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    copycache completions bash > ~/.local/share/bash-completion/completions/copycache\n    \
    copycache completions zsh > ~/.zfunc/_copycache\n    \
    copycache completions fish > ~/.config/fish/completions/copycache.fish")]
pub struct Args {
    /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
    #[arg(value_name = "SHELL", value_enum)]
    pub shell: Shell,
}

/// Writes completions for `cmd` to stdout.
///
/// Called from main.rs, which owns the top-level `Cli` definition.
pub fn generate_completions(cmd: &mut Command, shell: Shell) {
    generate(shell, cmd, "copycache", &mut io::stdout());
}
