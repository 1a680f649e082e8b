//! Show command - print an entry's full content.
//!
//! The content is written exactly as stored, so it can be piped back into
//! the clipboard (`copycache show 3f2a | pbcopy`).

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};

use copycache::storage::Entry;

use crate::cli::client::{resolve_id, Client};
use crate::cli::OutputFormat;

/// Arguments for the show command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    copycache show 3f2a9c1b              Print the entry's content\n    \
    copycache show 3f2a | pbcopy         Copy it back to the clipboard\n    \
    copycache show 3f2a --format json    Print the whole entry as JSON")]
pub struct Args {
    /// Entry ID prefix to show
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output format: text (raw content, default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the show command.
pub fn run(args: Args) -> Result<()> {
    let client = Client::connect()?;
    let history = client.get_all()?;
    let id = resolve_id(&history, &args.id)?;

    let Some(entry) = history.iter().find(|e| e.id == id) else {
        anyhow::bail!("Entry {id} not found");
    };

    let mut stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Json => {
            writeln!(stdout, "{}", serde_json::to_string_pretty(entry)?)?;
        }
        OutputFormat::Text => write_raw(&mut stdout, entry, io::stdout().is_terminal())?,
    }
    stdout.flush().context("Failed to write to stdout")?;

    Ok(())
}

/// Writes the content verbatim, adding a newline only for a terminal.
fn write_raw(out: &mut impl Write, entry: &Entry, terminal: bool) -> Result<()> {
    out.write_all(entry.content.as_bytes())?;
    if terminal && !entry.content.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use copycache::storage::EntryType;
    use uuid::Uuid;

    fn entry(content: &str) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            content: content.to_string(),
            kind: EntryType::Text,
            source: String::new(),
            timestamp: Utc::now(),
            pinned: false,
        }
    }

    #[test]
    fn test_write_raw_keeps_content_exact_when_piped() {
        let mut out = Vec::new();
        write_raw(&mut out, &entry("line one\n\tline two"), false).expect("write failed");
        assert_eq!(out, b"line one\n\tline two");
    }

    #[test]
    fn test_write_raw_terminates_line_on_terminal() {
        let mut out = Vec::new();
        write_raw(&mut out, &entry("hello"), true).expect("write failed");
        assert_eq!(out, b"hello\n");

        let mut out = Vec::new();
        write_raw(&mut out, &entry("hello\n"), true).expect("write failed");
        assert_eq!(out, b"hello\n");
    }
}
