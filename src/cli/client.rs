//! History access for CLI commands.

use anyhow::{bail, Result};
use std::path::PathBuf;
use uuid::Uuid;

use copycache::capture;
use copycache::config::Config;
use copycache::daemon::{send_request_sync, DaemonState, Request, Response};
use copycache::history::{HistoryStore, Outcome, Status};
use copycache::storage::{Entry, NewEntry, SqliteStore};

/// Where history operations are sent.
pub enum Client {
    /// Through the running daemon's socket.
    Daemon(PathBuf),
    /// Straight to the database, for when no daemon is running.
    Direct {
        store: HistoryStore<SqliteStore>,
        blacklist: Vec<String>,
    },
}

impl Client {
    /// Picks the daemon if it's running, the database otherwise.
    pub fn connect() -> Result<Self> {
        let state = DaemonState::new()?;
        if state.is_running() && state.socket_path.exists() {
            tracing::debug!("Routing through daemon at {:?}", state.socket_path);
            return Ok(Client::Daemon(state.socket_path));
        }

        let config = Config::load()?;
        tracing::debug!("Daemon not running, opening database directly");
        Ok(Client::Direct {
            store: HistoryStore::new(SqliteStore::open_default()?, config.history),
            blacklist: config.blacklist,
        })
    }

    pub fn insert(&self, entry: NewEntry) -> Result<Outcome> {
        match self {
            Client::Daemon(socket) => request(socket, &Request::save(entry)),
            Client::Direct { store, blacklist } => {
                if let Err(skip) = capture::check(&entry, blacklist) {
                    tracing::debug!("Skipping capture: {}", skip);
                    return Ok(Outcome {
                        history: store.get_all()?,
                        status: Status::Unchanged,
                    });
                }
                Ok(store.insert(entry)?)
            }
        }
    }

    pub fn delete(&self, id: Uuid) -> Result<Outcome> {
        match self {
            Client::Daemon(socket) => request(socket, &Request::delete(id)),
            Client::Direct { store, .. } => Ok(store.delete_by_id(&id)?),
        }
    }

    pub fn toggle_pin(&self, id: Uuid) -> Result<Outcome> {
        match self {
            Client::Daemon(socket) => request(socket, &Request::toggle_pin(id)),
            Client::Direct { store, .. } => Ok(store.toggle_pin(&id)?),
        }
    }

    pub fn clear_unpinned(&self) -> Result<Outcome> {
        match self {
            Client::Daemon(socket) => request(socket, &Request::ClearHistory),
            Client::Direct { store, .. } => Ok(store.clear_unpinned()?),
        }
    }

    pub fn get_all(&self) -> Result<Vec<Entry>> {
        match self {
            Client::Daemon(socket) => Ok(request(socket, &Request::GetHistory)?.history),
            Client::Direct { store, .. } => Ok(store.get_all()?),
        }
    }
}

fn request(socket: &std::path::Path, request: &Request) -> Result<Outcome> {
    match send_request_sync(socket, request)? {
        Response::History { status, entries } => Ok(Outcome {
            history: entries,
            status,
        }),
        Response::Error { error } => bail!("Daemon error: {error}"),
        other => bail!("Unexpected response from daemon: {other:?}"),
    }
}

/// Finds the entry whose id starts with `prefix`.
pub fn resolve_id(history: &[Entry], prefix: &str) -> Result<Uuid> {
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        bail!("Entry id must not be empty");
    }

    let matching: Vec<&Entry> = history
        .iter()
        .filter(|e| e.id.to_string().starts_with(&prefix))
        .collect();

    match matching.as_slice() {
        [] => bail!(
            "No entry found matching '{prefix}'. \
             Run 'copycache list' to see entry ids."
        ),
        [entry] => Ok(entry.id),
        _ => bail!(
            "{} entries match '{prefix}'. Please use a longer prefix.",
            matching.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use copycache::storage::EntryType;

    fn entry_with_id(id: &str) -> Entry {
        Entry {
            id: Uuid::parse_str(id).unwrap(),
            content: "x".to_string(),
            kind: EntryType::Text,
            source: String::new(),
            timestamp: Utc::now(),
            pinned: false,
        }
    }

    #[test]
    fn test_resolve_id_unique_prefix() {
        let history = vec![
            entry_with_id("aaaa1111-0000-4000-8000-000000000000"),
            entry_with_id("bbbb2222-0000-4000-8000-000000000000"),
        ];

        let id = resolve_id(&history, "AAAA").expect("should resolve");
        assert_eq!(id, history[0].id);
    }

    #[test]
    fn test_resolve_id_ambiguous() {
        let history = vec![
            entry_with_id("abcd1111-0000-4000-8000-000000000000"),
            entry_with_id("abcd2222-0000-4000-8000-000000000000"),
        ];

        let err = resolve_id(&history, "abcd").unwrap_err();
        assert!(err.to_string().contains("2 entries match"));
    }

    #[test]
    fn test_resolve_id_missing() {
        let history = vec![entry_with_id("abcd1111-0000-4000-8000-000000000000")];

        assert!(resolve_id(&history, "ffff").is_err());
        assert!(resolve_id(&history, "  ").is_err());
    }
}
