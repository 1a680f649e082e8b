//! The clipboard history store.
//!
//! Every operation re-reads the full persisted history, applies its change
//! and writes the result back. Nothing is cached between calls, so two
//! stores pointed at the same backend see each other's writes, but
//! concurrent read-modify-write cycles can lose updates. The daemon avoids
//! that by funnelling all operations through [`crate::daemon::writer`].

pub mod eviction;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::classify;
use crate::storage::{Entry, History, KeyValueStore, NewEntry, StorageError};

pub use eviction::evict;

/// Key the history blob is stored under.
pub const HISTORY_KEY: &str = "clipboardHistory";

/// Default maximum number of entries kept.
pub const DEFAULT_CAPACITY: usize = 200;

/// Limits applied by the history store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of entries retained after an insert
    pub capacity: usize,

    /// Skip inserts whose content equals the current head
    pub merge_duplicates: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            merge_duplicates: true,
        }
    }
}

/// Whether an operation changed the persisted history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The history was modified and persisted.
    Mutated,
    /// Nothing matched or nothing needed to change.
    Unchanged,
}

/// The result of a history operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The history after the operation
    pub history: History,
    /// Whether anything changed
    pub status: Status,
}

impl Outcome {
    fn mutated(history: History) -> Self {
        Self {
            history,
            status: Status::Mutated,
        }
    }

    fn unchanged(history: History) -> Self {
        Self {
            history,
            status: Status::Unchanged,
        }
    }

    /// Returns true if the operation modified the history.
    pub fn is_mutated(&self) -> bool {
        self.status == Status::Mutated
    }
}

/// Ordered, capacity-bounded clipboard history over a key-value backend.
pub struct HistoryStore<S> {
    backend: S,
    config: HistoryConfig,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(backend: S, config: HistoryConfig) -> Self {
        Self { backend, config }
    }

    /// Returns the persisted history verbatim, or an empty one.
    pub fn get_all(&self) -> Result<History, StorageError> {
        match self.backend.get(HISTORY_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, history: &History) -> Result<(), StorageError> {
        let json = serde_json::to_string(history)?;
        self.backend.set(HISTORY_KEY, &json)
    }

    /// Prepends captured content to the history.
    ///
    /// Content identical to the current head is not inserted again, and
    /// nothing is inserted while pinned entries fill the whole capacity.
    /// After a successful insert the new entry is the head and the history
    /// is trimmed to capacity without evicting pinned entries.
    pub fn insert(&self, new: NewEntry) -> Result<Outcome, StorageError> {
        let mut history = self.get_all()?;

        if self.config.merge_duplicates {
            if let Some(head) = history.first() {
                if head.content == new.content {
                    tracing::debug!(id = %head.id, "Skipping duplicate of head entry");
                    return Ok(Outcome::unchanged(history));
                }
            }
        }

        // A new entry is unpinned, so it would be the first thing evicted
        let pinned = history.iter().filter(|e| e.pinned).count();
        if pinned >= self.config.capacity {
            tracing::debug!(pinned, "History is full of pinned entries, not inserting");
            return Ok(Outcome::unchanged(history));
        }

        let entry = build_entry(new);
        tracing::debug!(id = %entry.id, kind = %entry.kind, "Inserting entry");
        history.insert(0, entry);

        let history = evict(history, self.config.capacity);
        self.persist(&history)?;
        Ok(Outcome::mutated(history))
    }

    /// Removes the entry with `id`. Unknown ids are a silent no-op.
    pub fn delete_by_id(&self, id: &Uuid) -> Result<Outcome, StorageError> {
        let mut history = self.get_all()?;
        let before = history.len();
        history.retain(|e| e.id != *id);

        if history.len() == before {
            tracing::debug!(%id, "Delete requested for unknown entry");
            return Ok(Outcome::unchanged(history));
        }

        self.persist(&history)?;
        Ok(Outcome::mutated(history))
    }

    /// Flips the pinned flag of the entry with `id`.
    ///
    /// Returns the history as persisted after the flip. Unknown ids leave
    /// the store untouched.
    pub fn toggle_pin(&self, id: &Uuid) -> Result<Outcome, StorageError> {
        let mut history = self.get_all()?;

        let Some(entry) = history.iter_mut().find(|e| e.id == *id) else {
            tracing::debug!(%id, "Pin toggle requested for unknown entry");
            return Ok(Outcome::unchanged(history));
        };
        entry.pinned = !entry.pinned;
        tracing::debug!(%id, pinned = entry.pinned, "Toggled pin");

        self.persist(&history)?;
        Ok(Outcome::mutated(history))
    }

    /// Removes every unpinned entry.
    pub fn clear_unpinned(&self) -> Result<Outcome, StorageError> {
        let mut history = self.get_all()?;
        let before = history.len();
        history.retain(|e| e.pinned);

        self.persist(&history)?;
        if history.len() == before {
            Ok(Outcome::unchanged(history))
        } else {
            Ok(Outcome::mutated(history))
        }
    }
}

/// Fills in the defaults of a capture request.
fn build_entry(new: NewEntry) -> Entry {
    let kind = new.kind.unwrap_or_else(|| classify(&new.content));
    let timestamp = match new.timestamp {
        Some(millis) => DateTime::from_timestamp_millis(millis).unwrap_or_else(|| {
            tracing::warn!(millis, "Capture timestamp out of range, using current time");
            Utc::now()
        }),
        None => Utc::now(),
    };

    Entry {
        id: Uuid::new_v4(),
        content: new.content,
        kind,
        source: new.source.unwrap_or_default(),
        timestamp,
        pinned: false,
    }
}
