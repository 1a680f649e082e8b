//! Wire protocol spoken over the daemon socket.
//!
//! Each connection carries one newline-terminated JSON request and gets
//! one newline-terminated JSON response back. Requests are tagged by
//! `type`; anything that doesn't decode into a [`Request`] is answered
//! with an error response.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::DaemonStats;
use crate::history::Status;
use crate::storage::{History, NewEntry};

/// Payload identifying a single entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdPayload {
    pub id: Uuid,
}

/// Requests accepted by the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    /// Record captured content.
    SaveEntry { payload: NewEntry },
    /// Remove one entry.
    DeleteEntry { payload: IdPayload },
    /// Flip an entry's pinned flag.
    TogglePin { payload: IdPayload },
    /// Remove all unpinned entries.
    ClearHistory,
    /// Fetch the full history.
    GetHistory,
    /// Check the daemon is responsive.
    Ping,
    /// Request the daemon's current status.
    Status,
    /// Request runtime statistics.
    Stats,
    /// Ask the daemon to shut down.
    Stop,
}

impl Request {
    pub fn save(payload: NewEntry) -> Self {
        Request::SaveEntry { payload }
    }

    pub fn delete(id: Uuid) -> Self {
        Request::DeleteEntry {
            payload: IdPayload { id },
        }
    }

    pub fn toggle_pin(id: Uuid) -> Self {
        Request::TogglePin {
            payload: IdPayload { id },
        }
    }
}

/// Responses sent back by the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The history after a history request.
    History { status: Status, entries: History },
    /// Ping response.
    Pong,
    /// Status response indicating daemon is running.
    Status {
        running: bool,
        pid: u32,
        uptime_seconds: u64,
    },
    /// Runtime statistics.
    Stats(DaemonStats),
    /// Acknowledgment that stop command was received.
    Stopping,
    /// The request was rejected or failed.
    Error { error: String },
}

/// A request line that could not be understood.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Nothing but whitespace was received.
    #[error("Empty request")]
    Empty,

    /// The line isn't a known request shape.
    #[error("Invalid request: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A capture timestamp that no date can represent.
    #[error("Timestamp out of range: {0}")]
    Timestamp(i64),
}

/// Decodes one request line.
pub fn parse_request(line: &str) -> Result<Request, ValidationError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ValidationError::Empty);
    }
    let request: Request = serde_json::from_str(line)?;

    if let Request::SaveEntry { payload } = &request {
        if let Some(millis) = payload.timestamp {
            if DateTime::from_timestamp_millis(millis).is_none() {
                return Err(ValidationError::Timestamp(millis));
            }
        }
    }

    Ok(request)
}
