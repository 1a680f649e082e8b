//! Core data models for copycache
//!
//! These are the records persisted in the history blob and exchanged
//! with capture clients over the daemon socket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single captured clipboard item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique identifier, assigned at insert time
    pub id: Uuid,

    /// The captured text
    pub content: String,

    /// Content classification
    #[serde(rename = "type")]
    pub kind: EntryType,

    /// Where the content was copied from (page URL, application), may be empty
    #[serde(default)]
    pub source: String,

    /// When the content was captured
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Pinned entries are exempt from capacity eviction
    #[serde(default)]
    pub pinned: bool,
}

/// The classification of an entry's content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// A single URL (`http://`, `https://` or `www.`).
    Url,
    /// Anything else.
    Text,
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryType::Url => write!(f, "url"),
            EntryType::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "url" => Ok(EntryType::Url),
            "text" => Ok(EntryType::Text),
            other => Err(format!("unknown entry type '{other}'")),
        }
    }
}

/// Raw captured content as delivered by a capture client.
///
/// Everything except `content` is optional and filled in at insert time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewEntry {
    /// The captured text
    pub content: String,

    /// Explicit classification; the classifier decides when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntryType>,

    /// Origin of the copy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Capture time in Unix milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl NewEntry {
    /// Creates a request carrying only content.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// The whole ordered history, head (most recent) first.
pub type History = Vec<Entry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wire_shape() {
        let entry = Entry {
            id: Uuid::new_v4(),
            content: "https://example.com".to_string(),
            kind: EntryType::Url,
            source: String::new(),
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_123).unwrap(),
            pinned: false,
        };

        let json = serde_json::to_string(&entry).expect("Failed to serialize");
        assert!(json.contains("\"type\":\"url\""));
        assert!(json.contains("\"timestamp\":1700000000123"));
        assert!(json.contains("\"pinned\":false"));
    }

    #[test]
    fn test_entry_missing_optional_fields() {
        let json = r#"{"id":"6f1c1d2e-8a3b-4c5d-9e6f-7a8b9c0d1e2f","content":"hi","type":"text","timestamp":0}"#;
        let entry: Entry = serde_json::from_str(json).expect("Failed to parse");
        assert_eq!(entry.source, "");
        assert!(!entry.pinned);
    }

    #[test]
    fn test_new_entry_accepts_partial_payload() {
        let request: NewEntry =
            serde_json::from_str(r#"{"content":"hello","type":"text"}"#).expect("Failed to parse");
        assert_eq!(request.content, "hello");
        assert_eq!(request.kind, Some(EntryType::Text));
        assert!(request.source.is_none());
        assert!(request.timestamp.is_none());
    }

    #[test]
    fn test_entry_type_from_str() {
        assert_eq!("URL".parse::<EntryType>(), Ok(EntryType::Url));
        assert_eq!("text".parse::<EntryType>(), Ok(EntryType::Text));
        assert!("image".parse::<EntryType>().is_err());
    }
}
