//! Search and filtering over a history snapshot.
//!
//! These functions never touch the store. An empty query or the `all`
//! type filter hands the input back borrowed and untouched; anything else
//! produces the matching subsequence in its original order.
//!
//! The canonical composition is [`search`] followed by [`filter_by_type`],
//! which is what [`apply`] does.

use std::borrow::Cow;
use std::str::FromStr;

use crate::storage::{Entry, EntryType};

/// Which entry types a view should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    /// Every entry.
    #[default]
    All,
    /// Only entries of the given type.
    Only(EntryType),
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(TypeFilter::All);
        }
        s.parse::<EntryType>().map(TypeFilter::Only)
    }
}

impl std::fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeFilter::All => write!(f, "all"),
            TypeFilter::Only(kind) => write!(f, "{kind}"),
        }
    }
}

/// Case-insensitive substring search over entry content.
pub fn search<'a>(history: &'a [Entry], query: &str) -> Cow<'a, [Entry]> {
    if query.trim().is_empty() {
        return Cow::Borrowed(history);
    }

    let needle = query.to_lowercase();
    Cow::Owned(
        history
            .iter()
            .filter(|e| e.content.to_lowercase().contains(&needle))
            .cloned()
            .collect(),
    )
}

/// Keeps entries matching `filter`.
pub fn filter_by_type(history: &[Entry], filter: TypeFilter) -> Cow<'_, [Entry]> {
    match filter {
        TypeFilter::All => Cow::Borrowed(history),
        TypeFilter::Only(kind) => Cow::Owned(
            history
                .iter()
                .filter(|e| e.kind == kind)
                .cloned()
                .collect(),
        ),
    }
}

/// A complete view request.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Substring to search for
    pub text: String,
    /// Type restriction
    pub kind: TypeFilter,
    /// Only show pinned entries
    pub pinned_only: bool,
    /// Maximum number of entries returned
    pub limit: Option<usize>,
}

/// Applies a full query: search, then type filter, then pin and limit.
pub fn apply(history: &[Entry], query: &Query) -> Vec<Entry> {
    let searched = search(history, &query.text);
    let filtered = filter_by_type(&searched, query.kind);

    filtered
        .iter()
        .filter(|e| !query.pinned_only || e.pinned)
        .take(query.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}
