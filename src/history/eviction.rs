//! Capacity enforcement for the clipboard history.
//!
//! Eviction only ever removes unpinned entries. The most recent unpinned
//! entries (in current sequence order) fill whatever capacity the pinned
//! entries leave over, and survivors keep the interleaving they had
//! before eviction rather than being regrouped with pinned entries first.

use crate::storage::Entry;

/// Trims `entries` to `capacity`, never dropping a pinned entry.
///
/// If more entries are pinned than `capacity` allows (possible after the
/// configured capacity is lowered), every pinned entry survives and no
/// unpinned entry does.
pub fn evict(entries: Vec<Entry>, capacity: usize) -> Vec<Entry> {
    if entries.len() <= capacity {
        return entries;
    }

    let pinned = entries.iter().filter(|e| e.pinned).count();
    let max_unpinned = capacity.saturating_sub(pinned);

    let mut kept_unpinned = 0;
    let mut result = Vec::with_capacity(capacity.max(pinned));

    for entry in entries {
        if entry.pinned {
            result.push(entry);
        } else if kept_unpinned < max_unpinned {
            kept_unpinned += 1;
            result.push(entry);
        }
    }

    tracing::debug!(
        kept = result.len(),
        pinned,
        capacity,
        "Evicted unpinned entries over capacity"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EntryType;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(content: &str, pinned: bool) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            content: content.to_string(),
            kind: EntryType::Text,
            source: String::new(),
            timestamp: Utc::now(),
            pinned,
        }
    }

    fn contents(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.content.as_str()).collect()
    }

    #[test]
    fn test_under_capacity_is_untouched() {
        let entries = vec![entry("a", false), entry("b", true)];
        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();

        let result = evict(entries, 3);

        assert_eq!(result.iter().map(|e| e.id).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_drops_oldest_unpinned() {
        let entries = vec![
            entry("d", false),
            entry("c", false),
            entry("b", false),
            entry("a", false),
        ];

        let result = evict(entries, 3);

        assert_eq!(contents(&result), vec!["d", "c", "b"]);
    }

    #[test]
    fn test_pinned_keeps_its_position() {
        let entries = vec![
            entry("d", false),
            entry("c", false),
            entry("b", true),
            entry("a", false),
        ];

        let result = evict(entries, 3);

        assert_eq!(contents(&result), vec!["d", "c", "b"]);
    }

    #[test]
    fn test_pinned_at_tail_survives_over_newer_unpinned() {
        let entries = vec![
            entry("e", false),
            entry("d", false),
            entry("c", false),
            entry("b", false),
            entry("a", true),
        ];

        let result = evict(entries, 3);

        assert_eq!(contents(&result), vec!["e", "d", "a"]);
    }

    #[test]
    fn test_all_slots_pinned_drops_every_unpinned() {
        let entries = vec![
            entry("new", false),
            entry("p1", true),
            entry("old", false),
            entry("p2", true),
        ];

        let result = evict(entries, 2);

        assert_eq!(contents(&result), vec!["p1", "p2"]);
    }

    #[test]
    fn test_more_pinned_than_capacity_keeps_all_pinned() {
        let entries = vec![
            entry("x", false),
            entry("p1", true),
            entry("p2", true),
            entry("p3", true),
        ];

        let result = evict(entries, 2);

        assert_eq!(contents(&result), vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_zero_capacity_keeps_only_pinned() {
        let entries = vec![entry("a", false), entry("b", true)];

        let result = evict(entries, 0);

        assert_eq!(contents(&result), vec!["b"]);
    }

    #[test]
    fn test_survivor_order_matches_input_order() {
        let entries = vec![
            entry("1", false),
            entry("2", true),
            entry("3", false),
            entry("4", true),
            entry("5", false),
            entry("6", false),
            entry("7", true),
        ];
        let before: Vec<Uuid> = entries.iter().map(|e| e.id).collect();

        let result = evict(entries, 5);

        assert_eq!(contents(&result), vec!["1", "2", "3", "4", "7"]);
        let positions: Vec<usize> = result
            .iter()
            .map(|e| before.iter().position(|id| *id == e.id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
