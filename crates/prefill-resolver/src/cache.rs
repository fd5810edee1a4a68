//! Snapshot cache of the durable entry list.
//!
//! Field hover/focus events arrive at sub-100ms cadence and must not pay
//! a storage round-trip each time. The cache holds the last snapshot the
//! store reported; it is replaced wholesale on every mutation signal
//! (never patched incrementally), so staleness is bounded by the store's
//! notification latency, not by event frequency.
//!
//! Context keys are parsed here, once per snapshot, so the matcher never
//! re-inspects raw strings on the hot path.

use std::sync::Arc;

use parking_lot::RwLock;
use prefill_core::entry::Entry;
use prefill_core::key::ContextKey;

/// An entry paired with its parsed context key.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    /// The stored record.
    pub entry: Entry,
    /// Parsed matching strategy.
    pub key: ContextKey,
}

impl CachedEntry {
    /// Parse the entry's context key and pair them up.
    pub fn new(entry: Entry) -> Self {
        let key = ContextKey::parse(entry.scope, entry.context_key.as_deref());
        Self { entry, key }
    }
}

/// Invalidation-driven cache of the entry collection.
///
/// `get` never blocks on storage and never triggers a read — before the
/// first snapshot arrives it simply reports an empty collection.
pub struct EntryCache {
    snapshot: RwLock<Option<Arc<[CachedEntry]>>>,
}

impl EntryCache {
    /// Create an empty (invalid) cache.
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
        }
    }

    /// The current snapshot, or an empty collection while invalid.
    pub fn get(&self) -> Arc<[CachedEntry]> {
        self.snapshot
            .read()
            .clone()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    /// Replace the snapshot atomically and mark the cache valid.
    ///
    /// Called whenever the store reports a change. Resolutions already
    /// holding the previous `Arc` keep observing it; anything that starts
    /// after this returns sees the new snapshot.
    pub fn invalidate(&self, entries: Vec<Entry>) {
        let parsed: Vec<CachedEntry> = entries.into_iter().map(CachedEntry::new).collect();
        *self.snapshot.write() = Some(Arc::from(parsed));
    }

    /// Whether a snapshot has been installed.
    pub fn is_valid(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Entries in the current snapshot (0 while invalid).
    pub fn len(&self) -> usize {
        self.snapshot.read().as_ref().map_or(0, |s| s.len())
    }

    /// Whether the current snapshot is empty (also true while invalid).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EntryCache {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use prefill_core::entry::ContextScope;

    fn entry(id: &str) -> Entry {
        Entry {
            id: id.into(),
            value: "v".into(),
            label: None,
            scope: ContextScope::All,
            context_key: None,
            shortcut: None,
            sort_order: None,
            created_at: 1,
        }
    }

    #[test]
    fn starts_invalid_and_empty() {
        let cache = EntryCache::new();
        assert!(!cache.is_valid());
        assert!(cache.is_empty());
        assert!(cache.get().is_empty());
    }

    #[test]
    fn invalidate_installs_snapshot() {
        let cache = EntryCache::new();
        cache.invalidate(vec![entry("a"), entry("b")]);
        assert!(cache.is_valid());
        assert_eq!(cache.len(), 2);
        let snapshot = cache.get();
        assert_eq!(snapshot[0].entry.id, "a");
        assert_eq!(snapshot[1].entry.id, "b");
    }

    #[test]
    fn invalidate_replaces_wholesale() {
        let cache = EntryCache::new();
        cache.invalidate(vec![entry("old_1"), entry("old_2")]);
        cache.invalidate(vec![entry("new")]);

        let snapshot = cache.get();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].entry.id, "new");
    }

    #[test]
    fn invalidate_with_empty_list_stays_valid() {
        let cache = EntryCache::new();
        cache.invalidate(vec![entry("a")]);
        cache.invalidate(Vec::new());
        assert!(cache.is_valid());
        assert!(cache.is_empty());
    }

    #[test]
    fn held_snapshot_survives_replacement() {
        let cache = EntryCache::new();
        cache.invalidate(vec![entry("a")]);
        let held = cache.get();

        cache.invalidate(vec![entry("b")]);
        // The in-flight reader keeps the old snapshot…
        assert_eq!(held[0].entry.id, "a");
        // …while new readers see the replacement.
        assert_eq!(cache.get()[0].entry.id, "b");
    }

    #[test]
    fn keys_parsed_at_snapshot_time() {
        let cache = EntryCache::new();
        let mut e = entry("a");
        e.scope = ContextScope::FieldOnly;
        e.context_key = Some("#q".into());
        cache.invalidate(vec![e]);

        let snapshot = cache.get();
        assert!(snapshot[0].key.carries_selector());
    }
}
