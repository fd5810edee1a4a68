//! Per-tab page-context tracking.
//!
//! One [`PageContext`] per tab, held in an explicit keyed map owned by
//! the coordinator. Contexts are never shared across tabs; entries are
//! the only cross-tab data in the system.

use std::collections::HashMap;

use prefill_core::context::{PageContext, TabId};

/// Keyed map of each tab's last-known page/field context.
#[derive(Debug, Default)]
pub struct TabTracker {
    tabs: HashMap<TabId, PageContext>,
}

impl TabTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a navigation: derive a fresh context from the URL alone.
    ///
    /// The selector starts empty, but when the new origin+pathname equal
    /// the prior ones for this tab the known selector is preserved —
    /// hash changes and SPA re-renders must not erase an already-known
    /// field. Returns the stored context.
    pub fn set_from_navigation(&mut self, tab_id: TabId, url: &str) -> &PageContext {
        let mut next = PageContext::from_url(url);
        if let Some(prev) = self.tabs.get(&tab_id) {
            if prev.same_page(&next) {
                next.selector = prev.selector.clone();
            }
        }
        let _ = self.tabs.insert(tab_id, next);
        &self.tabs[&tab_id]
    }

    /// Record a field interaction or explicit page report: replace the
    /// stored context wholesale.
    pub fn set_from_interaction(&mut self, tab_id: TabId, context: PageContext) {
        let _ = self.tabs.insert(tab_id, context);
    }

    /// Whether an interaction reports the same selector already recorded
    /// for the tab. Identical consecutive selectors short-circuit before
    /// any resolution work, bounding load under rapid mouse movement.
    pub fn is_duplicate_interaction(&self, tab_id: TabId, context: &PageContext) -> bool {
        self.tabs
            .get(&tab_id)
            .is_some_and(|prev| prev.selector == context.selector)
    }

    /// The tab's current context, if tracked.
    pub fn get(&self, tab_id: TabId) -> Option<&PageContext> {
        self.tabs.get(&tab_id)
    }

    /// Drop a closed tab's context. Returns it if one was tracked.
    pub fn remove(&mut self, tab_id: TabId) -> Option<PageContext> {
        self.tabs.remove(&tab_id)
    }

    /// IDs of all tracked tabs.
    pub fn tab_ids(&self) -> Vec<TabId> {
        self.tabs.keys().copied().collect()
    }

    /// Number of tracked tabs.
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Whether no tabs are tracked.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
