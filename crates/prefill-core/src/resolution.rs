//! Resolution output types — ranked quick slots and grouped menu sections.
//!
//! These are ephemeral wire types: recomputed on demand, pushed to the
//! extension, never persisted.

use serde::{Deserialize, Serialize};

use crate::constants::TITLE_MAX_CHARS;
use crate::entry::Entry;
use crate::text::truncate_with_suffix;

/// One compact presentation slot for a matched entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSlot {
    /// The matched entry's ID.
    pub entry_id: String,
    /// Presentation title: label, or the quoted value, truncated, with
    /// the shortcut appended when one is set.
    pub title: String,
    /// The raw value to apply.
    pub value: String,
    /// Keyboard shortcut, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
}

impl QuickSlot {
    /// Build the slot for an entry.
    pub fn for_entry(entry: &Entry) -> Self {
        Self {
            entry_id: entry.id.clone(),
            title: slot_title(entry),
            value: entry.value.clone(),
            shortcut: entry.shortcut.clone(),
        }
    }
}

/// Presentation title for an entry: the label when set, otherwise the
/// value in quotes (`"(empty value)"` when both are empty), truncated to
/// [`TITLE_MAX_CHARS`] characters with an ellipsis, then suffixed with
/// the shortcut in parentheses when one is set.
pub fn slot_title(entry: &Entry) -> String {
    let base = match entry.display_label() {
        Some(label) => label.to_owned(),
        None if entry.value.is_empty() => "\"(empty value)\"".to_owned(),
        None => format!("\"{}\"", entry.value),
    };
    let mut title = truncate_with_suffix(&base, TITLE_MAX_CHARS, "…");
    if let Some(shortcut) = entry.shortcut.as_deref().filter(|s| !s.is_empty()) {
        title.push_str(&format!(" ({shortcut})"));
    }
    title
}

/// Matches grouped by category for the floating menu.
///
/// `field` is uncapped — field-specific entries are the primary,
/// expected-to-be-few matches. The broader groups are each capped so the
/// menu cannot overflow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sections {
    /// Entries targeting the focused field specifically.
    pub field: Vec<Entry>,
    /// Exact-URL matches.
    pub url: Vec<Entry>,
    /// Origin-wide matches.
    pub domain: Vec<Entry>,
    /// Pattern matches that do not name a field.
    pub custom: Vec<Entry>,
    /// Global matches.
    pub all: Vec<Entry>,
}

impl Sections {
    /// Total entries across all groups.
    pub fn len(&self) -> usize {
        self.field.len() + self.url.len() + self.domain.len() + self.custom.len() + self.all.len()
    }

    /// Whether every group is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The full output of one resolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Every entry whose context applies, in snapshot order.
    pub matches: Vec<Entry>,
    /// Top-ranked matches for the compact presentation, capped.
    pub quick_slots: Vec<QuickSlot>,
    /// Matches grouped for the floating menu.
    pub sections: Sections,
    /// Whether field-level interaction events are worth instrumenting on
    /// this page at all.
    pub predictive_tracking_needed: bool,
}

impl MatchResult {
    /// The empty result (no context, or nothing stored).
    pub fn empty() -> Self {
        Self::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
