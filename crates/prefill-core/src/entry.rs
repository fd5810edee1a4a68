//! The [`Entry`] struct — a stored value record.
//!
//! Entries are the only cross-tab-shared data in the system. The durable
//! collection lives in the store; everything the resolver holds is a
//! disposable snapshot of it.

use serde::{Deserialize, Serialize};

/// Matching strategy of a stored entry.
///
/// The wire format uses the camelCase names the extension sends
/// (`fieldOnly`, `url`, `domain`, `all`, `urlPattern`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextScope {
    /// Matches a specific form field (bare selector or scoped triple key).
    FieldOnly,
    /// Matches one exact URL.
    Url,
    /// Matches every page on one origin.
    Domain,
    /// Matches everywhere.
    All,
    /// Matches URLs (and optionally fields) against a wildcard pattern.
    UrlPattern,
}

impl ContextScope {
    /// Stable string form, used for storage and logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FieldOnly => "fieldOnly",
            Self::Url => "url",
            Self::Domain => "domain",
            Self::All => "all",
            Self::UrlPattern => "urlPattern",
        }
    }

    /// Parse the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fieldOnly" => Some(Self::FieldOnly),
            "url" => Some(Self::Url),
            "domain" => Some(Self::Domain),
            "all" => Some(Self::All),
            "urlPattern" => Some(Self::UrlPattern),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContextScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored value record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique entry ID (`ent_` + UUID v7), assigned at creation, immutable.
    pub id: String,
    /// Text payload applied into a field.
    pub value: String,
    /// Optional display override for menus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Matching strategy.
    #[serde(rename = "contextType")]
    pub scope: ContextScope,
    /// Strategy-specific key. `None` means the entry never matches,
    /// except under [`ContextScope::All`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_key: Option<String>,
    /// Normalized keyboard combo, unique across entries when present.
    /// Collisions are rejected by the store at write time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    /// Explicit sort position. Takes precedence over `created_at`.
    #[serde(rename = "order", skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    /// Creation time in unix milliseconds.
    pub created_at: i64,
}

impl Entry {
    /// The key used to break specificity ties: `sort_order` when set,
    /// otherwise `created_at`.
    pub fn order_key(&self) -> i64 {
        self.sort_order.unwrap_or(self.created_at)
    }

    /// Display label when set and non-empty.
    pub fn display_label(&self) -> Option<&str> {
        self.label.as_deref().filter(|l| !l.is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
