//! WebSocket wire protocol.
//!
//! Both directions use internally-tagged JSON (`"type": …`) so each
//! message kind is one enum variant and dispatch is an exhaustive
//! `match` — an unknown message is a parse error, not a silently ignored
//! string.

use serde::{Deserialize, Serialize};

use prefill_core::context::{PageContext, TabId};
use prefill_core::entry::{ContextScope, Entry};
use prefill_core::resolution::MatchResult;
use prefill_store::EntryData;

/// Caller-editable entry fields as they appear on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFields {
    /// Text payload.
    pub value: String,
    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Matching strategy.
    #[serde(rename = "contextType")]
    pub scope: ContextScope,
    /// Strategy-specific key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_key: Option<String>,
    /// Optional keyboard shortcut.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    /// Optional explicit sort position.
    #[serde(default, rename = "order", skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

impl EntryFields {
    /// Borrow as the store's write payload.
    pub fn as_data(&self) -> EntryData<'_> {
        EntryData {
            value: &self.value,
            label: self.label.as_deref(),
            scope: self.scope,
            context_key: self.context_key.as_deref(),
            shortcut: self.shortcut.as_deref(),
            sort_order: self.sort_order,
        }
    }
}

/// Messages from the extension to the service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientRequest {
    /// A tab finished navigating.
    #[serde(rename = "tab.navigated")]
    TabNavigated {
        /// Tab that navigated.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// The new location.
        url: String,
    },
    /// A content script reported a field hover/focus with full context.
    #[serde(rename = "field.interaction")]
    FieldInteraction {
        /// Tab the interaction happened in.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// Page context including the field selector.
        context: PageContext,
    },
    /// A tab closed.
    #[serde(rename = "tab.closed")]
    TabClosed {
        /// The closed tab.
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    /// On-demand resolution for a tab (side panel).
    #[serde(rename = "query")]
    Query {
        /// Correlation ID echoed in the response.
        id: String,
        /// Tab to resolve.
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    /// Focus this connection on one tab's updates (`null` to unfocus).
    #[serde(rename = "bind")]
    Bind {
        /// Tab to follow, or `None` for all tabs.
        #[serde(rename = "tabId")]
        tab_id: Option<TabId>,
    },
    /// List the stored entries.
    #[serde(rename = "entries.list")]
    EntriesList {
        /// Correlation ID echoed in the response.
        id: String,
    },
    /// Create an entry.
    #[serde(rename = "entries.create")]
    EntriesCreate {
        /// Correlation ID echoed in the response.
        id: String,
        /// The fields to store.
        entry: EntryFields,
    },
    /// Replace an entry's editable fields.
    #[serde(rename = "entries.update")]
    EntriesUpdate {
        /// Correlation ID echoed in the response.
        id: String,
        /// Entry to update.
        #[serde(rename = "entryId")]
        entry_id: String,
        /// Replacement fields.
        entry: EntryFields,
    },
    /// Delete an entry.
    #[serde(rename = "entries.delete")]
    EntriesDelete {
        /// Correlation ID echoed in the response.
        id: String,
        /// Entry to delete.
        #[serde(rename = "entryId")]
        entry_id: String,
    },
}

impl ClientRequest {
    /// Stable request name for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TabNavigated { .. } => "tab.navigated",
            Self::FieldInteraction { .. } => "field.interaction",
            Self::TabClosed { .. } => "tab.closed",
            Self::Query { .. } => "query",
            Self::Bind { .. } => "bind",
            Self::EntriesList { .. } => "entries.list",
            Self::EntriesCreate { .. } => "entries.create",
            Self::EntriesUpdate { .. } => "entries.update",
            Self::EntriesDelete { .. } => "entries.delete",
        }
    }
}

/// Messages from the service to the extension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// A fresh resolution for one tab (pushed on every relevant change).
    #[serde(rename = "resolution")]
    Resolution {
        /// Tab the resolution applies to.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// The computed result.
        result: MatchResult,
    },
    /// Response to a [`ClientRequest::Query`].
    #[serde(rename = "queryResult")]
    QueryResult {
        /// Echoed correlation ID.
        id: String,
        /// Tab that was resolved.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// The computed result.
        result: MatchResult,
    },
    /// Response to [`ClientRequest::EntriesList`].
    #[serde(rename = "entries")]
    Entries {
        /// Echoed correlation ID.
        id: String,
        /// The full collection.
        entries: Vec<Entry>,
    },
    /// Response to create/update requests.
    #[serde(rename = "entry")]
    Entry {
        /// Echoed correlation ID.
        id: String,
        /// The stored entry.
        entry: Entry,
    },
    /// Response to [`ClientRequest::EntriesDelete`].
    #[serde(rename = "deleted")]
    Deleted {
        /// Echoed correlation ID.
        id: String,
        /// The removed entry's ID.
        #[serde(rename = "entryId")]
        entry_id: String,
    },
    /// A request failed.
    #[serde(rename = "error")]
    Error {
        /// Correlation ID of the failed request, when known.
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Stable machine-readable code.
        code: String,
        /// Human-readable detail.
        message: String,
    },
}

impl ServerMessage {
    /// Build an error message.
    pub fn error(id: Option<String>, code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            id,
            code: code.to_owned(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
