//! Inbound resolver events.
//!
//! Every signal that can change resolver state or demand a resolution is
//! one variant of [`ResolverEvent`]; the coordinator dispatches with an
//! exhaustive `match`, so adding a variant is a compile error until every
//! consumer handles it.

use tokio::sync::oneshot;

use prefill_core::context::{PageContext, TabId};
use prefill_core::entry::Entry;
use prefill_core::resolution::MatchResult;

/// An inbound event for the resolver coordinator.
#[derive(Debug)]
pub enum ResolverEvent {
    /// The durable entry collection changed; `entries` is the fresh
    /// snapshot to install.
    EntriesChanged(Vec<Entry>),
    /// A tab finished navigating to `url`.
    TabNavigated {
        /// Tab that navigated.
        tab_id: TabId,
        /// The new location.
        url: String,
    },
    /// A content script reported a field interaction (hover/focus) with a
    /// complete page context.
    FieldInteraction {
        /// Tab the interaction happened in.
        tab_id: TabId,
        /// Full context including the field selector.
        context: PageContext,
    },
    /// A tab closed; its context can be dropped.
    TabClosed {
        /// The closed tab.
        tab_id: TabId,
    },
    /// An on-demand resolution request (side panel). The result is sent
    /// on `reply`; a dropped receiver is ignored.
    Query {
        /// Tab to resolve for.
        tab_id: TabId,
        /// Channel for the result.
        reply: oneshot::Sender<MatchResult>,
    },
}

impl ResolverEvent {
    /// Stable event name for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EntriesChanged(_) => "entries_changed",
            Self::TabNavigated { .. } => "tab_navigated",
            Self::FieldInteraction { .. } => "field_interaction",
            Self::TabClosed { .. } => "tab_closed",
            Self::Query { .. } => "query",
        }
    }
}
