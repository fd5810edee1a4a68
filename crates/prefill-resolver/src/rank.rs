//! Specificity ranking — the total order used for every presentation list.
//!
//! Narrowest context first: a field-specific entry always outranks an
//! exact-URL entry, which outranks an origin-wide one, and so on. Ties
//! break on the user's explicit ordering (or creation time), then on the
//! entry ID so the order is total and independent of insertion order.

use std::cmp::Ordering;

use prefill_core::entry::{ContextScope, Entry};

/// Rank value for a scope. Lower is more specific.
pub fn scope_rank(scope: ContextScope) -> u8 {
    match scope {
        ContextScope::FieldOnly => 0,
        ContextScope::Url => 1,
        ContextScope::Domain => 2,
        ContextScope::All => 3,
        ContextScope::UrlPattern => 4,
    }
}

/// Compare two entries for presentation order.
pub fn compare(a: &Entry, b: &Entry) -> Ordering {
    scope_rank(a.scope)
        .cmp(&scope_rank(b.scope))
        .then_with(|| a.order_key().cmp(&b.order_key()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort entries in place by specificity.
pub fn sort(entries: &mut [Entry]) {
    entries.sort_by(compare);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
