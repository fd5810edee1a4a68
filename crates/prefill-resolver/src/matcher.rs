//! The matching predicate.
//!
//! `matches` decides whether a cached entry applies to a page/field
//! context. It is pure and total: malformed keys and failed pattern
//! compilations degrade to "does not match" — under-matching is always
//! preferred over an error reaching presentation.

use prefill_core::context::PageContext;
use prefill_core::key::{ContextKey, FieldKey, PatternKey};

use crate::cache::CachedEntry;

/// Whether an entry applies to the given page/field context.
pub fn matches(entry: &CachedEntry, ctx: &PageContext) -> bool {
    match &entry.key {
        ContextKey::Any => true,
        ContextKey::ExactUrl(url) => url == &ctx.url,
        ContextKey::Origin(origin) => origin == &ctx.origin,
        ContextKey::Field(field) => ctx.has_selector() && field_matches(field, ctx),
        ContextKey::Pattern(pattern) => pattern_matches(pattern, ctx),
        ContextKey::Missing => false,
    }
}

fn field_matches(key: &FieldKey, ctx: &PageContext) -> bool {
    match key {
        FieldKey::Selector(pattern) => pattern.matches(&ctx.selector),
        FieldKey::Scoped {
            origin,
            pathname,
            selector,
        } => {
            origin == &ctx.origin
                && pathname.matches(&ctx.pathname)
                && selector.matches(&ctx.selector)
        }
        FieldKey::Literal(raw) => {
            *raw == format!("{}|{}|{}", ctx.origin, ctx.pathname, ctx.selector)
        }
    }
}

fn pattern_matches(key: &PatternKey, ctx: &PageContext) -> bool {
    match key {
        PatternKey::Scoped {
            origin,
            pathname,
            selector,
            url_glob,
        } => {
            if ctx.has_selector() {
                origin.matches(&ctx.origin)
                    && pathname.matches(&ctx.pathname)
                    && selector.matches(&ctx.selector)
            } else {
                url_glob.as_ref().is_some_and(|g| g.is_match(&ctx.url))
            }
        }
        PatternKey::Selector { pattern, url_glob } => {
            if ctx.has_selector() {
                pattern.matches(&ctx.selector)
            } else {
                url_glob.as_ref().is_some_and(|g| g.is_match(&ctx.url))
            }
        }
        PatternKey::Url(glob) => glob.as_ref().is_some_and(|g| g.is_match(&ctx.url)),
    }
}

/// Page-reachability: whether the entry could match *some* field on this
/// page before any selector is known.
///
/// Selector segments are deliberately not checked — they are unknown
/// until the user interacts with a field. This predicate decides whether
/// field-level instrumentation is worth arming on a page at all.
pub fn field_reachable(entry: &CachedEntry, ctx: &PageContext) -> bool {
    match &entry.key {
        ContextKey::Field(FieldKey::Selector(_)) => true,
        ContextKey::Field(FieldKey::Scoped {
            origin, pathname, ..
        }) => origin == &ctx.origin && pathname.matches(&ctx.pathname),
        ContextKey::Pattern(PatternKey::Selector { .. }) => true,
        ContextKey::Pattern(PatternKey::Scoped {
            origin, pathname, ..
        }) => origin.matches(&ctx.origin) && pathname.matches(&ctx.pathname),
        _ => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
