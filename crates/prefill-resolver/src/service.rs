//! Resolution — from a page context and an entry snapshot to the full
//! presentation payload.

use prefill_core::constants::{QUICK_SLOT_CAP, SECTION_CAP};
use prefill_core::context::PageContext;
use prefill_core::entry::{ContextScope, Entry};
use prefill_core::resolution::{MatchResult, QuickSlot, Sections};

use crate::cache::CachedEntry;
use crate::{matcher, rank};

/// Resolve which entries apply to a page/field context.
///
/// Returns the full match list (snapshot order), the ranked quick slots
/// (capped), the grouped floating-menu sections, and whether field-level
/// predictive tracking should be armed for the page. With no context
/// there is nothing to match: the result is empty and tracking is off.
pub fn resolve(ctx: Option<&PageContext>, entries: &[CachedEntry]) -> MatchResult {
    let Some(ctx) = ctx else {
        return MatchResult::empty();
    };

    let matched: Vec<&CachedEntry> = entries
        .iter()
        .filter(|entry| matcher::matches(entry, ctx))
        .collect();

    let mut ranked = matched.clone();
    ranked.sort_by(|a, b| rank::compare(&a.entry, &b.entry));

    let quick_slots: Vec<QuickSlot> = ranked
        .iter()
        .take(QUICK_SLOT_CAP)
        .map(|entry| QuickSlot::for_entry(&entry.entry))
        .collect();

    let sections = group_sections(&ranked);

    let predictive_tracking_needed = entries
        .iter()
        .any(|entry| matcher::field_reachable(entry, ctx));

    MatchResult {
        matches: matched.into_iter().map(|e| e.entry.clone()).collect(),
        quick_slots,
        sections,
        predictive_tracking_needed,
    }
}

/// Group ranked matches into floating-menu sections.
///
/// `field` collects everything targeting the focused field specifically:
/// `fieldOnly` entries plus pattern entries whose key structurally names
/// a selector. Remaining pattern matches land in `custom`. All groups
/// except `field` are capped.
fn group_sections(ranked: &[&CachedEntry]) -> Sections {
    let mut sections = Sections::default();
    for cached in ranked {
        let entry = &cached.entry;
        match entry.scope {
            ContextScope::FieldOnly => sections.field.push(entry.clone()),
            ContextScope::Url => push_capped(&mut sections.url, entry.clone()),
            ContextScope::Domain => push_capped(&mut sections.domain, entry.clone()),
            ContextScope::All => push_capped(&mut sections.all, entry.clone()),
            ContextScope::UrlPattern => {
                if cached.key.carries_selector() {
                    sections.field.push(entry.clone());
                } else {
                    push_capped(&mut sections.custom, entry.clone());
                }
            }
        }
    }
    sections
}

fn push_capped(group: &mut Vec<Entry>, entry: Entry) {
    if group.len() < SECTION_CAP {
        group.push(entry);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
