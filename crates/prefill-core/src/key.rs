//! Structured context keys.
//!
//! Raw `context_key` strings are parsed **once**, when a snapshot is
//! loaded, into a [`ContextKey`] that names the matching strategy
//! explicitly. The matcher then dispatches on the variant instead of
//! re-inspecting strings on every hover/focus event.
//!
//! Key shapes per scope:
//!
//! - `url` / `domain` — exact-equality strings.
//! - `fieldOnly` — a bare selector (`#email`, `input[name=q*]`), or an
//!   `origin|pathname|selector` triple with exact origin, or — for keys
//!   that look structured but fail the three-part split — a legacy
//!   literal compared against the concatenated page context.
//! - `urlPattern` — the same two field-carrying shapes (origin may be a
//!   wildcard pattern here), each keeping the raw key as a whole-URL glob
//!   fallback for when no field is focused, or a plain whole-URL glob.
//!
//! Malformed keys always degrade to a narrower rule (or to "never
//! matches"); parsing is total.

use crate::entry::ContextScope;
use crate::glob::{Glob, has_wildcards};

/// One segment of a scoped key (pathname or selector position), or a
/// bare selector pattern.
#[derive(Clone, Debug)]
pub enum SegmentPattern {
    /// Matches any value (segment was empty or `*`).
    Any,
    /// Exact string equality.
    Exact(String),
    /// Compiled wildcard pattern; `None` when compilation failed, which
    /// matches nothing.
    Wild(Option<Glob>),
}

impl SegmentPattern {
    /// Parse a segment of an `origin|pathname|selector` triple, where an
    /// empty segment or `*` means "any".
    pub fn scoped(raw: &str) -> Self {
        if raw.is_empty() || raw == "*" {
            Self::Any
        } else if has_wildcards(raw) {
            Self::Wild(Glob::compile(raw).ok())
        } else {
            Self::Exact(raw.to_owned())
        }
    }

    /// Parse a standalone pattern where the empty string stays an exact
    /// (never-matching-nonempty) comparison: bare selectors and
    /// wildcard-capable origins.
    pub fn bare(raw: &str) -> Self {
        if has_wildcards(raw) {
            Self::Wild(Glob::compile(raw).ok())
        } else {
            Self::Exact(raw.to_owned())
        }
    }

    /// Test a value against the segment.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(s) => s == value,
            Self::Wild(Some(glob)) => glob.is_match(value),
            Self::Wild(None) => false,
        }
    }
}

/// `fieldOnly` key strategies.
#[derive(Clone, Debug)]
pub enum FieldKey {
    /// Bare selector: matches the focused field's selector directly, on
    /// any page.
    Selector(SegmentPattern),
    /// `origin|pathname|selector` triple. Origin is exact; pathname and
    /// selector follow [`SegmentPattern::scoped`] rules.
    Scoped {
        /// Exact origin the field must be on.
        origin: String,
        /// Pathname segment.
        pathname: SegmentPattern,
        /// Selector segment.
        selector: SegmentPattern,
    },
    /// Structured-looking key that failed the triple split: compared
    /// verbatim against `origin|pathname|selector` of the page context.
    /// Kept for hand-edited and imported keys.
    Literal(String),
}

/// `urlPattern` key strategies.
#[derive(Clone, Debug)]
pub enum PatternKey {
    /// `origin|pathname|selector` triple with a wildcard-capable origin.
    /// Applies when a field is focused; otherwise the raw key is tested
    /// as a whole-URL glob.
    Scoped {
        /// Origin pattern (exact or wildcard).
        origin: SegmentPattern,
        /// Pathname segment.
        pathname: SegmentPattern,
        /// Selector segment.
        selector: SegmentPattern,
        /// Raw key compiled as a whole-URL glob, for selector-less pages.
        url_glob: Option<Glob>,
    },
    /// Bare selector pattern, with the same whole-URL glob fallback.
    Selector {
        /// Selector pattern.
        pattern: SegmentPattern,
        /// Raw key compiled as a whole-URL glob, for selector-less pages.
        url_glob: Option<Glob>,
    },
    /// Whole-URL glob; `None` when compilation failed (matches nothing).
    Url(Option<Glob>),
}

/// A context key parsed into its matching strategy.
#[derive(Clone, Debug)]
pub enum ContextKey {
    /// Matches every context (`all` scope).
    Any,
    /// Exact URL equality (`url` scope).
    ExactUrl(String),
    /// Exact origin equality (`domain` scope).
    Origin(String),
    /// Field-scoped strategies (`fieldOnly` scope).
    Field(FieldKey),
    /// Pattern strategies (`urlPattern` scope).
    Pattern(PatternKey),
    /// No key stored — never matches.
    Missing,
}

impl ContextKey {
    /// Parse a raw key for the given scope. Total: malformed input
    /// degrades, it never fails.
    pub fn parse(scope: ContextScope, raw: Option<&str>) -> Self {
        if scope == ContextScope::All {
            return Self::Any;
        }
        let Some(raw) = raw else {
            return Self::Missing;
        };
        match scope {
            ContextScope::All => Self::Any,
            ContextScope::Url => Self::ExactUrl(raw.to_owned()),
            ContextScope::Domain => Self::Origin(raw.to_owned()),
            ContextScope::FieldOnly => Self::Field(parse_field_key(raw)),
            ContextScope::UrlPattern => Self::Pattern(parse_pattern_key(raw)),
        }
    }

    /// Whether the key structurally names a field: a bare selector or a
    /// selector-carrying triple. Decides which matches count as "this
    /// exact field" rather than "this page broadly".
    pub fn carries_selector(&self) -> bool {
        match self {
            Self::Field(FieldKey::Selector(_) | FieldKey::Scoped { .. }) => true,
            Self::Pattern(PatternKey::Scoped { .. } | PatternKey::Selector { .. }) => true,
            _ => false,
        }
    }
}

fn is_bare_selector(raw: &str) -> bool {
    !raw.contains('|') && !raw.contains("://")
}

fn parse_field_key(raw: &str) -> FieldKey {
    if is_bare_selector(raw) {
        return FieldKey::Selector(SegmentPattern::bare(raw));
    }
    let parts: Vec<&str> = raw.split('|').collect();
    if let [origin, pathname, selector] = parts[..] {
        FieldKey::Scoped {
            origin: origin.to_owned(),
            pathname: SegmentPattern::scoped(pathname),
            selector: SegmentPattern::scoped(selector),
        }
    } else {
        FieldKey::Literal(raw.to_owned())
    }
}

fn parse_pattern_key(raw: &str) -> PatternKey {
    let parts: Vec<&str> = raw.split('|').collect();
    if let [origin, pathname, selector] = parts[..] {
        return PatternKey::Scoped {
            origin: SegmentPattern::bare(origin),
            pathname: SegmentPattern::scoped(pathname),
            selector: SegmentPattern::scoped(selector),
            url_glob: Glob::compile(raw).ok(),
        };
    }
    if is_bare_selector(raw) {
        return PatternKey::Selector {
            pattern: SegmentPattern::bare(raw),
            url_glob: Glob::compile(raw).ok(),
        };
    }
    PatternKey::Url(Glob::compile(raw).ok())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
