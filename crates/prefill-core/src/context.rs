//! The [`PageContext`] struct — the situational key a resolution is
//! computed against.
//!
//! One `PageContext` exists per tab. It is replaced wholesale on
//! navigation, has its selector updated on field interaction, and is
//! discarded when the tab closes.

use serde::{Deserialize, Serialize};
use url::Url;

/// Browser tab identifier.
pub type TabId = i64;

/// The URL/origin/pathname/selector tuple resolution evaluates against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageContext {
    /// Full URL of the page.
    pub url: String,
    /// Scheme + host (+ non-default port), e.g. `https://sub.example.com`.
    pub origin: String,
    /// Path component, e.g. `/checkout`.
    pub pathname: String,
    /// Stable structural locator of the focused field; empty when no
    /// field is in focus.
    pub selector: String,
}

impl PageContext {
    /// Derive a context from a URL alone (selector empty).
    ///
    /// Unparseable URLs degrade to empty origin/pathname rather than
    /// erroring — the worst case is that origin- and path-scoped entries
    /// fail to match on that page.
    pub fn from_url(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(parsed) => Self {
                url: raw.to_owned(),
                origin: parsed.origin().ascii_serialization(),
                pathname: parsed.path().to_owned(),
                selector: String::new(),
            },
            Err(_) => Self {
                url: raw.to_owned(),
                ..Self::default()
            },
        }
    }

    /// Whether `other` refers to the same page: equal origin and pathname.
    ///
    /// Hash changes and SPA re-renders keep origin+pathname stable, so
    /// this is the signal for preserving an already-known field selector
    /// across navigation noise.
    pub fn same_page(&self, other: &Self) -> bool {
        self.origin == other.origin && self.pathname == other.pathname
    }

    /// Whether a field selector is known.
    pub fn has_selector(&self) -> bool {
        !self.selector.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_url_basic() {
        let ctx = PageContext::from_url("https://sub.example.com/checkout?step=2#pay");
        assert_eq!(ctx.url, "https://sub.example.com/checkout?step=2#pay");
        assert_eq!(ctx.origin, "https://sub.example.com");
        assert_eq!(ctx.pathname, "/checkout");
        assert!(ctx.selector.is_empty());
    }

    #[test]
    fn from_url_root_path() {
        let ctx = PageContext::from_url("https://example.com");
        assert_eq!(ctx.pathname, "/");
    }

    #[test]
    fn from_url_keeps_nondefault_port() {
        let ctx = PageContext::from_url("http://localhost:8080/admin");
        assert_eq!(ctx.origin, "http://localhost:8080");
    }

    #[test]
    fn from_url_drops_default_port() {
        let ctx = PageContext::from_url("https://example.com:443/a");
        assert_eq!(ctx.origin, "https://example.com");
    }

    #[test]
    fn from_url_unparseable_degrades() {
        let ctx = PageContext::from_url("not a url");
        assert_eq!(ctx.url, "not a url");
        assert!(ctx.origin.is_empty());
        assert!(ctx.pathname.is_empty());
    }

    #[test]
    fn same_page_ignores_hash_and_query() {
        let a = PageContext::from_url("https://a.com/p?x=1#top");
        let b = PageContext::from_url("https://a.com/p?x=2#bottom");
        assert!(a.same_page(&b));
    }

    #[test]
    fn same_page_differs_on_pathname() {
        let a = PageContext::from_url("https://a.com/p");
        let b = PageContext::from_url("https://a.com/q");
        assert!(!a.same_page(&b));
    }

    #[test]
    fn same_page_differs_on_origin() {
        let a = PageContext::from_url("https://a.com/p");
        let b = PageContext::from_url("https://b.com/p");
        assert!(!a.same_page(&b));
    }

    #[test]
    fn has_selector() {
        let mut ctx = PageContext::from_url("https://a.com/p");
        assert!(!ctx.has_selector());
        ctx.selector = "#email".into();
        assert!(ctx.has_selector());
    }

    #[test]
    fn wire_format_is_camel_case() {
        let ctx = PageContext {
            url: "https://a.com/p".into(),
            origin: "https://a.com".into(),
            pathname: "/p".into(),
            selector: "#q".into(),
        };
        let v = serde_json::to_value(&ctx).unwrap();
        assert_eq!(v["url"], "https://a.com/p");
        assert_eq!(v["origin"], "https://a.com");
        assert_eq!(v["pathname"], "/p");
        assert_eq!(v["selector"], "#q");
    }

    #[test]
    fn partial_wire_input_fills_defaults() {
        let ctx: PageContext =
            serde_json::from_str(r#"{"url":"https://a.com/p"}"#).unwrap();
        assert_eq!(ctx.url, "https://a.com/p");
        assert!(ctx.selector.is_empty());
    }
}
