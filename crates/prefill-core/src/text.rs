//! Character-safe string truncation for presentation titles.
//!
//! Truncation here counts characters, not bytes — titles are capped for
//! on-screen width, and slicing byte-wise would panic inside multi-byte
//! characters.

/// Truncate a string to at most `max_chars` characters.
///
/// Returns a borrowed prefix; no allocation when the string already fits.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate `s` to `max_chars` characters, ending with `suffix` when the
/// original exceeds the limit.
///
/// The suffix counts toward the limit, so the result is never longer than
/// `max_chars` characters.
pub fn truncate_with_suffix(s: &str, max_chars: usize, suffix: &str) -> String {
    if s.chars().count() <= max_chars {
        return s.to_owned();
    }
    let body_budget = max_chars.saturating_sub(suffix.chars().count());
    format!("{}{suffix}", truncate_chars(s, body_budget))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
