//! Wildcard pattern compiler.
//!
//! Context keys use shell-style wildcards: `*` matches any run of
//! characters (including none), `?` matches exactly one. Everything else
//! is literal — all regex metacharacters are escaped before the pattern
//! is handed to the regex engine, and the result is anchored at both ends.
//!
//! Compilation failures are ordinary values ([`GlobError`]); matching code
//! treats a pattern that failed to compile as "matches nothing".

use regex::Regex;
use thiserror::Error;

use crate::constants::MAX_PATTERN_CHARS;

/// Error building a [`Glob`] from a wildcard pattern.
#[derive(Debug, Error)]
pub enum GlobError {
    /// Pattern exceeds [`MAX_PATTERN_CHARS`].
    #[error("pattern too long: {len} chars (max {max})")]
    TooLong {
        /// Actual pattern length in characters.
        len: usize,
        /// The enforced maximum.
        max: usize,
    },
    /// The regex engine rejected the translated pattern.
    #[error("pattern compilation failed: {0}")]
    Compile(#[from] regex::Error),
}

/// A compiled, fully-anchored wildcard pattern.
#[derive(Clone, Debug)]
pub struct Glob {
    regex: Regex,
    pattern: String,
}

impl Glob {
    /// Compile a wildcard pattern.
    pub fn compile(pattern: &str) -> Result<Self, GlobError> {
        let len = pattern.chars().count();
        if len > MAX_PATTERN_CHARS {
            return Err(GlobError::TooLong {
                len,
                max: MAX_PATTERN_CHARS,
            });
        }

        let mut translated = String::with_capacity(pattern.len() + 2);
        translated.push('^');
        let mut literal = String::new();
        for ch in pattern.chars() {
            match ch {
                '*' | '?' => {
                    translated.push_str(&regex::escape(&literal));
                    literal.clear();
                    translated.push_str(if ch == '*' { ".*" } else { "." });
                }
                other => literal.push(other),
            }
        }
        translated.push_str(&regex::escape(&literal));
        translated.push('$');

        let regex = Regex::new(&translated)?;
        Ok(Self {
            regex,
            pattern: pattern.to_owned(),
        })
    }

    /// Test a value against the pattern (whole-string, case-sensitive).
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// The original wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Whether a key segment contains wildcard characters at all.
pub fn has_wildcards(s: &str) -> bool {
    s.contains(['*', '?'])
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
