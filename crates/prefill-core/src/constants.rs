//! Presentation limits shared across the resolver and its consumers.

/// Maximum number of ranked matches surfaced as quick slots.
pub const QUICK_SLOT_CAP: usize = 10;

/// Maximum entries per capped floating-menu section (`url`, `domain`,
/// `custom`, `all`). The `field` section is uncapped.
pub const SECTION_CAP: usize = 5;

/// Maximum quick-slot title length in characters (including the ellipsis).
pub const TITLE_MAX_CHARS: usize = 32;

/// Maximum accepted wildcard pattern length. Longer keys never match
/// instead of feeding unbounded input to the regex compiler.
pub const MAX_PATTERN_CHARS: usize = 2048;
