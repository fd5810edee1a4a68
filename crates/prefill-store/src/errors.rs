//! Store error hierarchy.

use thiserror::Error;

/// Convenience alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from the entry store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying `SQLite` failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool failure.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failure.
    #[error("migration failed: {message}")]
    Migration {
        /// What went wrong.
        message: String,
    },

    /// The requested shortcut is already assigned to another entry.
    #[error("shortcut '{shortcut}' is already taken by entry {owner}")]
    ShortcutTaken {
        /// The contested shortcut combo.
        shortcut: String,
        /// ID of the entry holding it.
        owner: String,
    },

    /// No entry with the given ID.
    #[error("entry not found: {id}")]
    NotFound {
        /// The missing entry's ID.
        id: String,
    },

    /// A stored row failed to decode (corrupt or hand-edited database).
    #[error("corrupt entry row: {message}")]
    Corrupt {
        /// Decode failure detail.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = StoreError::ShortcutTaken {
            shortcut: "Ctrl+1".into(),
            owner: "ent_9".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Ctrl+1"));
        assert!(msg.contains("ent_9"));

        let err = StoreError::NotFound { id: "ent_x".into() };
        assert!(err.to_string().contains("ent_x"));
    }
}
