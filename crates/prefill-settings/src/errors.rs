//! Settings error types.

use thiserror::Error;

/// Convenience alias for settings results.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors from settings loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read the settings file.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON.
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
}
