//! # prefill-settings
//!
//! Layered configuration for the Prefill service.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`PrefillSettings::default()`]
//! 2. **User file** — `~/.prefill/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `PREFILL_*` overrides (highest priority)
//!
//! The global singleton is reloadable: when the extension writes new
//! values through the settings surface, [`reload_settings_from_path`]
//! swaps the cached value so all subsequent [`get_settings`] calls return
//! fresh data.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    data_dir, deep_merge, default_db_path, load_settings, load_settings_from_path, settings_path,
};
pub use types::*;

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

/// Global settings singleton.
///
/// `RwLock<Option<Arc<…>>>` instead of `OnceLock` so the cached value can
/// be swapped after a settings update. Reads are cheap (shared lock +
/// `Arc::clone`); writes only happen on reload, which is rare.
static SETTINGS: RwLock<Option<Arc<PrefillSettings>>> = RwLock::new(None);

/// Get the global settings instance.
///
/// On first call, loads from `~/.prefill/settings.json` with env
/// overrides. If loading fails, returns compiled defaults. Returns an
/// `Arc` so callers hold a consistent snapshot even across a concurrent
/// reload.
pub fn get_settings() -> Arc<PrefillSettings> {
    {
        let guard = SETTINGS.read();
        if let Some(ref settings) = *guard {
            return Arc::clone(settings);
        }
    }

    let mut guard = SETTINGS.write();
    // Another thread may have initialized while we waited for the lock.
    if let Some(ref settings) = *guard {
        return Arc::clone(settings);
    }

    let settings = Arc::new(match load_settings() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            PrefillSettings::default()
        }
    });
    *guard = Some(Arc::clone(&settings));
    settings
}

/// Initialize the global settings with a specific value.
///
/// Replaces any previously cached settings. Useful for tests and startup
/// paths where CLI flags already decided the configuration.
pub fn init_settings(settings: PrefillSettings) {
    *SETTINGS.write() = Some(Arc::new(settings));
}

/// Reload settings from a specific file path and swap the global cache.
pub fn reload_settings_from_path(path: &Path) {
    let fresh = Arc::new(match load_settings_from_path(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, ?path, "failed to reload settings, falling back to defaults");
            PrefillSettings::default()
        }
    });
    *SETTINGS.write() = Some(fresh);
    tracing::info!(?path, "settings reloaded from disk");
}

/// Reset the global settings cache (test-only).
#[cfg(test)]
pub(crate) fn reset_settings() {
    *SETTINGS.write() = None;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
