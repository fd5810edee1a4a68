//! Settings loading: compiled defaults ← user file ← env overrides.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::errors::Result;
use crate::types::PrefillSettings;

/// Directory holding user data (`~/.prefill`).
pub fn data_dir() -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(".prefill")
}

/// Path of the user settings file (`~/.prefill/settings.json`).
pub fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

/// Default database path (`~/.prefill/entries.db`).
pub fn default_db_path() -> PathBuf {
    data_dir().join("entries.db")
}

/// Load settings from the default path with env overrides applied.
///
/// A missing file is not an error — defaults apply.
pub fn load_settings() -> Result<PrefillSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific file with env overrides applied.
pub fn load_settings_from_path(path: &Path) -> Result<PrefillSettings> {
    let mut merged = serde_json::to_value(PrefillSettings::default())?;

    if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&raw)?;
        deep_merge(&mut merged, &user);
    }

    let mut settings: PrefillSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate();
    Ok(settings)
}

/// Recursively merge `overlay` into `base`. Objects merge key-by-key;
/// everything else (including arrays) is replaced wholesale.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        let _ = base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, _) => *base_slot = overlay.clone(),
    }
}

/// Apply `PREFILL_*` environment variable overrides (highest priority).
fn apply_env_overrides(settings: &mut PrefillSettings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

/// Override application, parameterized over the variable source so it is
/// testable without mutating process environment.
fn apply_overrides(settings: &mut PrefillSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(port) = var("PREFILL_WS_PORT") {
        match port.parse() {
            Ok(port) => settings.server.ws_port = port,
            Err(_) => warn!(value = %port, "invalid PREFILL_WS_PORT, ignoring"),
        }
    }
    if let Some(host) = var("PREFILL_HOST") {
        settings.server.host = host;
    }
    if let Some(path) = var("PREFILL_DB_PATH") {
        settings.storage.db_path = path;
    }
    if let Some(level) = var("PREFILL_LOG") {
        settings.logging.level = level;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
