//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON
//! wire format the extension's options page writes. Each type implements
//! [`Default`] with production values, and `#[serde(default)]` allows
//! partial files — missing fields get their defaults.

use serde::{Deserialize, Serialize};

/// Root settings type for the Prefill service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrefillSettings {
    /// Settings schema version.
    pub version: String,
    /// Server network settings.
    pub server: ServerSettings,
    /// Entry database settings.
    pub storage: StorageSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Resolver channel sizing.
    pub resolver: ResolverSettings,
}

impl Default for PrefillSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            logging: LoggingSettings::default(),
            resolver: ResolverSettings::default(),
        }
    }
}

impl PrefillSettings {
    /// Correct invalid values in place rather than rejecting the file —
    /// users get working behavior plus a warning instead of a dead
    /// service.
    pub fn validate(&mut self) {
        if self.resolver.channel_capacity == 0 {
            tracing::warn!("resolver.channelCapacity must be positive, using 1");
            self.resolver.channel_capacity = 1;
        }
        if self.storage.pool_size == 0 {
            tracing::warn!("storage.poolSize must be positive, using 1");
            self.storage.pool_size = 1;
        }
    }
}

/// Server network settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// WebSocket/HTTP port.
    pub ws_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            ws_port: 9473,
        }
    }
}

/// Entry database settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Database file path. Empty means `~/.prefill/entries.db`.
    pub db_path: String,
    /// Connection pool size.
    pub pool_size: u32,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            db_path: String::new(),
            pool_size: 8,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default log filter (overridden by `PREFILL_LOG`).
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Resolver channel sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverSettings {
    /// Event queue and broadcast channel capacity.
    pub channel_capacity: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
