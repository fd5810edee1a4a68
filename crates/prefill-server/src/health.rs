//! `/health` endpoint payload.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Health check response body.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
    /// Active WebSocket connections.
    pub connections: usize,
    /// Stored entries (`-1` if the store could not be read).
    pub entries: i64,
}

/// Build the health payload.
pub fn health_check(start_time: Instant, connections: usize, entries: i64) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.elapsed().as_secs(),
        connections,
        entries,
    }
}
