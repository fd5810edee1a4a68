//! Prometheus metrics recorder and `/metrics` endpoint handler.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the handle used to render the `/metrics` endpoint. Returns
/// `None` if a recorder is already installed (tests, embedding).
pub fn install_recorder() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("prometheus metrics recorder installed");
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "metrics recorder not installed");
            None
        }
    }
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric name constants to avoid typos across crates.

/// WebSocket connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Active WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Requests received total (counter, labels: kind).
pub const WS_REQUESTS_TOTAL: &str = "ws_requests_total";
/// Broadcast drops total (counter).
pub const WS_BROADCAST_DROPS_TOTAL: &str = "ws_broadcast_drops_total";
/// Resolver events processed total (counter, labels: kind).
pub const RESOLVER_EVENTS_TOTAL: &str = "resolver_events_total";
/// Resolutions performed total (counter).
pub const RESOLVER_RESOLUTIONS_TOTAL: &str = "resolver_resolutions_total";
/// Resolution duration seconds (histogram).
pub const RESOLVER_RESOLUTION_DURATION_SECONDS: &str = "resolver_resolution_duration_seconds";
/// Cache invalidations total (counter).
pub const RESOLVER_CACHE_INVALIDATIONS_TOTAL: &str = "resolver_cache_invalidations_total";
/// Deduplicated field interactions total (counter).
pub const RESOLVER_INTERACTIONS_DEDUPED_TOTAL: &str = "resolver_interactions_deduped_total";
/// Tracked tabs (gauge).
pub const RESOLVER_TABS_TRACKED: &str = "resolver_tabs_tracked";
