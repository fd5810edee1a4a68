//! Router assembly and the WebSocket serve loop.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use prefill_resolver::Coordinator;
use prefill_store::EntryStore;

use crate::broadcast::BroadcastManager;
use crate::connection::ClientConnection;
use crate::handler;
use crate::health;

/// Per-client outbound channel depth. Resolution payloads are small; a
/// client this far behind is effectively gone.
const CLIENT_CHANNEL_CAPACITY: usize = 64;

/// Server network configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Listen port (0 picks an ephemeral port).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9473,
        }
    }
}

/// Shared state accessible from every handler.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast manager for client fan-out.
    pub broadcast: Arc<BroadcastManager>,
    /// Handle to the resolver task.
    pub coordinator: Coordinator,
    /// The durable entry store.
    pub store: Arc<EntryStore>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus render handle, when the recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "server listening");
    axum::serve(listener, build_router(state)).await
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<health::HealthResponse> {
    let entries = state.store.count().unwrap_or(-1);
    Json(health::health_check(
        state.start_time,
        state.broadcast.connection_count(),
        entries,
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map_or_else(String::new, crate::metrics::render)
}

/// GET /ws — WebSocket upgrade.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection lifecycle: register, pump, clean up.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<String>>(CLIENT_CHANNEL_CAPACITY);
    let conn = Arc::new(ClientConnection::new(format!("conn_{}", Uuid::now_v7()), tx));

    state.broadcast.add(Arc::clone(&conn)).await;
    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").set(state.broadcast.connection_count() as f64);
    debug!(conn_id = %conn.id, "client connected");

    // Writer: drain the connection's channel into the socket.
    let write_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink
                .send(Message::Text(String::clone(&message).into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // Reader: dispatch inbound frames until the client goes away.
    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                if let Some(response) = handler::handle_message(text.as_str(), &state, &conn).await
                {
                    match serde_json::to_string(&response) {
                        Ok(json) => {
                            let _ = conn.send(Arc::new(json));
                        }
                        Err(e) => warn!(error = %e, "failed to serialize response"),
                    }
                }
            }
            Message::Close(_) => break,
            // Ping/pong are answered by the protocol layer; binary frames
            // are not part of this protocol.
            Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => {}
        }
    }

    state.broadcast.remove(&conn.id).await;
    write_task.abort();
    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").set(state.broadcast.connection_count() as f64);
    debug!(conn_id = %conn.id, age_secs = conn.age().as_secs(), "client disconnected");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test support
// ─────────────────────────────────────────────────────────────────────────────


// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
