//! Request parsing and dispatch.
//!
//! Each inbound WebSocket text frame parses into a
//! [`ClientRequest`](crate::protocol::ClientRequest) and dispatches
//! through one exhaustive `match`. Failures become typed `error`
//! messages back to the client — a bad request never drops the
//! connection and never panics the service.

use metrics::counter;
use tracing::{debug, instrument, warn};

use prefill_resolver::ResolverEvent;
use prefill_store::StoreError;

use crate::connection::ClientConnection;
use crate::protocol::{ClientRequest, ServerMessage};
use crate::server::AppState;

/// Handle one inbound text frame. Returns the direct response to send,
/// if the request produces one (event-style requests do not).
#[instrument(skip_all)]
pub async fn handle_message(
    text: &str,
    state: &AppState,
    conn: &ClientConnection,
) -> Option<ServerMessage> {
    let request: ClientRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            warn!(conn_id = %conn.id, "invalid request JSON");
            counter!("ws_requests_total", "kind" => "invalid").increment(1);
            return Some(ServerMessage::error(
                None,
                "INVALID_JSON",
                format!("invalid request: {e}"),
            ));
        }
    };

    counter!("ws_requests_total", "kind" => request.kind()).increment(1);
    debug!(conn_id = %conn.id, kind = request.kind(), "dispatching request");
    dispatch(request, state, conn).await
}

async fn dispatch(
    request: ClientRequest,
    state: &AppState,
    conn: &ClientConnection,
) -> Option<ServerMessage> {
    match request {
        ClientRequest::TabNavigated { tab_id, url } => {
            forward(state, ResolverEvent::TabNavigated { tab_id, url }).await
        }
        ClientRequest::FieldInteraction { tab_id, context } => {
            forward(state, ResolverEvent::FieldInteraction { tab_id, context }).await
        }
        ClientRequest::TabClosed { tab_id } => {
            forward(state, ResolverEvent::TabClosed { tab_id }).await
        }
        ClientRequest::Query { id, tab_id } => match state.coordinator.query(tab_id).await {
            Some(result) => Some(ServerMessage::QueryResult { id, tab_id, result }),
            None => Some(ServerMessage::error(
                Some(id),
                "RESOLVER_DOWN",
                "resolver is not running",
            )),
        },
        ClientRequest::Bind { tab_id } => {
            conn.bind_tab(tab_id);
            None
        }
        ClientRequest::EntriesList { id } => Some(match state.store.list() {
            Ok(entries) => ServerMessage::Entries { id, entries },
            Err(e) => store_error(Some(id), &e),
        }),
        ClientRequest::EntriesCreate { id, entry } => {
            Some(match state.store.create(&entry.as_data()) {
                Ok(entry) => ServerMessage::Entry { id, entry },
                Err(e) => store_error(Some(id), &e),
            })
        }
        ClientRequest::EntriesUpdate {
            id,
            entry_id,
            entry,
        } => Some(match state.store.update(&entry_id, &entry.as_data()) {
            Ok(entry) => ServerMessage::Entry { id, entry },
            Err(e) => store_error(Some(id), &e),
        }),
        ClientRequest::EntriesDelete { id, entry_id } => {
            Some(match state.store.delete(&entry_id) {
                Ok(()) => ServerMessage::Deleted { id, entry_id },
                Err(e) => store_error(Some(id), &e),
            })
        }
    }
}

/// Forward an event to the resolver; only a dead resolver produces a
/// response (an error the client can surface).
async fn forward(state: &AppState, event: ResolverEvent) -> Option<ServerMessage> {
    if state.coordinator.send(event).await {
        None
    } else {
        Some(ServerMessage::error(
            None,
            "RESOLVER_DOWN",
            "resolver is not running",
        ))
    }
}

fn store_error(id: Option<String>, error: &StoreError) -> ServerMessage {
    let code = match error {
        StoreError::ShortcutTaken { .. } => "SHORTCUT_TAKEN",
        StoreError::NotFound { .. } => "NOT_FOUND",
        StoreError::Corrupt { .. } => "CORRUPT_ROW",
        StoreError::Sqlite(_) | StoreError::Pool(_) | StoreError::Migration { .. } => "STORE_ERROR",
    };
    warn!(code, error = %error, "request failed");
    ServerMessage::error(id, code, error.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
