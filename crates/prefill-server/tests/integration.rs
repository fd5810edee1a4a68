//! End-to-end WebSocket flow against a real listening server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use prefill_resolver::Coordinator;
use prefill_server::broadcast::BroadcastManager;
use prefill_server::event_bridge::{spawn_resolution_bridge, spawn_store_bridge};
use prefill_server::{AppState, build_router};
use prefill_store::{ConnectionConfig, EntryStore, new_in_memory, run_migrations};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(10);

async fn start_server() -> String {
    let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
    {
        let conn = pool.get().unwrap();
        let _ = run_migrations(&conn).unwrap();
    }
    let store = Arc::new(EntryStore::new(pool));
    let coordinator = Coordinator::spawn();
    let broadcast = Arc::new(BroadcastManager::new());
    let _ = spawn_store_bridge(&store, coordinator.clone());
    let _ = spawn_resolution_bridge(&coordinator, Arc::clone(&broadcast));
    let state = AppState {
        broadcast,
        coordinator,
        store,
        start_time: Instant::now(),
        metrics: None,
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    }));
    format!("ws://{addr}/ws")
}

async fn connect(url: &str) -> WsClient {
    let (client, _) = connect_async(url).await.unwrap();
    client
}

async fn send(client: &mut WsClient, value: &Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

/// Receive the next JSON text frame.
async fn recv(client: &mut WsClient) -> Value {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            let message = client.next().await.unwrap().unwrap();
            if let Message::Text(text) = message {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    })
    .await
    .expect("timed out waiting for message")
}

/// Receive frames until one matches the predicate, skipping the rest.
async fn recv_until(client: &mut WsClient, predicate: impl Fn(&Value) -> bool) -> Value {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            let value = recv(client).await;
            if predicate(&value) {
                return value;
            }
        }
    })
    .await
    .expect("timed out waiting for matching message")
}

#[tokio::test]
async fn full_resolution_flow() {
    let url = start_server().await;
    let mut client = connect(&url).await;

    // Create an origin-wide entry.
    send(
        &mut client,
        &json!({
            "type": "entries.create",
            "id": "r1",
            "entry": {
                "value": "john@example.com",
                "label": "Email",
                "contextType": "domain",
                "contextKey": "https://a.com"
            }
        }),
    )
    .await;
    let created = recv_until(&mut client, |v| v["type"] == "entry").await;
    assert_eq!(created["id"], "r1");
    let entry_id = created["entry"]["id"].as_str().unwrap().to_owned();
    assert!(entry_id.starts_with("ent_"));

    // Navigate a tab onto that origin; a resolution push must follow
    // (possibly after the snapshot lands in the resolver).
    send(
        &mut client,
        &json!({"type": "tab.navigated", "tabId": 1, "url": "https://a.com/checkout"}),
    )
    .await;
    let resolution = recv_until(&mut client, |v| {
        v["type"] == "resolution" && v["result"]["matches"].as_array().is_some_and(|m| !m.is_empty())
    })
    .await;
    assert_eq!(resolution["tabId"], 1);
    assert_eq!(resolution["result"]["quickSlots"][0]["title"], "Email");

    // On-demand query returns the same state.
    send(&mut client, &json!({"type": "query", "id": "q1", "tabId": 1})).await;
    let query_result = recv_until(&mut client, |v| v["type"] == "queryResult").await;
    assert_eq!(query_result["id"], "q1");
    assert_eq!(
        query_result["result"]["matches"][0]["id"],
        entry_id.as_str()
    );

    // Deleting the entry re-broadcasts an empty resolution for the tab.
    send(
        &mut client,
        &json!({"type": "entries.delete", "id": "r2", "entryId": entry_id}),
    )
    .await;
    let _ = recv_until(&mut client, |v| v["type"] == "deleted").await;
    let _ = recv_until(&mut client, |v| {
        v["type"] == "resolution" && v["result"]["matches"].as_array().is_some_and(Vec::is_empty)
    })
    .await;
}

#[tokio::test]
async fn field_interaction_drives_field_sections() {
    let url = start_server().await;
    let mut client = connect(&url).await;

    send(
        &mut client,
        &json!({
            "type": "entries.create",
            "id": "r1",
            "entry": {
                "value": "secret",
                "contextType": "fieldOnly",
                "contextKey": "#password"
            }
        }),
    )
    .await;
    let _ = recv_until(&mut client, |v| v["type"] == "entry").await;

    send(
        &mut client,
        &json!({
            "type": "field.interaction",
            "tabId": 2,
            "context": {
                "url": "https://a.com/login",
                "origin": "https://a.com",
                "pathname": "/login",
                "selector": "#password"
            }
        }),
    )
    .await;

    let resolution = recv_until(&mut client, |v| {
        v["type"] == "resolution"
            && v["result"]["sections"]["field"]
                .as_array()
                .is_some_and(|f| !f.is_empty())
    })
    .await;
    assert_eq!(resolution["tabId"], 2);
    assert_eq!(resolution["result"]["predictiveTrackingNeeded"], true);
}

#[tokio::test]
async fn bound_connection_sees_only_its_tab() {
    let url = start_server().await;
    let mut watcher = connect(&url).await;
    let mut driver = connect(&url).await;

    // The watcher follows tab 7 only.
    send(&mut watcher, &json!({"type": "bind", "tabId": 7})).await;
    // Ensure the bind is processed before navigation events fire: a
    // request with a direct response acts as a fence.
    send(&mut watcher, &json!({"type": "entries.list", "id": "fence"})).await;
    let _ = recv_until(&mut watcher, |v| v["type"] == "entries").await;

    send(
        &mut driver,
        &json!({
            "type": "entries.create",
            "id": "r1",
            "entry": {"value": "v", "contextType": "all"}
        }),
    )
    .await;
    let _ = recv_until(&mut driver, |v| v["type"] == "entry").await;

    send(
        &mut driver,
        &json!({"type": "tab.navigated", "tabId": 3, "url": "https://a.com/p"}),
    )
    .await;
    send(
        &mut driver,
        &json!({"type": "tab.navigated", "tabId": 7, "url": "https://b.com/q"}),
    )
    .await;

    // The watcher's first resolution must be for tab 7 — tab 3 traffic
    // is filtered out.
    let resolution = recv_until(&mut watcher, |v| v["type"] == "resolution").await;
    assert_eq!(resolution["tabId"], 7);
}

#[tokio::test]
async fn shortcut_collision_surfaces_typed_error() {
    let url = start_server().await;
    let mut client = connect(&url).await;

    send(
        &mut client,
        &json!({
            "type": "entries.create",
            "id": "r1",
            "entry": {"value": "a", "contextType": "all", "shortcut": "Ctrl+1"}
        }),
    )
    .await;
    let _ = recv_until(&mut client, |v| v["type"] == "entry").await;

    send(
        &mut client,
        &json!({
            "type": "entries.create",
            "id": "r2",
            "entry": {"value": "b", "contextType": "all", "shortcut": "Ctrl+1"}
        }),
    )
    .await;
    let error = recv_until(&mut client, |v| v["type"] == "error").await;
    assert_eq!(error["code"], "SHORTCUT_TAKEN");
    assert_eq!(error["id"], "r2");
}
