//! Bridges between the store, the resolver, and connected clients.
//!
//! Two pumps, both tolerant of lag (a lagged receiver skips ahead rather
//! than wedging the pipeline):
//!
//! - store snapshots → resolver (`EntriesChanged`), the cache
//!   invalidation path
//! - resolver updates → WebSocket fan-out (`resolution` messages)

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use prefill_resolver::{Coordinator, ResolverEvent};
use prefill_store::EntryStore;

use crate::broadcast::BroadcastManager;
use crate::protocol::ServerMessage;

/// Pump store change notifications into the resolver.
///
/// Subscribes before spawning, so no mutation made after this call can
/// be missed.
pub fn spawn_store_bridge(store: &EntryStore, coordinator: Coordinator) -> JoinHandle<()> {
    let mut changes = store.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(snapshot) => {
                    debug!(count = snapshot.len(), "forwarding entry snapshot to resolver");
                    if !coordinator.send(ResolverEvent::EntriesChanged(snapshot)).await {
                        warn!("resolver gone, store bridge stopping");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Only the latest snapshot matters; skipping is safe.
                    warn!(skipped, "store bridge lagged, continuing with latest");
                }
                Err(RecvError::Closed) => {
                    debug!("store change channel closed, bridge stopping");
                    break;
                }
            }
        }
    })
}

/// Pump resolver updates out to connected clients.
pub fn spawn_resolution_bridge(
    coordinator: &Coordinator,
    broadcast: Arc<BroadcastManager>,
) -> JoinHandle<()> {
    let mut updates = coordinator.subscribe();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => {
                    let message = ServerMessage::Resolution {
                        tab_id: update.tab_id,
                        result: update.result,
                    };
                    broadcast.broadcast_for_tab(update.tab_id, &message).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "resolution bridge lagged, continuing with latest");
                }
                Err(RecvError::Closed) => {
                    debug!("resolver update channel closed, bridge stopping");
                    break;
                }
            }
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    use prefill_core::entry::ContextScope;
    use prefill_store::{ConnectionConfig, EntryData, new_in_memory, run_migrations};

    use crate::connection::ClientConnection;

    fn make_store() -> EntryStore {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            let _ = run_migrations(&conn).unwrap();
        }
        EntryStore::new(pool)
    }

    fn global_entry<'a>() -> EntryData<'a> {
        EntryData {
            value: "v",
            label: None,
            scope: ContextScope::All,
            context_key: None,
            shortcut: None,
            sort_order: None,
        }
    }

    #[tokio::test]
    async fn store_mutation_reaches_resolver() {
        let store = make_store();
        let coordinator = Coordinator::spawn();
        let _bridge = spawn_store_bridge(&store, coordinator.clone());

        let _ = coordinator
            .send(ResolverEvent::TabNavigated {
                tab_id: 1,
                url: "https://a.com/p".into(),
            })
            .await;
        let mut updates = coordinator.subscribe();

        let _ = store.create(&global_entry()).unwrap();

        // The invalidation re-broadcast must carry the new entry.
        let update = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let update = updates.recv().await.unwrap();
                if update.result.matches.len() == 1 {
                    return update;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(update.tab_id, 1);
    }

    #[tokio::test]
    async fn resolution_reaches_connected_client() {
        let coordinator = Coordinator::spawn();
        let broadcast = Arc::new(BroadcastManager::new());
        let _bridge = spawn_resolution_bridge(&coordinator, Arc::clone(&broadcast));

        let (tx, mut rx) = mpsc::channel(32);
        broadcast.add(Arc::new(ClientConnection::new("c1".into(), tx))).await;

        let _ = coordinator
            .send(ResolverEvent::EntriesChanged(Vec::new()))
            .await;
        let _ = coordinator
            .send(ResolverEvent::TabNavigated {
                tab_id: 2,
                url: "https://a.com/p".into(),
            })
            .await;

        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["type"], "resolution");
        assert_eq!(parsed["tabId"], 2);
    }
}
