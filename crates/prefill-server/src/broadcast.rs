//! Event fan-out to connected WebSocket clients.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use metrics::counter;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use prefill_core::context::TabId;

use crate::connection::ClientConnection;
use crate::protocol::ServerMessage;

/// Maximum total lifetime message drops before forcibly disconnecting a
/// slow client.
const MAX_TOTAL_DROPS: u64 = 100;

/// Manages event broadcasting to connected clients.
pub struct BroadcastManager {
    /// Connected clients indexed by connection ID.
    connections: RwLock<HashMap<String, Arc<ClientConnection>>>,
    /// Atomic counter tracking total connections (avoids read-locking for
    /// count queries).
    active_count: AtomicUsize,
}

impl BroadcastManager {
    /// Create a new broadcast manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            active_count: AtomicUsize::new(0),
        }
    }

    /// Add a connection.
    pub async fn add(&self, connection: Arc<ClientConnection>) {
        let mut conns = self.connections.write().await;
        if conns.insert(connection.id.clone(), connection).is_none() {
            let _ = self.active_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Remove a connection by ID.
    pub async fn remove(&self, connection_id: &str) {
        let mut conns = self.connections.write().await;
        if conns.remove(connection_id).is_some() {
            let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Broadcast a tab's resolution to every connection that follows it
    /// (bound to that tab, or unbound).
    pub async fn broadcast_for_tab(&self, tab_id: TabId, message: &ServerMessage) {
        self.broadcast_to(|conn| conn.wants_tab(tab_id), message).await;
    }

    /// Broadcast a message to all connections.
    pub async fn broadcast_all(&self, message: &ServerMessage) {
        self.broadcast_to(|_| true, message).await;
    }

    /// Serialize once, fan out to matching clients, remove slow clients.
    async fn broadcast_to(&self, filter: impl Fn(&ClientConnection) -> bool, message: &ServerMessage) {
        let json = match serde_json::to_string(message) {
            Ok(json) => Arc::new(json),
            Err(e) => {
                warn!(error = %e, "failed to serialize broadcast message");
                return;
            }
        };
        let mut to_remove = Vec::new();
        {
            let conns = self.connections.read().await;
            let mut recipients = 0u32;
            for conn in conns.values() {
                if filter(conn) {
                    recipients += 1;
                    if !conn.send(Arc::clone(&json)) {
                        counter!("ws_broadcast_drops_total").increment(1);
                        let drops = conn.drop_count();
                        if drops >= MAX_TOTAL_DROPS {
                            warn!(conn_id = %conn.id, drops, "disconnecting slow client");
                            to_remove.push(conn.id.clone());
                        } else {
                            warn!(conn_id = %conn.id, total_drops = drops, "failed to send to client (channel full)");
                        }
                    }
                }
            }
            debug!(recipients, "broadcast message");
        }
        if !to_remove.is_empty() {
            let mut conns = self.connections.write().await;
            for id in &to_remove {
                if conns.remove(id).is_some() {
                    let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Number of active connections.
    pub fn connection_count(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastManager {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use prefill_core::resolution::MatchResult;
    use tokio::sync::mpsc;

    fn make_connection_with_rx(
        id: &str,
        tab: Option<TabId>,
    ) -> (Arc<ClientConnection>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(32);
        let conn = ClientConnection::new(id.into(), tx);
        conn.bind_tab(tab);
        (Arc::new(conn), rx)
    }

    fn resolution(tab_id: TabId) -> ServerMessage {
        ServerMessage::Resolution {
            tab_id,
            result: MatchResult::empty(),
        }
    }

    #[tokio::test]
    async fn add_and_remove_connection() {
        let bm = BroadcastManager::new();
        let (conn, _rx) = make_connection_with_rx("c1", None);
        bm.add(conn).await;
        assert_eq!(bm.connection_count(), 1);
        bm.remove("c1").await;
        assert_eq!(bm.connection_count(), 0);
    }

    #[tokio::test]
    async fn remove_nonexistent_connection() {
        let bm = BroadcastManager::new();
        bm.remove("no_such").await;
        assert_eq!(bm.connection_count(), 0);
    }

    #[tokio::test]
    async fn add_same_id_does_not_double_count() {
        let bm = BroadcastManager::new();
        let (c1, _rx1) = make_connection_with_rx("same", None);
        let (c2, _rx2) = make_connection_with_rx("same", Some(1));
        bm.add(c1).await;
        bm.add(c2).await;
        assert_eq!(bm.connection_count(), 1);
    }

    #[tokio::test]
    async fn tab_broadcast_respects_binding() {
        let bm = BroadcastManager::new();
        let (bound_1, mut rx1) = make_connection_with_rx("c1", Some(1));
        let (bound_2, mut rx2) = make_connection_with_rx("c2", Some(2));
        let (unbound, mut rx3) = make_connection_with_rx("c3", None);
        bm.add(bound_1).await;
        bm.add(bound_2).await;
        bm.add(unbound).await;

        bm.broadcast_for_tab(1, &resolution(1)).await;

        // Tab-1 client and the unbound client receive; tab-2 does not.
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
        assert!(rx3.try_recv().is_ok());
    }

    #[tokio::test]
    async fn broadcast_all_reaches_everyone() {
        let bm = BroadcastManager::new();
        let (c1, mut rx1) = make_connection_with_rx("c1", Some(1));
        let (c2, mut rx2) = make_connection_with_rx("c2", None);
        bm.add(c1).await;
        bm.add(c2).await;

        bm.broadcast_all(&resolution(9)).await;
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn broadcast_to_empty_manager_is_fine() {
        let bm = BroadcastManager::new();
        bm.broadcast_all(&resolution(1)).await;
    }

    #[tokio::test]
    async fn broadcast_payload_is_valid_json() {
        let bm = BroadcastManager::new();
        let (conn, mut rx) = make_connection_with_rx("c1", None);
        bm.add(conn).await;

        bm.broadcast_for_tab(3, &resolution(3)).await;
        let msg = rx.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["type"], "resolution");
        assert_eq!(parsed["tabId"], 3);
    }

    #[tokio::test]
    async fn payload_shared_not_cloned() {
        let bm = BroadcastManager::new();
        let (c1, mut rx1) = make_connection_with_rx("c1", None);
        let (c2, mut rx2) = make_connection_with_rx("c2", None);
        bm.add(c1).await;
        bm.add(c2).await;

        bm.broadcast_all(&resolution(1)).await;
        let m1 = rx1.recv().await.unwrap();
        let m2 = rx2.recv().await.unwrap();
        assert!(Arc::ptr_eq(&m1, &m2));
    }

    #[tokio::test]
    async fn slow_client_disconnected_after_threshold() {
        let bm = BroadcastManager::new();
        let (tx, _rx) = mpsc::channel(1);
        let slow = Arc::new(ClientConnection::new("slow".into(), tx));
        let (fast, mut fast_rx) = make_connection_with_rx("fast", None);
        bm.add(slow).await;
        bm.add(fast).await;

        // First send fills the slow client's buffer; then exceed the
        // drop threshold.
        for _ in 0..=MAX_TOTAL_DROPS {
            bm.broadcast_all(&resolution(1)).await;
        }

        assert_eq!(bm.connection_count(), 1);
        assert!(fast_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn fast_client_survives_sustained_broadcast() {
        let bm = BroadcastManager::new();
        let (fast, mut rx) = make_connection_with_rx("fast", None);
        bm.add(fast).await;

        for _ in 0..20 {
            bm.broadcast_all(&resolution(1)).await;
            while rx.try_recv().is_ok() {}
        }
        assert_eq!(bm.connection_count(), 1);
    }
}
