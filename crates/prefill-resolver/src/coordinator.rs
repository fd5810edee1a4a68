//! The resolver coordinator — one event queue, one owner of mutable state.
//!
//! All resolver state (entry cache, tab map) lives in a [`ResolverState`]
//! owned by a single tokio task. Events arrive on an mpsc queue and are
//! handled to completion in arrival order, which makes the consistency
//! story trivial: a snapshot invalidation is visible to every resolution
//! enqueued after it, and no lock is ever taken on the hot path.
//!
//! Results are published on a broadcast channel as [`ResolutionUpdate`]s.
//! A subscriber that has navigated away simply discards stale updates;
//! nothing is cancelled mid-flight.

use metrics::{counter, gauge, histogram};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, instrument, warn};

use prefill_core::context::{PageContext, TabId};
use prefill_core::resolution::MatchResult;

use crate::cache::EntryCache;
use crate::events::ResolverEvent;
use crate::service;
use crate::tabs::TabTracker;

/// Default inbound queue depth.
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// A published resolution for one tab.
#[derive(Clone, Debug)]
pub struct ResolutionUpdate {
    /// Tab the resolution applies to.
    pub tab_id: TabId,
    /// The computed result.
    pub result: MatchResult,
}

/// Handle to the resolver task.
///
/// Cheap to clone; dropping every handle closes the queue and ends the
/// task.
#[derive(Clone)]
pub struct Coordinator {
    tx: mpsc::Sender<ResolverEvent>,
    publisher: broadcast::Sender<ResolutionUpdate>,
}

impl Coordinator {
    /// Spawn the resolver task with default capacities.
    pub fn spawn() -> Self {
        Self::spawn_with_capacity(DEFAULT_QUEUE_CAPACITY, DEFAULT_BROADCAST_CAPACITY)
    }

    /// Spawn the resolver task with explicit queue/broadcast capacities.
    pub fn spawn_with_capacity(queue: usize, broadcast_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue.max(1));
        let (publisher, _) = broadcast::channel(broadcast_capacity.max(1));
        let state = ResolverState::new(publisher.clone());
        drop(tokio::spawn(run(rx, state)));
        Self { tx, publisher }
    }

    /// Enqueue an event. Returns `false` if the resolver task is gone.
    pub async fn send(&self, event: ResolverEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    /// Subscribe to published resolutions.
    pub fn subscribe(&self) -> broadcast::Receiver<ResolutionUpdate> {
        self.publisher.subscribe()
    }

    /// Resolve a tab on demand and wait for the result.
    ///
    /// Returns `None` when the resolver task is gone.
    pub async fn query(&self, tab_id: TabId) -> Option<MatchResult> {
        let (reply, rx) = oneshot::channel();
        if !self.send(ResolverEvent::Query { tab_id, reply }).await {
            return None;
        }
        rx.await.ok()
    }
}

/// All mutable resolver state, owned by the coordinator task.
struct ResolverState {
    cache: EntryCache,
    tabs: TabTracker,
    publisher: broadcast::Sender<ResolutionUpdate>,
}

async fn run(mut rx: mpsc::Receiver<ResolverEvent>, mut state: ResolverState) {
    debug!("resolver coordinator started");
    while let Some(event) = rx.recv().await {
        state.handle(event);
    }
    debug!("resolver coordinator stopped");
}

impl ResolverState {
    fn new(publisher: broadcast::Sender<ResolutionUpdate>) -> Self {
        Self {
            cache: EntryCache::new(),
            tabs: TabTracker::new(),
            publisher,
        }
    }

    /// Handle one event to completion.
    #[instrument(skip_all, fields(kind = event.kind()))]
    fn handle(&mut self, event: ResolverEvent) {
        counter!("resolver_events_total", "kind" => event.kind()).increment(1);
        match event {
            ResolverEvent::EntriesChanged(entries) => {
                debug!(count = entries.len(), "entry snapshot replaced");
                self.cache.invalidate(entries);
                counter!("resolver_cache_invalidations_total").increment(1);
                // Presentation must reflect the new snapshot everywhere,
                // immediately.
                for tab_id in self.tabs.tab_ids() {
                    self.resolve_and_publish(tab_id);
                }
            }
            ResolverEvent::TabNavigated { tab_id, url } => {
                let context = self.tabs.set_from_navigation(tab_id, &url);
                debug!(tab_id, origin = %context.origin, "tab navigated");
                gauge!("resolver_tabs_tracked").set(self.tabs.len() as f64);
                self.resolve_and_publish(tab_id);
            }
            ResolverEvent::FieldInteraction { tab_id, context } => {
                if self.tabs.is_duplicate_interaction(tab_id, &context) {
                    counter!("resolver_interactions_deduped_total").increment(1);
                    return;
                }
                self.tabs.set_from_interaction(tab_id, context);
                gauge!("resolver_tabs_tracked").set(self.tabs.len() as f64);
                self.resolve_and_publish(tab_id);
            }
            ResolverEvent::TabClosed { tab_id } => {
                if self.tabs.remove(tab_id).is_none() {
                    warn!(tab_id, "close event for untracked tab");
                }
                gauge!("resolver_tabs_tracked").set(self.tabs.len() as f64);
            }
            ResolverEvent::Query { tab_id, reply } => {
                let result = self.resolve(tab_id);
                // A dropped receiver means the caller went away; fine.
                let _ = reply.send(result);
            }
        }
    }

    fn resolve(&self, tab_id: TabId) -> MatchResult {
        let entries = self.cache.get();
        let context: Option<&PageContext> = self.tabs.get(tab_id);
        let start = std::time::Instant::now();
        let result = service::resolve(context, &entries);
        histogram!("resolver_resolution_duration_seconds").record(start.elapsed().as_secs_f64());
        counter!("resolver_resolutions_total").increment(1);
        result
    }

    fn resolve_and_publish(&self, tab_id: TabId) {
        let result = self.resolve(tab_id);
        debug!(
            tab_id,
            matches = result.matches.len(),
            predictive = result.predictive_tracking_needed,
            "resolution published"
        );
        // No subscribers is a valid state (extension not connected yet).
        let _ = self.publisher.send(ResolutionUpdate { tab_id, result });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
