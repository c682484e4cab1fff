//! In-memory state shared between the producer and viewer tasks.
//!
//! The producer owns the window itself; viewers only ever see the
//! serialized snapshot it publishes through a watch channel.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use skyfeed_core::{SkyfeedError, StreamMessage};
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::config::Config;

/// A connected stream viewer.
#[derive(Debug, Clone)]
pub struct ViewerInfo {
    pub connected_at: DateTime<Utc>,
}

/// Application state - latest published snapshot, route payload and viewers.
pub struct AppState {
    config: Config,
    snapshot_tx: watch::Sender<Arc<str>>,
    routes_payload: Option<Arc<str>>,
    viewers: DashMap<Uuid, ViewerInfo>,
    producer_claimed: AtomicBool,
    synthetic: AtomicBool,
    frame_count: AtomicUsize,
    shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let empty = StreamMessage::Snapshot { frames: Vec::new() }
            .to_json()
            .unwrap_or_else(|_| r#"{"type":"snapshot","frames":[]}"#.to_string());
        let (snapshot_tx, _) = watch::channel(Arc::<str>::from(empty));
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            snapshot_tx,
            routes_payload: None,
            viewers: DashMap::new(),
            producer_claimed: AtomicBool::new(false),
            synthetic: AtomicBool::new(false),
            frame_count: AtomicUsize::new(0),
            shutdown_tx,
        }
    }

    /// State for routes mode, carrying the pre-serialized route set.
    pub fn with_routes(config: Config, routes_payload: String) -> Self {
        let mut state = Self::new(config);
        state.routes_payload = Some(Arc::from(routes_payload));
        state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ========== PRODUCER SIDE ==========

    /// Reserve the single producer slot.
    pub fn claim_producer(&self) -> Result<(), SkyfeedError> {
        self.producer_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| SkyfeedError::ProducerAlreadyRunning)
    }

    pub fn release_producer(&self) {
        self.producer_claimed.store(false, Ordering::Release);
    }

    /// Swap in a new snapshot payload for every viewer.
    pub fn publish_snapshot(&self, payload: String, frames: usize) {
        self.frame_count.store(frames, Ordering::Relaxed);
        self.snapshot_tx.send_replace(Arc::from(payload));
    }

    pub fn mark_synthetic(&self) {
        self.synthetic.store(true, Ordering::Relaxed);
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic.load(Ordering::Relaxed)
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count.load(Ordering::Relaxed)
    }

    // ========== VIEWER SIDE ==========

    pub fn subscribe_snapshots(&self) -> watch::Receiver<Arc<str>> {
        self.snapshot_tx.subscribe()
    }

    pub fn latest_snapshot(&self) -> Arc<str> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn routes_payload(&self) -> Option<Arc<str>> {
        self.routes_payload.clone()
    }

    pub fn register_viewer(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.viewers.insert(
            id,
            ViewerInfo {
                connected_at: Utc::now(),
            },
        );
        id
    }

    pub fn unregister_viewer(&self, id: &Uuid) -> Option<ViewerInfo> {
        self.viewers.remove(id).map(|(_, info)| info)
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    // ========== LIFECYCLE ==========

    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Ask the producer and every viewer task to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
