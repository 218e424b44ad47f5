//! Shared application state for the observer API server.
//!
//! [`AppState`] holds the shared [`Venue`] (the same record the display
//! loop ticks), the broadcast channel that feeds `/ws/display`, and the
//! optional persistence backend that administrative mutations are
//! mirrored to.

use std::sync::Arc;

use carnival_core::{DisplayControl, TickSummary, Venue, VenueClock};
use carnival_store::RemoteBackend;
use carnival_types::DisplaySnapshot;
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast};

/// Capacity of the broadcast channel for display snapshots.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 64;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState {
    /// Broadcast sender for display snapshots.
    pub tx: broadcast::Sender<DisplaySnapshot>,
    /// Store plus scheduler state, shared with the display loop.
    pub venue: Arc<RwLock<Venue>>,
    /// Wall-clock source for snapshots built on request.
    pub clock: VenueClock,
    /// Shared stop control (present when the display loop is running).
    pub control: Option<Arc<DisplayControl>>,
    /// Backend to mirror mutations to, when mirroring is enabled.
    pub remote: Option<RemoteBackend>,
    /// Summary of the most recent lifecycle tick.
    pub last_tick: RwLock<Option<TickSummary>>,
}

impl AppState {
    /// Create application state around a venue, reading the system clock,
    /// with no control and no backend.
    pub fn new(venue: Arc<RwLock<Venue>>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            venue,
            clock: VenueClock::System,
            control: None,
            remote: None,
            last_tick: RwLock::new(None),
        }
    }

    /// Attach the display loop's stop control.
    #[must_use]
    pub fn with_control(mut self, control: Arc<DisplayControl>) -> Self {
        self.control = Some(control);
        self
    }

    /// Mirror administrative mutations to `remote`.
    #[must_use]
    pub fn with_remote(mut self, remote: RemoteBackend) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Use `clock` for snapshots built on request.
    #[must_use]
    pub fn with_clock(mut self, clock: VenueClock) -> Self {
        self.clock = clock;
        self
    }

    /// Current wall-clock time.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Subscribe to the snapshot broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<DisplaySnapshot> {
        self.tx.subscribe()
    }

    /// Publish a snapshot to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, snapshot: &DisplaySnapshot) -> usize {
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        self.tx.send(snapshot.clone()).unwrap_or(0)
    }

    /// Build a snapshot of the venue as it is now.
    pub async fn current_snapshot(&self) -> DisplaySnapshot {
        let now = self.now();
        self.venue.read().await.snapshot(now)
    }

    /// Push a fresh snapshot after an administrative change so displays
    /// update before the next tick.
    pub async fn publish_current(&self) -> usize {
        let snapshot = self.current_snapshot().await;
        self.broadcast(&snapshot)
    }
}
