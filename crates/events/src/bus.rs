//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] is the publish/subscribe hub for [`ChangeEvent`]s. It is
//! designed to be shared via `Arc<ChangeBus>` across the application: API
//! handlers publish after committing a row change, the WebSocket change
//! router subscribes and fans events out to connected clients.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use atrium_core::types::DbId;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// A committed row change, scoped to a project.
///
/// Constructed via [`ChangeEvent::new`] and enriched with
/// [`with_record`](ChangeEvent::with_record). The `seq` field is zero until
/// the event passes through [`ChangeBus::publish`], which stamps it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The collection the change belongs to (e.g. `"messages"`).
    pub collection: String,

    /// The change type (e.g. `"insert"`, `"update"`).
    pub event: String,

    /// The project the changed row is scoped to.
    pub project_id: DbId,

    /// Bus-assigned monotonic sequence number. Consumers order and guard by
    /// this instead of trusting transport arrival order.
    pub seq: u64,

    /// The changed row as JSON.
    pub record: serde_json::Value,

    /// Publication time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create a new event with an empty record and unassigned sequence.
    pub fn new(collection: impl Into<String>, event: impl Into<String>, project_id: DbId) -> Self {
        Self {
            collection: collection.into(),
            event: event.into(),
            project_id,
            seq: 0,
            record: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the changed row to the event.
    pub fn with_record(mut self, record: serde_json::Value) -> Self {
        self.record = record;
        self
    }
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out change bus.
///
/// Any number of subscribers each see every published [`ChangeEvent`],
/// courtesy of the [`broadcast::Sender`] underneath. Publishing stamps each
/// event with the next value of a monotonic sequence counter.
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
    seq: AtomicU64,
}

impl ChangeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Once the buffer fills, the oldest unread events are overwritten and
    /// a slow receiver sees `RecvError::Lagged` on its next recv.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            seq: AtomicU64::new(1),
        }
    }

    /// Stamp the event with the next sequence number and publish it to all
    /// current subscribers. Returns the assigned sequence.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// the rows themselves are already durable in the database.
    pub fn publish(&self, mut event: ChangeEvent) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        event.seq = seq;
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
        seq
    }

    /// New receiver that observes every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
