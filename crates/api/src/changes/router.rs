//! Event-to-WebSocket routing engine.
//!
//! [`ChangeRouter`] consumes events from the change bus and forwards each
//! as a `sync.change` frame to every connection holding a matching
//! subscription.

use std::sync::Arc;

use atrium_core::sync::SyncMessage;
use atrium_events::ChangeEvent;
use axum::extract::ws::Message;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Routes change events to subscribed WebSocket connections.
pub struct ChangeRouter {
    ws_manager: Arc<WsManager>,
}

impl ChangeRouter {
    /// Create a new router backed by the given WebSocket manager.
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Consume the bus and forward each event to its subscribers.
    ///
    /// Exits when the channel closes, which happens once the
    /// [`ChangeBus`](atrium_events::ChangeBus) is dropped at shutdown.
    pub async fn run(self, mut receiver: broadcast::Receiver<ChangeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.route_event(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Change router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Change bus closed, change router shutting down");
                    break;
                }
            }
        }
    }

    /// Forward a single event to every matching subscriber.
    async fn route_event(&self, event: ChangeEvent) {
        let frame = SyncMessage::Change {
            collection: event.collection.clone(),
            event: event.event.clone(),
            project_id: event.project_id,
            seq: event.seq,
            record: event.record,
        };

        let json = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize change frame");
                return;
            }
        };

        let delivered = self
            .ws_manager
            .send_to_subscribers(
                &event.collection,
                &event.event,
                event.project_id,
                Message::Text(json.into()),
            )
            .await;

        tracing::debug!(
            collection = %event.collection,
            event = %event.event,
            project_id = event.project_id,
            seq = event.seq,
            delivered,
            "Routed change event"
        );
    }
}
