use std::collections::HashMap;

use atrium_core::types::{DbId, Timestamp};
use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

/// Sender half of a connection's outbound queue.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// A single change-feed subscription held by a connection.
///
/// Delivery is scoped by all three fields: a `sync.change` frame is only
/// forwarded to connections holding a matching subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Collection name (`"messages"` or `"projects"`).
    pub collection: String,
    /// Event name (`"insert"` or `"update"`).
    pub event: String,
    /// Project the subscription is scoped to.
    pub project_id: DbId,
}

/// Registry entry for one live WebSocket connection.
pub struct WsConnection {
    /// Authenticated user ID (connections are always authenticated at upgrade).
    pub user_id: DbId,
    /// Role carried by the token the connection authenticated with.
    pub role: String,
    /// Account email, used to authorize project-scoped subscriptions.
    pub email: String,
    /// Outbound queue; the read half lives in the connection's send task.
    pub sender: WsSender,
    /// Active change-feed subscriptions for this connection.
    pub subscriptions: Vec<Subscription>,
    /// Upgrade time, reported when the connection goes away.
    pub connected_at: Timestamp,
}

/// Registry of live connections and what each one is subscribed to.
///
/// Wrapped in an `Arc` and shared between the upgrade handler, the change
/// router, and the heartbeat task; interior `RwLock` keeps it `Sync`.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register an authenticated connection and hand back the receiver the
    /// caller drains into the socket sink.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: DbId,
        role: &str,
        email: &str,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            role: role.to_string(),
            email: email.to_string(),
            sender: tx,
            subscriptions: Vec::new(),
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Drop a connection and everything it was subscribed to.
    pub async fn remove(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.remove(conn_id) {
            let uptime_secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
            tracing::debug!(conn_id, uptime_secs, "Connection removed from registry");
        }
    }

    /// Add a subscription to a connection.
    ///
    /// Idempotent: re-subscribing with an identical subscription (as clients
    /// do after a reconnect) leaves the list unchanged, so no connection ever
    /// receives the same change twice. Returns `true` if the subscription was
    /// newly added.
    pub async fn subscribe(&self, conn_id: &str, sub: Subscription) -> bool {
        let mut conns = self.connections.write().await;
        match conns.get_mut(conn_id) {
            Some(conn) if !conn.subscriptions.contains(&sub) => {
                conn.subscriptions.push(sub);
                true
            }
            _ => false,
        }
    }

    /// Remove a subscription from a connection.
    ///
    /// Returns `true` if a matching subscription existed and was removed.
    pub async fn unsubscribe(&self, conn_id: &str, sub: &Subscription) -> bool {
        let mut conns = self.connections.write().await;
        match conns.get_mut(conn_id) {
            Some(conn) => {
                let before = conn.subscriptions.len();
                conn.subscriptions.retain(|s| s != sub);
                conn.subscriptions.len() < before
            }
            None => false,
        }
    }

    /// Queue a message for one connection; used for subscription acks and
    /// error frames. Returns `true` if the connection exists and accepted it.
    pub async fn send_to_connection(&self, conn_id: &str, message: Message) -> bool {
        let conns = self.connections.read().await;
        match conns.get(conn_id) {
            Some(conn) => conn.sender.send(message).is_ok(),
            None => false,
        }
    }

    /// Queue a message for every connection subscribed to the given
    /// collection/event/project scope.
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they will be cleaned up on their next receive loop iteration).
    /// Returns the number of connections the message was sent to.
    pub async fn send_to_subscribers(
        &self,
        collection: &str,
        event: &str,
        project_id: DbId,
        message: Message,
    ) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            let matches = conn.subscriptions.iter().any(|s| {
                s.collection == collection && s.event == event && s.project_id == project_id
            });
            if matches && conn.sender.send(message.clone()).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// How many connections are currently registered.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Queue a Close frame for everyone and empty the registry; runs during
    /// graceful shutdown so clients see an orderly close instead of a reset.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Queue a Ping for every connection; driven by the heartbeat task.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
