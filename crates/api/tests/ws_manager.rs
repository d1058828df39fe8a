use axum::extract::ws::Message;

use atrium_api::ws::{Subscription, WsManager};

fn sub(collection: &str, event: &str, project_id: i64) -> Subscription {
    Subscription {
        collection: collection.to_string(),
        event: event.to_string(),
        project_id,
    }
}

// ---------------------------------------------------------------------------
// Test: connection bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();

    let _rx1 = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;
    let _rx2 = manager.add("conn-2".to_string(), 2, "admin", "b@example.com").await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 1);
}

#[tokio::test]
async fn remove_unknown_connection_is_noop() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;

    manager.remove("no-such-conn").await;
    assert_eq!(manager.connection_count().await, 1);
}

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::new();

    let mut old_rx = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;
    let _new_rx = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;

    assert_eq!(manager.connection_count().await, 1);
    // The old sender was dropped with the replaced entry.
    assert!(old_rx.recv().await.is_none());
}

// ---------------------------------------------------------------------------
// Test: subscription bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subscribe_is_idempotent() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;

    assert!(manager.subscribe("conn-1", sub("messages", "insert", 7)).await);
    // Resubscribing after a reconnect must not double delivery.
    assert!(!manager.subscribe("conn-1", sub("messages", "insert", 7)).await);

    let delivered = manager
        .send_to_subscribers("messages", "insert", 7, Message::Text("hi".into()))
        .await;
    assert_eq!(delivered, 1);

    assert!(rx.recv().await.is_some());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn subscribe_to_unknown_connection_fails() {
    let manager = WsManager::new();
    assert!(!manager.subscribe("ghost", sub("messages", "insert", 7)).await);
}

#[tokio::test]
async fn unsubscribe_removes_the_subscription() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;

    manager.subscribe("conn-1", sub("messages", "insert", 7)).await;
    assert!(manager.unsubscribe("conn-1", &sub("messages", "insert", 7)).await);
    assert!(!manager.unsubscribe("conn-1", &sub("messages", "insert", 7)).await);

    let delivered = manager
        .send_to_subscribers("messages", "insert", 7, Message::Text("hi".into()))
        .await;
    assert_eq!(delivered, 0);
}

// ---------------------------------------------------------------------------
// Test: delivery is scoped by collection, event, and project
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delivery_is_scoped_by_project() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;
    let mut rx2 = manager.add("conn-2".to_string(), 2, "client", "b@example.com").await;

    manager.subscribe("conn-1", sub("messages", "insert", 1)).await;
    manager.subscribe("conn-2", sub("messages", "insert", 2)).await;

    let delivered = manager
        .send_to_subscribers("messages", "insert", 1, Message::Text("for p1".into()))
        .await;
    assert_eq!(delivered, 1);

    assert!(rx1.try_recv().is_ok());
    assert!(rx2.try_recv().is_err());
}

#[tokio::test]
async fn delivery_requires_matching_event() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;

    manager.subscribe("conn-1", sub("projects", "update", 1)).await;

    let delivered = manager
        .send_to_subscribers("projects", "insert", 1, Message::Text("ignored".into()))
        .await;
    assert_eq!(delivered, 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn delivery_skips_closed_channels() {
    let manager = WsManager::new();
    let rx1 = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;
    let mut rx2 = manager.add("conn-2".to_string(), 2, "client", "a@example.com").await;

    manager.subscribe("conn-1", sub("messages", "insert", 1)).await;
    manager.subscribe("conn-2", sub("messages", "insert", 1)).await;

    drop(rx1);

    let delivered = manager
        .send_to_subscribers("messages", "insert", 1, Message::Text("hi".into()))
        .await;
    assert_eq!(delivered, 1);
    assert!(rx2.try_recv().is_ok());
}

// ---------------------------------------------------------------------------
// Test: single-connection sends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_connection_reaches_only_that_connection() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;
    let mut rx2 = manager.add("conn-2".to_string(), 2, "client", "b@example.com").await;

    assert!(manager.send_to_connection("conn-1", Message::Text("ack".into())).await);

    assert!(rx1.try_recv().is_ok());
    assert!(rx2.try_recv().is_err());
}

#[tokio::test]
async fn send_to_unknown_connection_returns_false() {
    let manager = WsManager::new();
    assert!(!manager.send_to_connection("ghost", Message::Text("hi".into())).await);
}

// ---------------------------------------------------------------------------
// Test: shutdown closes every connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;
    let mut rx2 = manager.add("conn-2".to_string(), 2, "admin", "b@example.com").await;

    manager.shutdown_all().await;
    assert_eq!(manager.connection_count().await, 0);

    assert_eq!(rx1.recv().await, Some(Message::Close(None)));
    assert_eq!(rx2.recv().await, Some(Message::Close(None)));

    // Senders were dropped with the cleared map, so the channels are closed.
    assert!(rx1.recv().await.is_none());
    assert!(rx2.recv().await.is_none());
}
