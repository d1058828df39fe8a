use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::ws::Message;
use serde_json::json;
use tokio::time::timeout;

use atrium_api::changes::ChangeRouter;
use atrium_api::ws::{Subscription, WsManager};
use atrium_core::sync::SyncMessage;
use atrium_events::{ChangeBus, ChangeEvent};

fn sub(collection: &str, event: &str, project_id: i64) -> Subscription {
    Subscription {
        collection: collection.to_string(),
        event: event.to_string(),
        project_id,
    }
}

/// Receive one frame from the connection channel and parse it as a sync
/// message, failing the test if nothing arrives within a second.
async fn recv_frame(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Message>) -> SyncMessage {
    let message = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("frame should arrive")
        .expect("channel should stay open");
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: a published change reaches a subscribed connection as a sync frame
// ---------------------------------------------------------------------------

#[tokio::test]
async fn routed_change_reaches_subscribed_connection() {
    let manager = Arc::new(WsManager::new());
    let bus = ChangeBus::default();
    let router_handle = tokio::spawn(ChangeRouter::new(manager.clone()).run(bus.subscribe()));

    let mut rx = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;
    manager.subscribe("conn-1", sub("messages", "insert", 7)).await;

    bus.publish(ChangeEvent::new("messages", "insert", 7).with_record(json!({
        "id": 1,
        "body": "hello",
    })));

    match recv_frame(&mut rx).await {
        SyncMessage::Change {
            collection,
            event,
            project_id,
            seq,
            record,
        } => {
            assert_eq!(collection, "messages");
            assert_eq!(event, "insert");
            assert_eq!(project_id, 7);
            assert_eq!(seq, 1);
            assert_eq!(record["body"], "hello");
        }
        other => panic!("expected a change frame, got {other:?}"),
    }

    drop(bus);
    timeout(Duration::from_secs(1), router_handle)
        .await
        .expect("router should stop when the bus drops")
        .unwrap();
}

// ---------------------------------------------------------------------------
// Test: changes for other projects are not delivered
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unrelated_scope_is_not_delivered() {
    let manager = Arc::new(WsManager::new());
    let bus = ChangeBus::default();
    tokio::spawn(ChangeRouter::new(manager.clone()).run(bus.subscribe()));

    let mut rx = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;
    manager.subscribe("conn-1", sub("messages", "insert", 1)).await;

    // The router processes events in order, so receiving the second event
    // proves the first was dropped rather than still in flight.
    bus.publish(ChangeEvent::new("messages", "insert", 2).with_record(json!({"id": 10})));
    bus.publish(ChangeEvent::new("messages", "insert", 1).with_record(json!({"id": 11})));

    let frame = recv_frame(&mut rx).await;
    assert_matches!(frame, SyncMessage::Change { project_id, ref record, .. } => {
        assert_eq!(project_id, 1);
        assert_eq!(record["id"], 11);
    });
    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: sequence numbers increase across published events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sequence_increments_across_events() {
    let manager = Arc::new(WsManager::new());
    let bus = ChangeBus::default();
    tokio::spawn(ChangeRouter::new(manager.clone()).run(bus.subscribe()));

    let mut rx = manager.add("conn-1".to_string(), 1, "client", "a@example.com").await;
    manager.subscribe("conn-1", sub("projects", "update", 3)).await;

    bus.publish(ChangeEvent::new("projects", "update", 3).with_record(json!({"progress": 10})));
    bus.publish(ChangeEvent::new("projects", "update", 3).with_record(json!({"progress": 20})));

    let first = recv_frame(&mut rx).await;
    let second = recv_frame(&mut rx).await;
    let first_seq = assert_matches!(first, SyncMessage::Change { seq, .. } => seq);
    let second_seq = assert_matches!(second, SyncMessage::Change { seq, .. } => seq);
    assert_eq!(first_seq, 1);
    assert_eq!(second_seq, 2);
}
