//! Realtime sync protocol constants, types, and validation.
//!
//! This module lives in `core` (zero internal deps) so the WebSocket handler,
//! the change router, and the client subscriber all speak the same protocol:
//! which collections can be watched, which change events exist, and the JSON
//! frame shapes exchanged over the socket.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Collections (the tables that can be watched)
// ---------------------------------------------------------------------------

/// Known collections for realtime sync.
pub mod collections {
    pub const MESSAGES: &str = "messages";
    pub const PROJECTS: &str = "projects";
}

/// The set of all collections valid for sync subscriptions.
pub const VALID_COLLECTIONS: &[&str] = &[collections::MESSAGES, collections::PROJECTS];

/// Returns `true` if the given collection can be subscribed to.
pub fn is_valid_collection(collection: &str) -> bool {
    VALID_COLLECTIONS.contains(&collection)
}

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

/// Known change event types.
pub mod events {
    pub const INSERT: &str = "insert";
    pub const UPDATE: &str = "update";
}

/// The set of all valid change event types.
pub const VALID_EVENTS: &[&str] = &[events::INSERT, events::UPDATE];

/// Returns `true` if the given event type is valid.
pub fn is_valid_event(event: &str) -> bool {
    VALID_EVENTS.contains(&event)
}

// ---------------------------------------------------------------------------
// Sync WebSocket message protocol
// ---------------------------------------------------------------------------

/// Messages exchanged over WebSocket for realtime sync.
///
/// On the wire each frame is JSON carrying an internal `"type"` tag, which
/// is what clients switch on when routing frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SyncMessage {
    /// Client sends: start delivering changes for this scope.
    ///
    /// Subscribing is idempotent: repeating an identical subscribe (as the
    /// client does after a reconnect) is acked again without duplicating
    /// delivery.
    #[serde(rename = "sync.subscribe")]
    Subscribe {
        collection: String,
        event: String,
        project_id: DbId,
    },

    /// Client sends: stop delivering changes for this scope.
    #[serde(rename = "sync.unsubscribe")]
    Unsubscribe {
        collection: String,
        event: String,
        project_id: DbId,
    },

    /// Server acks a subscribe.
    #[serde(rename = "sync.subscribed")]
    Subscribed {
        collection: String,
        event: String,
        project_id: DbId,
    },

    /// Server pushes: a row changed in a subscribed scope.
    ///
    /// `seq` is assigned by the server bus and is monotonically increasing;
    /// consumers order and de-duplicate by it rather than trusting transport
    /// arrival order.
    #[serde(rename = "sync.change")]
    Change {
        collection: String,
        event: String,
        project_id: DbId,
        seq: u64,
        record: serde_json::Value,
    },

    /// Server sends: a frame was rejected.
    #[serde(rename = "sync.error")]
    Error { message: String },
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Validate a subscription scope. Returns `Ok(())` or an error message.
pub fn validate_subscription(
    collection: &str,
    event: &str,
    project_id: DbId,
) -> Result<(), String> {
    if !is_valid_collection(collection) {
        return Err(format!(
            "Invalid collection '{collection}'. Must be one of: {}",
            VALID_COLLECTIONS.join(", ")
        ));
    }
    if !is_valid_event(event) {
        return Err(format!(
            "Invalid event '{event}'. Must be one of: {}",
            VALID_EVENTS.join(", ")
        ));
    }
    if project_id <= 0 {
        return Err(format!("project_id must be positive, got {project_id}"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Collection and event validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_valid_collections() {
        assert!(is_valid_collection("messages"));
        assert!(is_valid_collection("projects"));
    }

    #[test]
    fn test_invalid_collections() {
        assert!(!is_valid_collection(""));
        assert!(!is_valid_collection("invoices"));
        assert!(!is_valid_collection("MESSAGES"));
    }

    #[test]
    fn test_valid_events() {
        assert!(is_valid_event("insert"));
        assert!(is_valid_event("update"));
    }

    #[test]
    fn test_invalid_events() {
        assert!(!is_valid_event(""));
        assert!(!is_valid_event("delete"));
        assert!(!is_valid_event("INSERT"));
    }

    // -----------------------------------------------------------------------
    // Subscription validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_valid_subscription() {
        assert!(validate_subscription("messages", "insert", 1).is_ok());
        assert!(validate_subscription("projects", "update", 42).is_ok());
    }

    #[test]
    fn test_invalid_collection_in_subscription() {
        let result = validate_subscription("users", "insert", 1);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid collection"));
    }

    #[test]
    fn test_invalid_event_in_subscription() {
        let result = validate_subscription("messages", "delete", 1);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid event"));
    }

    #[test]
    fn test_nonpositive_project_id_in_subscription() {
        assert!(validate_subscription("messages", "insert", 0).is_err());
        assert!(validate_subscription("messages", "insert", -3).is_err());
    }

    // -----------------------------------------------------------------------
    // Frame serialization
    // -----------------------------------------------------------------------

    #[test]
    fn test_subscribe_frame_tag() {
        let frame = SyncMessage::Subscribe {
            collection: "messages".to_string(),
            event: "insert".to_string(),
            project_id: 5,
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "sync.subscribe");
        assert_eq!(json["project_id"], 5);
    }

    #[test]
    fn test_change_frame_round_trip() {
        let frame = SyncMessage::Change {
            collection: "projects".to_string(),
            event: "update".to_string(),
            project_id: 9,
            seq: 17,
            record: serde_json::json!({"id": 9, "progress": 40}),
        };
        let json = serde_json::to_string(&frame).unwrap();
        let parsed: SyncMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn test_unknown_frame_type_rejected() {
        let result: Result<SyncMessage, _> =
            serde_json::from_str(r#"{"type": "sync.nonsense"}"#);
        assert!(result.is_err());
    }
}
