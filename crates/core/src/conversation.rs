//! Conversation timeline with optimistic delivery tracking.
//!
//! This module lives in `core` (zero internal deps) so the client library and
//! any future tooling share one timeline state machine. The timeline is
//! append-only from the user's point of view: a submitted message appears
//! immediately as a provisional entry and is later reconciled against the
//! server's confirmed row by its client correlation id, so the realtime echo
//! of your own message never produces a duplicate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Delivery state
// ---------------------------------------------------------------------------

/// Delivery state of a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Appended locally, not yet confirmed by the server.
    Pending,
    /// Confirmed by the server, directly or via the realtime echo.
    Confirmed,
    /// The write failed. Eligible for retry with the same correlation id.
    Failed,
}

// ---------------------------------------------------------------------------
// Records and entries
// ---------------------------------------------------------------------------

/// A confirmed message row as the server reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageRecord {
    pub id: DbId,
    pub body: String,
    pub sender_role: String,
    pub client_ref: Option<Uuid>,
    pub created_at: Timestamp,
}

/// One entry in the rendered timeline.
#[derive(Debug, Clone)]
pub struct ConversationEntry {
    /// Server-assigned id. `None` while the entry is provisional.
    pub id: Option<DbId>,
    /// Client correlation id. Present on locally staged entries.
    pub client_ref: Option<Uuid>,
    pub body: String,
    pub sender_role: String,
    pub created_at: Timestamp,
    pub delivery: Delivery,
}

impl ConversationEntry {
    fn from_record(record: MessageRecord) -> Self {
        Self {
            id: Some(record.id),
            client_ref: record.client_ref,
            body: record.body,
            sender_role: record.sender_role,
            created_at: record.created_at,
            delivery: Delivery::Confirmed,
        }
    }

    /// Display ordering is `(created_at, id)`. Provisional entries have no
    /// server id yet and sort after confirmed rows with the same timestamp.
    fn sort_key(&self) -> (Timestamp, DbId) {
        (self.created_at, self.id.unwrap_or(DbId::MAX))
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// An ordered message timeline with optimistic delivery tracking.
#[derive(Debug, Default)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the timeline with fetched history.
    pub fn load_history(&mut self, records: Vec<MessageRecord>) {
        self.entries = records
            .into_iter()
            .map(ConversationEntry::from_record)
            .collect();
        self.entries.sort_by_key(ConversationEntry::sort_key);
    }

    /// Stage a message locally before any network call.
    ///
    /// The body is trimmed; whitespace-only input is a no-op and returns
    /// `None` so the caller issues no write. Otherwise the entry is appended
    /// in `Pending` state and its fresh correlation id is returned.
    pub fn append_local(
        &mut self,
        body: &str,
        sender_role: &str,
        now: Timestamp,
    ) -> Option<Uuid> {
        let body = body.trim();
        if body.is_empty() {
            return None;
        }
        let client_ref = Uuid::new_v4();
        self.entries.push(ConversationEntry {
            id: None,
            client_ref: Some(client_ref),
            body: body.to_string(),
            sender_role: sender_role.to_string(),
            created_at: now,
            delivery: Delivery::Pending,
        });
        Some(client_ref)
    }

    /// Merge a confirmed row into the timeline.
    ///
    /// If the row carries a correlation id matching a local entry, that entry
    /// is confirmed in place with the server's authoritative fields. A row
    /// whose id is already present is dropped, so the direct write response
    /// and the realtime echo of the same message cannot double up. Anything
    /// else (the counterparty's messages) is inserted in display order.
    pub fn apply_insert(&mut self, record: MessageRecord) {
        if self.entries.iter().any(|e| e.id == Some(record.id)) {
            return;
        }
        if let Some(client_ref) = record.client_ref {
            if let Some(entry) = self
                .entries
                .iter_mut()
                .find(|e| e.client_ref == Some(client_ref))
            {
                entry.id = Some(record.id);
                entry.body = record.body;
                entry.created_at = record.created_at;
                entry.delivery = Delivery::Confirmed;
                self.entries.sort_by_key(ConversationEntry::sort_key);
                return;
            }
        }
        self.entries.push(ConversationEntry::from_record(record));
        self.entries.sort_by_key(ConversationEntry::sort_key);
    }

    /// Mark a pending entry as failed. Returns `false` if no pending entry
    /// carries the given correlation id.
    pub fn mark_failed(&mut self, client_ref: Uuid) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.client_ref == Some(client_ref) && e.delivery == Delivery::Pending)
        {
            Some(entry) => {
                entry.delivery = Delivery::Failed;
                true
            }
            None => false,
        }
    }

    /// Reset a failed entry to pending for a retry, returning the body to
    /// re-send under the same correlation id.
    pub fn retry(&mut self, client_ref: Uuid) -> Option<String> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.client_ref == Some(client_ref) && e.delivery == Delivery::Failed)?;
        entry.delivery = Delivery::Pending;
        Some(entry.body.clone())
    }

    /// The timeline in display order.
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    /// Number of entries still awaiting confirmation.
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.delivery == Delivery::Pending)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
