//! Project conversation view: optimistic writes over a live timeline.
//!
//! Wraps the pure [`Conversation`] timeline from `atrium_core` with the
//! backend calls and the realtime merge. The same view serves both portals;
//! only the role and the counterparty label differ.

use std::sync::Arc;

use uuid::Uuid;

use atrium_core::conversation::{Conversation, ConversationEntry, MessageRecord};
use atrium_core::sync::{collections, events, SyncMessage};
use atrium_core::types::DbId;

use crate::backend::PortalBackend;
use crate::error::ClientError;

/// A conversation bound to one project scope.
pub struct ConversationView {
    backend: Arc<dyn PortalBackend>,
    scope_id: DbId,
    current_role: String,
    counterparty_label: String,
    conversation: Conversation,
}

impl ConversationView {
    /// Open the conversation for a project: fetches the full history and
    /// builds the ordered timeline.
    pub async fn open(
        backend: Arc<dyn PortalBackend>,
        scope_id: DbId,
        current_role: &str,
        counterparty_label: &str,
    ) -> Result<Self, ClientError> {
        let history = backend.project_messages(scope_id).await?;
        let mut conversation = Conversation::new();
        conversation.load_history(history);
        Ok(Self {
            backend,
            scope_id,
            current_role: current_role.to_string(),
            counterparty_label: counterparty_label.to_string(),
            conversation,
        })
    }

    /// The project this view is scoped to.
    pub fn scope_id(&self) -> DbId {
        self.scope_id
    }

    /// Display name for the other side of the conversation.
    pub fn counterparty_label(&self) -> &str {
        &self.counterparty_label
    }

    /// The timeline in display order.
    pub fn entries(&self) -> &[ConversationEntry] {
        self.conversation.entries()
    }

    /// Entries still awaiting server confirmation.
    pub fn pending_count(&self) -> usize {
        self.conversation.pending_count()
    }

    /// Submit a message.
    ///
    /// Whitespace-only input is a no-op: nothing is staged and no write is
    /// issued. Otherwise the entry appears in the timeline immediately and
    /// the write goes out; a failure marks the entry inline rather than
    /// erroring the caller. Returns the correlation id of the staged entry.
    pub async fn send(&mut self, body: &str) -> Option<Uuid> {
        let client_ref =
            self.conversation
                .append_local(body, &self.current_role, chrono::Utc::now())?;
        let body = body.trim().to_string();
        self.deliver(client_ref, &body).await;
        Some(client_ref)
    }

    /// Re-issue a failed entry under its original correlation id. Returns
    /// `false` if no failed entry carries that id.
    pub async fn retry(&mut self, client_ref: Uuid) -> bool {
        let body = match self.conversation.retry(client_ref) {
            Some(body) => body,
            None => return false,
        };
        self.deliver(client_ref, &body).await;
        true
    }

    /// Issue the write and reconcile the outcome against the staged entry.
    async fn deliver(&mut self, client_ref: Uuid, body: &str) {
        match self
            .backend
            .send_message(self.scope_id, body, client_ref)
            .await
        {
            Ok(record) => {
                // Direct confirmation. The realtime echo of the same row is
                // dropped as a duplicate when it arrives.
                self.conversation.apply_insert(record);
            }
            Err(e) if e.is_conflict() => {
                // The original write landed; the echo or a refetch will
                // confirm the entry. Not a failure.
                tracing::debug!(%client_ref, "Write already landed, awaiting confirmation");
            }
            Err(e) => {
                tracing::warn!(%client_ref, error = %e, "Message write failed");
                self.conversation.mark_failed(client_ref);
            }
        }
    }

    /// Apply a realtime frame.
    ///
    /// Only `messages`/`insert` changes scoped to this view's project are
    /// merged; a late event from a previously watched project is dropped
    /// here even if the old subscription's channel still had it queued.
    pub fn apply_event(&mut self, message: SyncMessage) {
        let SyncMessage::Change {
            collection,
            event,
            project_id,
            record,
            ..
        } = message
        else {
            return;
        };
        if collection != collections::MESSAGES || event != events::INSERT {
            return;
        }
        if project_id != self.scope_id {
            tracing::debug!(
                event_scope = project_id,
                view_scope = self.scope_id,
                "Dropping change event for a different project"
            );
            return;
        }
        match serde_json::from_value::<MessageRecord>(record) {
            Ok(record) => self.conversation.apply_insert(record),
            Err(e) => tracing::warn!(error = %e, "Ignoring undecodable message record"),
        }
    }
}
