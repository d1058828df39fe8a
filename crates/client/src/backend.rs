//! The backend seam the portal components talk through.
//!
//! Every stage of the portal flow (session gate, entity fetch, conversation,
//! progress sync) takes an `Arc<dyn PortalBackend>` instead of a concrete
//! transport, so the whole flow runs against [`HttpBackend`](crate::http) in
//! production and an in-memory fake in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atrium_core::conversation::MessageRecord;
use atrium_core::types::{DbId, Timestamp};

use crate::error::ClientError;

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

/// The authenticated user as the session endpoints report it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub id: DbId,
    pub email: String,
    pub role: String,
    pub full_name: Option<String>,
}

/// A project row as the API serves it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectRecord {
    pub id: DbId,
    pub name: String,
    pub client_name: String,
    pub client_email: String,
    pub plan: String,
    pub status: String,
    pub progress: i32,
    pub health: String,
    pub next_milestone: String,
    pub lead_name: Option<String>,
    pub lead_email: Option<String>,
    pub budget: Option<String>,
    pub tech_stack: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An invoice row as the API serves it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvoiceRecord {
    pub id: DbId,
    pub project_id: DbId,
    pub description: String,
    pub amount: String,
    pub status: String,
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

/// Payload for `sign_up`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Secret phrase for the elevated sign-up path. Never logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_key: Option<String>,
}

/// Partial project update. Unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_milestone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    /// Raw comma-separated tag string, split server-side in entry order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<String>,
}

// ---------------------------------------------------------------------------
// The backend trait
// ---------------------------------------------------------------------------

/// The four primitive operation shapes the portal flow consumes: session
/// introspection, sign-in/up/out, scoped row queries, and row writes.
///
/// Realtime change delivery is not part of this trait; it arrives over the
/// WebSocket subscriber as [`SyncMessage`](atrium_core::sync::SyncMessage)
/// frames which the views apply directly.
#[async_trait]
pub trait PortalBackend: Send + Sync {
    /// The current session, or `None` when signed out.
    async fn current_session(&self) -> Result<Option<SessionUser>, ClientError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ClientError>;

    async fn sign_up(&self, input: SignupInput) -> Result<SessionUser, ClientError>;

    async fn sign_out(&self) -> Result<(), ClientError>;

    /// Projects linked to the signed-in client identity, newest first.
    async fn my_projects(&self) -> Result<Vec<ProjectRecord>, ClientError>;

    /// All projects, newest first. Admin only.
    async fn all_projects(&self) -> Result<Vec<ProjectRecord>, ClientError>;

    /// Full message history for a project, oldest first.
    async fn project_messages(&self, project_id: DbId)
        -> Result<Vec<MessageRecord>, ClientError>;

    /// Append a message. `client_ref` is the correlation id of the staged
    /// optimistic entry; retries of the same logical message reuse it.
    async fn send_message(
        &self,
        project_id: DbId,
        body: &str,
        client_ref: Uuid,
    ) -> Result<MessageRecord, ClientError>;

    /// Apply a partial update to a project. Admin only.
    async fn update_project(
        &self,
        project_id: DbId,
        patch: ProjectPatch,
    ) -> Result<ProjectRecord, ClientError>;

    /// Billing history for a project, newest billing date first.
    async fn invoices(&self, project_id: DbId) -> Result<Vec<InvoiceRecord>, ClientError>;
}
