//! Message entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use atrium_core::types::{DbId, Timestamp};

/// A message row from the `messages` table. Append-only; `id` is the
/// authoritative ordering sequence.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: DbId,
    pub project_id: DbId,
    pub sender_role: String,
    pub body: String,
    pub client_ref: Option<Uuid>,
    pub created_at: Timestamp,
}

/// DTO for creating a message.
#[derive(Debug)]
pub struct CreateMessage {
    pub project_id: DbId,
    pub sender_role: String,
    pub body: String,
    pub client_ref: Option<Uuid>,
}
