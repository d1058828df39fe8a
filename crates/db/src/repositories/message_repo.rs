//! Repository for the `messages` table.

use sqlx::PgPool;

use atrium_core::types::DbId;

use crate::models::message::{CreateMessage, Message};

/// Select list every query in this repo shares.
const COLUMNS: &str = "id, project_id, sender_role, body, client_ref, created_at";

/// Provides append and query operations for messages. The log is append-only:
/// there is no update or delete.
pub struct MessageRepo;

impl MessageRepo {
    /// Insert a new message, returning the created row.
    ///
    /// A duplicate `client_ref` violates `uq_messages_client_ref`, which the
    /// API layer maps to a conflict: the retry of an already-landed
    /// optimistic write is rejected rather than duplicated.
    pub async fn create(pool: &PgPool, input: &CreateMessage) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (project_id, sender_role, body, client_ref)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(input.project_id)
            .bind(&input.sender_role)
            .bind(&input.body)
            .bind(input.client_ref)
            .fetch_one(pool)
            .await
    }

    /// List all messages for a project in display order (oldest first).
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages
             WHERE project_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
