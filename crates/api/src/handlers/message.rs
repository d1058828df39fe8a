//! Handlers for the `/projects/{project_id}/messages` resource.
//!
//! Messages are append-only. The sender role comes from the caller's token,
//! never from the request body. Each accepted message is published to the
//! change bus so subscribed portals see it without polling.

use atrium_core::error::CoreError;
use atrium_core::sync::{collections, events};
use atrium_core::types::DbId;
use atrium_db::models::message::{CreateMessage, Message};
use atrium_db::repositories::MessageRepo;
use atrium_events::ChangeEvent;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::project::find_authorized;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /projects/{project_id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
    /// Client-generated idempotency reference. A retry of the same logical
    /// message carries the same `client_ref`; a second accept is rejected
    /// with 409 by the unique index.
    pub client_ref: Option<Uuid>,
}

/// GET /api/v1/projects/{project_id}/messages
///
/// Conversation history, oldest first.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Message>>> {
    find_authorized(&state, &auth_user, project_id).await?;

    let messages = MessageRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(messages))
}

/// POST /api/v1/projects/{project_id}/messages
///
/// Append a message to the conversation. Whitespace-only bodies are rejected
/// before any row is written.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    find_authorized(&state, &auth_user, project_id).await?;

    let body = input.body.trim();
    if body.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Message body must not be empty".into(),
        )));
    }

    let message = MessageRepo::create(
        &state.pool,
        &CreateMessage {
            project_id,
            sender_role: auth_user.role.clone(),
            body: body.to_string(),
            client_ref: input.client_ref,
        },
    )
    .await?;

    publish_insert(&state, &message);

    Ok((StatusCode::CREATED, Json(message)))
}

/// Publish a `messages`/`insert` change event carrying the full row.
fn publish_insert(state: &AppState, message: &Message) {
    match serde_json::to_value(message) {
        Ok(record) => {
            let event = ChangeEvent::new(collections::MESSAGES, events::INSERT, message.project_id)
                .with_record(record);
            state.change_bus.publish(event);
        }
        Err(e) => {
            tracing::error!(error = %e, message_id = message.id, "Failed to serialize message row");
        }
    }
}
