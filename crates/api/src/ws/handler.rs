use atrium_core::error::CoreError;
use atrium_core::roles::ROLE_ADMIN;
use atrium_core::sync::{validate_subscription, SyncMessage};
use atrium_core::types::DbId;
use atrium_db::repositories::{ProjectRepo, UserRepo};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::manager::Subscription;

/// Query parameters for the WebSocket upgrade.
///
/// Browsers cannot set custom headers on a WebSocket handshake, so the
/// access token travels as a query parameter instead of `Authorization`.
#[derive(Debug, Deserialize)]
pub struct WsAuthParams {
    /// JWT access token.
    pub token: String,
}

/// HTTP handler that authenticates the token and upgrades to WebSocket.
///
/// Rejects the upgrade with 401 before any socket is opened when the token
/// is invalid or the user no longer exists.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsAuthParams>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let claims = validate_token(&params.token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    // The account email scopes client subscriptions, so resolve it up front.
    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    Ok(ws.on_upgrade(move |socket| {
        handle_socket(socket, state, claims.sub, claims.role, user.email)
    }))
}

/// Drive one connection from upgrade to disconnect.
///
/// The socket splits into sink and stream: a spawned task drains the
/// manager's outbound channel into the sink while this task reads inbound
/// sync frames from the stream. Both halves are torn down together when
/// either side closes.
async fn handle_socket(
    socket: WebSocket,
    state: AppState,
    user_id: DbId,
    role: String,
    email: String,
) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = state
        .ws_manager
        .add(conn_id.clone(), user_id, &role, &email)
        .await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_sync_frame(&state, &conn_id, &role, &email, &text).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_msg) => {
                // Binary and Ping frames carry no sync protocol content.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection (and its subscriptions) and abort sender task.
    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Parse and dispatch a single inbound text frame.
async fn handle_sync_frame(state: &AppState, conn_id: &str, role: &str, email: &str, text: &str) {
    let msg = match serde_json::from_str::<SyncMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!(conn_id = %conn_id, error = %e, "Malformed sync frame");
            send_error(state, conn_id, "Malformed sync frame").await;
            return;
        }
    };

    match msg {
        SyncMessage::Subscribe {
            collection,
            event,
            project_id,
        } => {
            if let Err(reason) = validate_subscription(&collection, &event, project_id) {
                send_error(state, conn_id, &reason).await;
                return;
            }
            if let Err(reason) = authorize_scope(state, role, email, project_id).await {
                send_error(state, conn_id, &reason).await;
                return;
            }

            let sub = Subscription {
                collection: collection.clone(),
                event: event.clone(),
                project_id,
            };
            state.ws_manager.subscribe(conn_id, sub).await;

            // Ack even when the subscription already existed, so a client
            // resubscribing after a reconnect always sees confirmation.
            let ack = SyncMessage::Subscribed {
                collection,
                event,
                project_id,
            };
            send_frame(state, conn_id, &ack).await;
        }

        SyncMessage::Unsubscribe {
            collection,
            event,
            project_id,
        } => {
            let sub = Subscription {
                collection,
                event,
                project_id,
            };
            state.ws_manager.unsubscribe(conn_id, &sub).await;
        }

        // Subscribed / Change / Error flow server -> client only.
        other => {
            tracing::debug!(conn_id = %conn_id, frame = ?other, "Ignoring server-directed frame");
            send_error(state, conn_id, "Unexpected frame type").await;
        }
    }
}

/// Check whether the connection may watch the given project.
///
/// Admins may watch any existing project; clients only projects whose
/// `client_email` matches their account email.
async fn authorize_scope(
    state: &AppState,
    role: &str,
    email: &str,
    project_id: DbId,
) -> Result<(), String> {
    let project = match ProjectRepo::find_by_id(&state.pool, project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => return Err(format!("Project with id {project_id} not found")),
        Err(e) => {
            tracing::error!(error = %e, project_id, "Subscription authorization query failed");
            return Err("Subscription could not be authorized".to_string());
        }
    };

    if role == ROLE_ADMIN || project.client_email == email {
        Ok(())
    } else {
        Err("Not authorized to watch this project".to_string())
    }
}

/// Serialize and queue a sync frame for one connection.
async fn send_frame(state: &AppState, conn_id: &str, frame: &SyncMessage) {
    match serde_json::to_string(frame) {
        Ok(json) => {
            state
                .ws_manager
                .send_to_connection(conn_id, Message::Text(json.into()))
                .await;
        }
        Err(e) => {
            tracing::error!(conn_id = %conn_id, error = %e, "Failed to serialize sync frame");
        }
    }
}

/// Queue a `sync.error` frame for one connection.
async fn send_error(state: &AppState, conn_id: &str, message: &str) {
    let frame = SyncMessage::Error {
        message: message.to_string(),
    };
    send_frame(state, conn_id, &frame).await;
}
