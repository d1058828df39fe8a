//! Client-side error types.

use thiserror::Error;

/// Errors surfaced by the portal client library.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level HTTP failure (connection refused, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error envelope.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// WebSocket transport failure.
    #[error("WebSocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    /// A payload failed to encode or decode.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// An operation that needs a session was called without one.
    #[error("Not signed in")]
    NotSignedIn,
}

impl ClientError {
    /// The HTTP status code, if the API answered with an error envelope.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the API rejected a write as a duplicate.
    ///
    /// A conflict on an optimistic retry means the original write landed,
    /// so callers treat it as pending confirmation rather than a failure.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}
