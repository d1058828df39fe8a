//! Refresh-token session row and insert payload.

use sqlx::FromRow;

use atrium_core::types::{DbId, Timestamp};

/// One issued refresh token in the `user_sessions` table.
///
/// Stores only the token's SHA-256 digest. `is_revoked` flips on rotation
/// and sign-out; revoked rows are kept until cleanup so reuse of a rotated
/// token stays detectable.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a freshly issued token.
#[derive(Debug)]
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
