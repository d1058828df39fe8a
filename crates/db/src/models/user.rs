//! Account row and insert payload for the `users` table.

use serde::Deserialize;
use sqlx::FromRow;

use atrium_core::types::{DbId, Timestamp};

/// One account row.
///
/// Carries the password hash, so this type must never be serialized into an
/// API response; handlers build their own response shapes from the fields
/// they may expose. The counter and lock timestamp back the failed-sign-in
/// lockout.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload; the hash is produced by the API layer, never raw input.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
}
