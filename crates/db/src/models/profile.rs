//! Profile entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atrium_core::types::{DbId, Timestamp};

/// A profile row from the `profiles` table. One per user, created at sign-up.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub user_id: DbId,
    pub full_name: Option<String>,
    pub job_title: Option<String>,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a profile.
#[derive(Debug, Deserialize)]
pub struct CreateProfile {
    pub user_id: DbId,
    pub full_name: Option<String>,
    pub role: String,
}

/// DTO for the onboarding update. All fields are optional.
///
/// The role is deliberately absent: it is fixed at sign-up and no update path
/// can change it.
#[derive(Debug, Deserialize)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub job_title: Option<String>,
}
