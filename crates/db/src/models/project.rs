//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atrium_core::types::{DbId, Timestamp};

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Project {
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

/// DTO for creating a new project.
///
/// Optional fields fall back to the column defaults (status `pending`,
/// progress 0, health `healthy`, next milestone `Kickoff Call`).
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub client_name: String,
    pub client_email: String,
    pub plan: Option<String>,
    pub status: Option<String>,
    pub lead_name: Option<String>,
    pub lead_email: Option<String>,
    pub budget: Option<String>,
    pub tech_stack: Vec<String>,
}

/// DTO for updating a project. All fields are optional.
///
/// `client_email` is absent: re-linking a project to a different client is
/// not an update operation.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub client_name: Option<String>,
    pub plan: Option<String>,
    pub status: Option<String>,
    pub progress: Option<i32>,
    pub health: Option<String>,
    pub next_milestone: Option<String>,
    pub lead_name: Option<String>,
    pub lead_email: Option<String>,
    pub budget: Option<String>,
    pub tech_stack: Option<Vec<String>>,
}
