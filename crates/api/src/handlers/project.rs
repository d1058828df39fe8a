//! Handlers for the `/projects` resource.
//!
//! Project creation and editing are admin-only. Clients see projects linked
//! to their account email via `GET /projects/mine` and per-project reads.

use atrium_core::error::CoreError;
use atrium_core::progress::clamp_progress;
use atrium_core::roles::ROLE_ADMIN;
use atrium_core::status::{is_valid_health, is_valid_status, VALID_HEALTH, VALID_STATUSES};
use atrium_core::sync::{collections, events};
use atrium_core::tags::parse_tech_stack;
use atrium_core::types::DbId;
use atrium_db::models::project::{CreateProject, Project, UpdateProject};
use atrium_db::repositories::{ProjectRepo, UserRepo};
use atrium_events::ChangeEvent;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /projects`.
///
/// `tech_stack` is the raw comma-separated string from the console form
/// (e.g. `"Next.js, Supabase, Tailwind"`); it is split, trimmed, and stored
/// as an array in entry order.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub client_name: String,
    pub client_email: String,
    pub plan: Option<String>,
    pub status: Option<String>,
    pub lead_name: Option<String>,
    pub lead_email: Option<String>,
    pub budget: Option<String>,
    pub tech_stack: Option<String>,
}

/// Request body for `PUT /projects/{id}`. All fields optional.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
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
    pub tech_stack: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/projects (admin only)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<Project>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Project name must not be empty".into(),
        )));
    }
    if !input.client_email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid client email is required".into(),
        )));
    }
    if let Some(status) = &input.status {
        ensure_valid_status(status)?;
    }

    let tech_stack = input
        .tech_stack
        .as_deref()
        .map(parse_tech_stack)
        .unwrap_or_default();

    let project = ProjectRepo::create(
        &state.pool,
        &CreateProject {
            name: input.name,
            client_name: input.client_name,
            client_email: input.client_email.trim().to_lowercase(),
            plan: input.plan,
            status: input.status,
            lead_name: input.lead_name,
            lead_email: input.lead_email,
            budget: input.budget,
            tech_stack,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects (admin only)
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<Project>>> {
    let projects = ProjectRepo::list(&state.pool).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/mine
///
/// Projects linked to the caller's account email, newest first.
pub async fn mine(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<Project>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let projects = ProjectRepo::list_by_client_email(&state.pool, &user.email).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = find_authorized(&state, &auth_user, id).await?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id} (admin only)
///
/// Applies only the provided fields. Progress is clamped to `[0, 100]`
/// before it reaches the database. On success a `projects`/`update` change
/// event carrying the full updated row is published.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectRequest>,
) -> AppResult<Json<Project>> {
    if let Some(status) = &input.status {
        ensure_valid_status(status)?;
    }
    if let Some(health) = &input.health {
        ensure_valid_health(health)?;
    }

    let changes = UpdateProject {
        name: input.name,
        client_name: input.client_name,
        plan: input.plan,
        status: input.status,
        progress: input.progress.map(clamp_progress),
        health: input.health,
        next_milestone: input.next_milestone,
        lead_name: input.lead_name,
        lead_email: input.lead_email,
        budget: input.budget,
        tech_stack: input.tech_stack.as_deref().map(parse_tech_stack),
    };

    let project = ProjectRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    publish_update(&state, &project);

    Ok(Json(project))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a project and enforce that the caller may see it.
///
/// Admins may read any project; clients only projects whose `client_email`
/// matches their account email.
pub(crate) async fn find_authorized(
    state: &AppState,
    auth_user: &AuthUser,
    id: DbId,
) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    if auth_user.role == ROLE_ADMIN {
        return Ok(project);
    }

    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if project.client_email == user.email {
        Ok(project)
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Not authorized to view this project".into(),
        )))
    }
}

/// Publish a `projects`/`update` change event carrying the full row.
fn publish_update(state: &AppState, project: &Project) {
    match serde_json::to_value(project) {
        Ok(record) => {
            let event = ChangeEvent::new(collections::PROJECTS, events::UPDATE, project.id)
                .with_record(record);
            state.change_bus.publish(event);
        }
        Err(e) => {
            tracing::error!(error = %e, project_id = project.id, "Failed to serialize project row");
        }
    }
}

fn ensure_valid_status(status: &str) -> AppResult<()> {
    if is_valid_status(status) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Invalid status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))))
    }
}

fn ensure_valid_health(value: &str) -> AppResult<()> {
    if is_valid_health(value) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Invalid health '{value}'. Must be one of: {}",
            VALID_HEALTH.join(", ")
        ))))
    }
}
