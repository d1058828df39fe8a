//! Handlers for the `/profile` resource (onboarding).

use atrium_core::error::CoreError;
use atrium_core::roles::ROLE_ADMIN;
use atrium_db::models::profile::{Profile, UpdateProfile};
use atrium_db::repositories::ProfileRepo;
use axum::extract::State;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Job title stored when an admin completes onboarding without one.
const DEFAULT_ADMIN_JOB_TITLE: &str = "Administrator";

/// GET /api/v1/profile
pub async fn get(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Json<Profile>> {
    let profile = ProfileRepo::find_by_user_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Profile",
            id: auth_user.user_id,
        }))?;
    Ok(Json(profile))
}

/// PUT /api/v1/profile
///
/// Onboarding update: set full name and job title. Blank strings are treated
/// as absent. An admin finishing onboarding with no job title gets
/// `"Administrator"`. The role column is never part of this update.
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(mut input): Json<UpdateProfile>,
) -> AppResult<Json<Profile>> {
    input.full_name = input
        .full_name
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    input.job_title = input
        .job_title
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let current = ProfileRepo::find_by_user_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Profile",
            id: auth_user.user_id,
        }))?;

    // Default the admin job title only when neither the request nor the
    // existing row carries one.
    if auth_user.role == ROLE_ADMIN && input.job_title.is_none() && current.job_title.is_none() {
        input.job_title = Some(DEFAULT_ADMIN_JOB_TITLE.to_string());
    }

    let profile = ProfileRepo::update(&state.pool, auth_user.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Profile",
            id: auth_user.user_id,
        }))?;
    Ok(Json(profile))
}
