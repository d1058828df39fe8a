//! Role-gating extractor layered on [`AuthUser`].

use atrium_core::error::CoreError;
use atrium_core::roles::ROLE_ADMIN;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Admits only authenticated admins; anyone else gets 403.
///
/// Putting the requirement in the extractor keeps admin-only handlers
/// honest. A handler that takes `RequireAdmin` cannot run for a client
/// token:
///
/// ```ignore
/// async fn create_project(
///     RequireAdmin(admin): RequireAdmin,
///     Json(body): Json<CreateProjectRequest>,
/// ) -> AppResult<Json<ProjectResponse>> { /* ... */ }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role == ROLE_ADMIN {
            Ok(RequireAdmin(user))
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )))
        }
    }
}
