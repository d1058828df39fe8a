//! Handlers for the `/projects/{project_id}/invoices` resource.

use atrium_core::error::CoreError;
use atrium_core::status::{is_valid_invoice_status, VALID_INVOICE_STATUSES};
use atrium_core::types::DbId;
use atrium_db::models::invoice::{CreateInvoice, Invoice};
use atrium_db::repositories::InvoiceRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::handlers::project::find_authorized;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/v1/projects/{project_id}/invoices
///
/// Billing history, newest billing date first.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Invoice>>> {
    find_authorized(&state, &auth_user, project_id).await?;

    let invoices = InvoiceRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(invoices))
}

/// POST /api/v1/projects/{project_id}/invoices (admin only)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateInvoice>,
) -> AppResult<(StatusCode, Json<Invoice>)> {
    find_authorized(&state, &admin, project_id).await?;

    if input.description.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Invoice description must not be empty".into(),
        )));
    }
    if let Some(status) = &input.status {
        if !is_valid_invoice_status(status) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid invoice status '{status}'. Must be one of: {}",
                VALID_INVOICE_STATUSES.join(", ")
            ))));
        }
    }

    let invoice = InvoiceRepo::create(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}
