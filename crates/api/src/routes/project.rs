//! The `/projects` route table, with message and invoice routes nested
//! under `/projects/{project_id}/...`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{invoice, message, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                           -> list (admin)
/// POST   /                           -> create (admin)
/// GET    /mine                       -> mine
/// GET    /{id}                       -> get_by_id (scoped)
/// PUT    /{id}                       -> update (admin)
///
/// GET    /{project_id}/messages      -> list (scoped)
/// POST   /{project_id}/messages      -> create (scoped)
///
/// GET    /{project_id}/invoices      -> list (scoped)
/// POST   /{project_id}/invoices      -> create (admin)
/// ```
pub fn router() -> Router<AppState> {
    let message_routes = Router::new().route("/", get(message::list).post(message::create));

    let invoice_routes = Router::new().route("/", get(invoice::list).post(invoice::create));

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/mine", get(project::mine))
        .route("/{id}", get(project::get_by_id).put(project::update))
        .nest("/{project_id}/messages", message_routes)
        .nest("/{project_id}/invoices", invoice_routes)
}
