pub mod auth;
pub mod health;
pub mod profile;
pub mod project;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                WebSocket (?token=<jwt>)
///
/// /auth/signup                       signup (public, admin key gated)
/// /auth/login                        login (public)
/// /auth/refresh                      refresh (public)
/// /auth/logout                       logout (requires auth)
/// /auth/session                      current session (requires auth)
///
/// /profile                           get, update (requires auth)
///
/// /projects                          list (admin), create (admin)
/// /projects/mine                     caller's linked projects
/// /projects/{id}                     get (scoped), update (admin)
/// /projects/{project_id}/messages    list, append (scoped)
/// /projects/{project_id}/invoices    list (scoped), create (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint for realtime sync.
        .route("/ws", get(ws::ws_handler))
        // Authentication routes (signup, login, refresh, logout, session).
        .nest("/auth", auth::router())
        // Profile onboarding routes.
        .nest("/profile", profile::router())
        // Project routes (also nests messages and invoices).
        .nest("/projects", project::router())
}
