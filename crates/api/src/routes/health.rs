use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"` when everything answers, `"degraded"` otherwise.
    pub status: &'static str,
    /// Crate version, for checking what a deployment is running.
    pub version: &'static str,
    /// Result of the database round trip.
    pub db_healthy: bool,
}

/// Liveness probe. Always answers 200; a broken database shows up in the
/// body rather than as an error, so probes can distinguish "down" from
/// "up but degraded".
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = atrium_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// Router for the probe; mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
