use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// State handed to every handler through `State<AppState>`.
///
/// Cloning is cheap: the pool is internally reference-counted and the rest
/// sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: atrium_db::DbPool,
    /// Server configuration (JWT settings, admin sign-up digest, timeouts).
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager for portal clients.
    pub ws_manager: Arc<WsManager>,
    /// Broadcast bus that write handlers publish change events to.
    pub change_bus: Arc<atrium_events::ChangeBus>,
}
