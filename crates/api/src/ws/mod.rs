//! Real-time sync over WebSocket: the upgrade handler, the connection and
//! subscription registry, and the keepalive ping loop.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::{Subscription, WsManager};
