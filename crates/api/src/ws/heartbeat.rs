use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::ws::manager::WsManager;

/// Seconds between ping sweeps.
const PING_PERIOD_SECS: u64 = 30;

/// Spawn the ping loop that keeps idle WebSocket connections from being
/// closed by intermediaries.
///
/// Runs for the life of the process; `main` aborts the returned handle
/// during shutdown. A sweep that falls behind under load resumes on the
/// next period rather than bursting missed ticks.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(PING_PERIOD_SECS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let connections = ws_manager.connection_count().await;
            if connections > 0 {
                tracing::debug!(connections, "Pinging WebSocket clients");
            }
            ws_manager.ping_all().await;
        }
    })
}
