//! WebSocket change subscriber with reconnect and backoff.
//!
//! One subscriber per mounted view: it opens the sync channel, sends a
//! single `sync.subscribe` frame, and forwards every parsed frame to the
//! consuming view over an unbounded channel. On transport drop it
//! reconnects with exponential backoff plus jitter and re-sends the
//! identical subscribe frame; the server acks duplicates without
//! duplicating delivery, so a reconnect never changes what the view sees.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use atrium_core::sync::SyncMessage;
use atrium_core::types::DbId;

use crate::error::ClientError;

// ---------------------------------------------------------------------------
// Backoff
// ---------------------------------------------------------------------------

/// Reconnect backoff parameters.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first reconnect attempt.
    pub initial_delay: Duration,
    /// Upper bound for the delay between attempts.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Fraction of the delay added or removed as jitter.
const JITTER: f64 = 0.5;

/// Compute the next backoff delay, clamped to the configured maximum.
pub fn next_delay(current: Duration, config: &BackoffConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Spread a delay by ±50% so reconnecting clients do not stampede the
/// server in lockstep after an outage.
pub fn with_jitter(delay: Duration) -> Duration {
    let factor = rand::rng().random_range((1.0 - JITTER)..=(1.0 + JITTER));
    Duration::from_millis((delay.as_millis() as f64 * factor) as u64)
}

// ---------------------------------------------------------------------------
// Subscriber
// ---------------------------------------------------------------------------

/// A running subscription, cancellable synchronously.
pub struct SubscriptionHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Tear the subscription down. Synchronous: after this returns the task
    /// is cancelled and no further frames are forwarded. An event already
    /// queued on the channel may still be observed by the consumer, which
    /// is why views scope-check every frame they apply.
    pub fn stop(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Maintains one live sync channel for a single subscription scope.
pub struct ChangeSubscriber {
    ws_url: String,
    subscribe_frame: SyncMessage,
    backoff: BackoffConfig,
    events: mpsc::UnboundedSender<SyncMessage>,
}

impl ChangeSubscriber {
    /// Create a subscriber for one collection/event/project scope. Parsed
    /// frames are forwarded on `events`.
    pub fn new(
        ws_url: String,
        collection: &str,
        event: &str,
        project_id: DbId,
        events: mpsc::UnboundedSender<SyncMessage>,
    ) -> Self {
        Self {
            ws_url,
            subscribe_frame: SyncMessage::Subscribe {
                collection: collection.to_string(),
                event: event.to_string(),
                project_id,
            },
            backoff: BackoffConfig::default(),
            events,
        }
    }

    /// Override the reconnect backoff parameters.
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Spawn the connect/reconnect loop on the current runtime.
    pub fn spawn(self) -> SubscriptionHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(cancel.clone()));
        SubscriptionHandle { cancel, task }
    }

    async fn run(self, cancel: CancellationToken) {
        let mut delay = self.backoff.initial_delay;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Subscription cancelled");
                    return;
                }
                result = self.run_session(&cancel) => match result {
                    Ok(()) => {
                        // Clean close (server shutdown or cancellation mid
                        // session). A successful session resets the backoff.
                        delay = self.backoff.initial_delay;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Sync channel dropped");
                        delay = next_delay(delay, &self.backoff);
                    }
                }
            }

            if cancel.is_cancelled() || self.events.is_closed() {
                return;
            }

            let wait = with_jitter(delay);
            tracing::debug!(delay_ms = wait.as_millis() as u64, "Reconnecting after delay");
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = sleep(wait) => {}
            }
        }
    }

    /// One connection lifetime: handshake, subscribe, then forward frames
    /// until the stream ends or the token cancels.
    async fn run_session(&self, cancel: &CancellationToken) -> Result<(), ClientError> {
        let (ws_stream, _) = connect_async(&self.ws_url).await?;
        let (mut sink, mut stream) = ws_stream.split();

        // Identical frame every time; the server treats re-subscribes as
        // idempotent and acks them again.
        let frame = serde_json::to_string(&self.subscribe_frame)?;
        sink.send(Message::Text(frame)).await?;
        tracing::info!("Sync channel established");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(());
                }
                message = stream.next() => match message {
                    Some(Ok(Message::Text(text))) => self.forward(&text),
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        // Handled automatically by tungstenite.
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Server closed the sync channel");
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        tracing::info!("Sync channel stream ended");
                        return Ok(());
                    }
                }
            }
        }
    }

    fn forward(&self, text: &str) {
        match serde_json::from_str::<SyncMessage>(text) {
            Ok(message) => {
                if self.events.send(message).is_err() {
                    tracing::debug!("Sync consumer dropped, frame discarded");
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unparseable sync frame");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    // ------------------------------------------------------------------
    // Test: delay doubles with the default multiplier
    // ------------------------------------------------------------------

    #[test]
    fn next_delay_doubles() {
        let config = BackoffConfig::default();
        let next = next_delay(Duration::from_secs(1), &config);
        assert_eq!(next, Duration::from_secs(2));
    }

    // ------------------------------------------------------------------
    // Test: delay clamps at the configured maximum
    // ------------------------------------------------------------------

    #[test]
    fn next_delay_clamps_at_max() {
        let config = BackoffConfig::default();
        let next = next_delay(Duration::from_secs(20), &config);
        assert_eq!(next, Duration::from_secs(30));
    }

    #[test]
    fn next_delay_already_at_max() {
        let config = BackoffConfig::default();
        let next = next_delay(Duration::from_secs(30), &config);
        assert_eq!(next, Duration::from_secs(30));
    }

    // ------------------------------------------------------------------
    // Test: custom multiplier is honored
    // ------------------------------------------------------------------

    #[test]
    fn custom_multiplier() {
        let config = BackoffConfig {
            multiplier: 3.0,
            ..Default::default()
        };
        let next = next_delay(Duration::from_secs(2), &config);
        assert_eq!(next, Duration::from_secs(6));
    }

    // ------------------------------------------------------------------
    // Test: full backoff sequence from initial to cap
    // ------------------------------------------------------------------

    #[test]
    fn full_backoff_sequence() {
        let config = BackoffConfig::default();
        let mut delay = config.initial_delay;
        let mut sequence = vec![delay.as_secs()];

        for _ in 0..7 {
            delay = next_delay(delay, &config);
            sequence.push(delay.as_secs());
        }

        assert_eq!(sequence, vec![1, 2, 4, 8, 16, 30, 30, 30]);
    }

    // ------------------------------------------------------------------
    // Test: jitter stays within ±50% of the base delay
    // ------------------------------------------------------------------

    #[test]
    fn jitter_stays_within_bounds() {
        let base = Duration::from_secs(10);
        for _ in 0..200 {
            let jittered = with_jitter(base);
            assert!(jittered >= Duration::from_secs(5), "{jittered:?} too short");
            assert!(jittered <= Duration::from_secs(15), "{jittered:?} too long");
        }
    }

    // ------------------------------------------------------------------
    // Test: stopping the handle ends the task
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn stopped_handle_ends_the_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Nothing listens on this port; the subscriber would retry forever.
        let subscriber =
            ChangeSubscriber::new("ws://127.0.0.1:9".to_string(), "messages", "insert", 1, tx);
        let handle = subscriber.spawn();

        handle.stop();

        // The task drops its sender when it ends, closing the channel.
        let ended = timeout(Duration::from_secs(1), rx.recv()).await;
        assert_eq!(ended.expect("task should end promptly"), None);
    }
}
