//! One websocket subscription session to the AIS feed.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AisError, AisResult};
use crate::ingest::Ingestor;
use crate::types::SubscriptionFilter;

/// How long a connection attempt may take before it counts as failed.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// What a completed session saw.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    /// Inbound data frames handed to the ingestor.
    pub frames: u64,
}

/// Maintains exactly one active subscription to the feed at a time.
///
/// The subscriber never retries on its own; every exit path returns control
/// to the supervisor, which owns the backoff policy.
pub struct FeedSubscriber {
    config: Config,
}

impl FeedSubscriber {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run one session to completion: connect, subscribe, receive until the
    /// connection ends.
    ///
    /// Frames are handled strictly one at a time, in arrival order; the
    /// ingestor is awaited before the next frame is read.
    ///
    /// # Errors
    /// `AisError::Config` if the credentials are unusable (terminal);
    /// `AisError::WebSocket` for any transport failure (retryable).
    pub async fn run_session(&self, ingestor: &mut Ingestor) -> AisResult<SessionStats> {
        if self.config.api_key.is_empty() || self.config.target_mmsi.is_empty() {
            return Err(AisError::Config(
                "refusing to subscribe without an API key and target MMSI".into(),
            ));
        }

        let connect = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(&self.config.feed_url));
        let (ws_stream, _response) = match connect.await {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => return Err(AisError::WebSocket(e.to_string())),
            Err(_) => {
                return Err(AisError::WebSocket(format!(
                    "connect timed out after {CONNECT_TIMEOUT:?}"
                )));
            }
        };
        let (mut write, mut read) = ws_stream.split();

        let filter = SubscriptionFilter::for_vessel(&self.config.api_key, &self.config.target_mmsi);
        let control = serde_json::to_string(&filter)?;
        write
            .send(Message::Text(control.into()))
            .await
            .map_err(|e| AisError::WebSocket(format!("failed to send subscription: {e}")))?;

        info!(
            url = %self.config.feed_url,
            mmsi = %self.config.target_mmsi,
            "Subscribed to feed"
        );

        let mut stats = SessionStats::default();
        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    ingestor.handle_frame(&text).await;
                    stats.frames += 1;
                }
                Ok(Message::Binary(data)) => match std::str::from_utf8(&data) {
                    Ok(text) => {
                        ingestor.handle_frame(text).await;
                        stats.frames += 1;
                    }
                    Err(_) => warn!("Discarding non-UTF-8 binary frame"),
                },
                Ok(Message::Close(close)) => {
                    info!(frame = ?close, "Server closed the connection");
                    return Ok(stats);
                }
                // Ping/pong are answered at the protocol layer.
                Ok(_) => debug!("Ignoring control frame"),
                Err(e) => return Err(AisError::WebSocket(e.to_string())),
            }
        }

        info!(frames = stats.frames, "Stream ended");
        Ok(stats)
    }
}
