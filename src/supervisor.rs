//! Session lifecycle: outcome classification, backoff, retry forever.
//!
//! The supervisor runs one session at a time and blocks for its whole
//! lifetime: `Connecting -> Connected -> Disconnected -> (delay) ->
//! Connecting`, looping until shutdown. Only a configuration error is
//! terminal.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{AisError, AisResult};
use crate::ingest::Ingestor;
use crate::stream::{FeedSubscriber, SessionStats};

/// Delay while consecutive failures stay under [`LONG_RETRY_THRESHOLD`].
pub const SHORT_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Delay once failures reach the threshold; avoids hammering the endpoint.
pub const LONG_RETRY_DELAY: Duration = Duration::from_secs(600);

/// Consecutive failures at which the long delay kicks in.
pub const LONG_RETRY_THRESHOLD: u32 = 3;

/// How one connection attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The session handled at least one inbound frame before ending.
    Healthy,
    /// The session failed, or ended without any traffic.
    Failed {
        /// Human-readable cause, for the log.
        reason: String,
    },
}

/// Two-tier retry delay keyed on the consecutive-failure count.
#[must_use]
pub const fn backoff_delay(consecutive_failures: u32) -> Duration {
    if consecutive_failures < LONG_RETRY_THRESHOLD {
        SHORT_RETRY_DELAY
    } else {
        LONG_RETRY_DELAY
    }
}

/// Pure counter transition applied after every session exit.
#[must_use]
pub fn next_failure_count(current: u32, outcome: &SessionOutcome) -> u32 {
    match outcome {
        SessionOutcome::Healthy => 0,
        SessionOutcome::Failed { .. } => current.saturating_add(1),
    }
}

/// Classify a session result into an outcome, or surface a terminal error.
///
/// A clean close with zero traffic counts as a failure: the counter only
/// resets once a session has demonstrably delivered data.
fn classify(result: AisResult<SessionStats>) -> AisResult<SessionOutcome> {
    match result {
        Ok(stats) if stats.frames > 0 => Ok(SessionOutcome::Healthy),
        Ok(_) => Ok(SessionOutcome::Failed {
            reason: "stream ended without delivering any frames".into(),
        }),
        Err(e @ AisError::Config(_)) => Err(e),
        Err(e) => Ok(SessionOutcome::Failed {
            reason: e.to_string(),
        }),
    }
}

/// One run of the feed subscription, driven to completion by the supervisor.
#[async_trait]
pub trait FeedSession {
    /// Run a single session until it disconnects or fails.
    async fn run(&mut self) -> AisResult<SessionStats>;
}

/// The real session: one subscriber feeding one ingestor.
pub struct IngestSession {
    subscriber: FeedSubscriber,
    ingestor: Ingestor,
}

impl IngestSession {
    #[must_use]
    pub const fn new(subscriber: FeedSubscriber, ingestor: Ingestor) -> Self {
        Self {
            subscriber,
            ingestor,
        }
    }
}

#[async_trait]
impl FeedSession for IngestSession {
    async fn run(&mut self) -> AisResult<SessionStats> {
        self.subscriber.run_session(&mut self.ingestor).await
    }
}

/// Owns the session lifecycle and the backoff state.
pub struct Supervisor<S> {
    session: S,
    consecutive_failures: u32,
}

impl<S: FeedSession + Send> Supervisor<S> {
    #[must_use]
    pub const fn new(session: S) -> Self {
        Self {
            session,
            consecutive_failures: 0,
        }
    }

    /// Current consecutive-failure count.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Drive sessions forever, backing off between attempts.
    ///
    /// Returns `Ok(())` when `shutdown` fires (the backoff delay is
    /// interruptible) and `Err` only for a terminal configuration error.
    ///
    /// # Errors
    /// Propagates `AisError::Config` from the session; every other session
    /// error is absorbed into the retry loop.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> AisResult<()> {
        loop {
            info!(
                consecutive_failures = self.consecutive_failures,
                "Starting connection attempt"
            );

            let result = tokio::select! {
                result = self.session.run() => result,
                _ = shutdown.changed() => {
                    info!("Shutdown requested, stopping supervisor");
                    return Ok(());
                }
            };

            let outcome = classify(result)?;
            self.consecutive_failures =
                next_failure_count(self.consecutive_failures, &outcome);
            match &outcome {
                SessionOutcome::Healthy => info!("Session ended after delivering traffic"),
                SessionOutcome::Failed { reason } => warn!(
                    reason = %reason,
                    consecutive_failures = self.consecutive_failures,
                    "Session failed"
                ),
            }

            let delay = backoff_delay(self.consecutive_failures);
            debug!(delay_secs = delay.as_secs(), "Backing off before reconnect");
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    info!("Shutdown requested during backoff");
                    return Ok(());
                }
            }
        }
    }
}
