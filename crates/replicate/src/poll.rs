//! Fixed-interval polling until a prediction reaches a terminal state.
//!
//! The cadence is deliberately flat (no backoff): one status GET, then a
//! fixed sleep, up to a hard attempt cap. Each call suspends only the
//! calling task.

use std::time::Duration;

use crate::api::PredictionApi;
use crate::error::PredictionError;
use crate::prediction::{Prediction, PredictionStatus};

/// Default delay between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Default number of status checks before giving up (5 minutes at 2s).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 150;

/// Tunable parameters for the polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between consecutive status checks.
    pub interval: Duration,
    /// Maximum number of status checks. Treated as at least 1.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollConfig {
    /// Upper bound on the time spent polling.
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts.max(1)
    }
}

/// Poll `id` until it succeeds, fails, is canceled or the attempt budget
/// is spent.
///
/// The first check happens immediately. No status check is issued past
/// `max_attempts`.
pub async fn poll_for_completion(
    api: &dyn PredictionApi,
    id: &str,
    config: &PollConfig,
) -> Result<Prediction, PredictionError> {
    let max_attempts = config.max_attempts.max(1);
    let started = tokio::time::Instant::now();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let prediction = api.get_prediction(id).await?;

        if prediction.status.is_terminal() {
            return settle(id, attempt, started, prediction);
        }
        if prediction.status.is_pending() {
            tracing::debug!(
                prediction_id = id,
                attempt,
                status = %prediction.status,
                "Prediction still running",
            );
        } else {
            tracing::warn!(
                prediction_id = id,
                attempt,
                status = %prediction.status,
                "Unknown prediction status",
            );
        }

        if attempt >= max_attempts {
            tracing::warn!(prediction_id = id, attempt, "Prediction polling budget exhausted");
            return Err(PredictionError::Timeout {
                id: id.to_string(),
                attempts: attempt,
                elapsed_secs: started.elapsed().as_secs(),
            });
        }

        tokio::time::sleep(config.interval).await;
    }
}

/// Turn a prediction in a terminal state into the polling result.
fn settle(
    id: &str,
    attempt: u32,
    started: tokio::time::Instant,
    prediction: Prediction,
) -> Result<Prediction, PredictionError> {
    match prediction.status {
        PredictionStatus::Failed => {
            let reason = prediction.error_message();
            tracing::warn!(prediction_id = id, attempt, reason = ?reason, "Prediction failed");
            Err(PredictionError::Failed {
                id: id.to_string(),
                reason,
            })
        }
        PredictionStatus::Canceled => {
            tracing::warn!(prediction_id = id, attempt, "Prediction canceled");
            Err(PredictionError::Canceled { id: id.to_string() })
        }
        _ => {
            tracing::info!(
                prediction_id = id,
                attempt,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Prediction succeeded",
            );
            Ok(prediction)
        }
    }
}
