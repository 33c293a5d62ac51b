//! Submit-then-poll driver shared by every generation mode.

use serde_json::Value;

use crate::api::PredictionApi;
use crate::error::PredictionError;
use crate::poll::{poll_for_completion, PollConfig};
use crate::prediction::{Prediction, PredictionStatus};

/// Submit one job and resolve it to a succeeded prediction.
///
/// - `succeeded` with output on submission: returned without polling.
/// - `succeeded` without output, at any point: [`PredictionError::MissingOutput`].
/// - `starting` / `processing`: handed to [`poll_for_completion`].
/// - anything else: [`PredictionError::UnexpectedState`].
pub async fn run_prediction(
    api: &dyn PredictionApi,
    version: &str,
    input: &Value,
    poll: &PollConfig,
) -> Result<Prediction, PredictionError> {
    let submitted = api.create_prediction(version, input).await?;

    let status = submitted.status.clone();
    let finished = match status {
        PredictionStatus::Succeeded if submitted.has_output() => {
            tracing::debug!(prediction_id = %submitted.id, "Prediction completed on submission");
            submitted
        }
        PredictionStatus::Succeeded => {
            return Err(PredictionError::MissingOutput { id: submitted.id });
        }
        ref pending if pending.is_pending() => {
            tracing::debug!(
                prediction_id = %submitted.id,
                status = %submitted.status,
                "Polling for completion",
            );
            poll_for_completion(api, &submitted.id, poll).await?
        }
        other => return Err(PredictionError::UnexpectedState(other.to_string())),
    };

    if !finished.has_output() {
        return Err(PredictionError::MissingOutput { id: finished.id });
    }
    Ok(finished)
}
