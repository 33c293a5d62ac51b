use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rendergen_core::error::CoreError;
use rendergen_core::ffmpeg::FfmpegError;
use rendergen_replicate::PredictionError;
use serde_json::json;

/// Shown in `details` when the provider credential is missing.
const CONFIGURATION_DETAILS: &str =
    "Set REPLICATE_API_TOKEN in the server environment and restart the server.";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent `{error, details?}`
/// JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `rendergen_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A prediction that could not be completed, with the mode's hint.
    #[error("{source}")]
    Prediction {
        source: PredictionError,
        hint: &'static str,
    },

    /// Server-side frame encoding failed.
    #[error(transparent)]
    Ffmpeg(#[from] FfmpegError),

    /// A rejected multipart upload. Rendered as `File upload error: <cause>`.
    #[error("File upload error: {0}")]
    Upload(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An upstream resource (e.g. a frame URL) could not be fetched.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Attach a mode's failure hint to a prediction error.
    pub fn prediction(source: PredictionError, hint: &'static str) -> Self {
        Self::Prediction { source, hint }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details): (StatusCode, String, Option<String>) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
                CoreError::UnrecognisedOutput(msg) => {
                    tracing::error!(error = %msg, "Unrecognised prediction output");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "The prediction returned no usable output".to_string(),
                        None,
                    )
                }
            },

            // --- Prediction errors ---
            AppError::Prediction { source, hint } => classify_prediction_error(source, hint),

            // --- Frame encoding ---
            AppError::Ffmpeg(err) => {
                tracing::error!(error = %err, "Video assembly failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Video assembly failed".to_string(),
                    None,
                )
            }

            // --- HTTP-specific errors ---
            AppError::Upload(_) => (StatusCode::BAD_REQUEST, self.to_string(), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::BadGateway(msg) => {
                tracing::warn!(error = %msg, "Upstream fetch failed");
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = match details {
            Some(details) => json!({ "error": message, "details": details }),
            None => json!({ "error": message }),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Map a prediction error to status, message and details.
///
/// Every provider-side failure is a 500. The missing credential gets a
/// fixed message; everything else carries the mode's hint.
fn classify_prediction_error(
    err: &PredictionError,
    hint: &str,
) -> (StatusCode, String, Option<String>) {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    match err {
        PredictionError::Configuration => {
            tracing::error!("Prediction provider credential is not configured");
            (
                status,
                "Provider credential is not configured".to_string(),
                Some(CONFIGURATION_DETAILS.to_string()),
            )
        }
        PredictionError::Provider { status: code, message } => {
            tracing::error!(provider_status = code, error = %message, "Provider rejected request");
            (status, message.clone(), Some(hint.to_string()))
        }
        PredictionError::Request(e) => {
            tracing::error!(error = %e, "Prediction provider unreachable");
            (
                status,
                "Could not reach the prediction provider".to_string(),
                Some(hint.to_string()),
            )
        }
        other => {
            tracing::error!(error = %other, "Prediction did not complete");
            (status, other.to_string(), Some(hint.to_string()))
        }
    }
}

