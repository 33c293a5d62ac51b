/// Errors from submitting or polling a prediction.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    /// No provider credential is configured. Never retried.
    #[error("REPLICATE_API_TOKEN not configured")]
    Configuration,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status or an `error` field.
    #[error("Replicate API error ({status}): {message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Provider error text or raw response body.
        message: String,
    },

    /// A 2xx response body that is not a prediction object.
    #[error("Invalid prediction response: {0}")]
    Decode(String),

    #[error("Prediction failed{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Failed { id: String, reason: Option<String> },

    #[error("Prediction was canceled")]
    Canceled { id: String },

    /// The attempt budget ran out while the job was still pending.
    #[error("Prediction timed out after {attempts} status checks ({elapsed_secs}s)")]
    Timeout {
        id: String,
        attempts: u32,
        elapsed_secs: u64,
    },

    #[error("Unexpected prediction status: {0}")]
    UnexpectedState(String),

    #[error("Prediction {id} succeeded without output")]
    MissingOutput { id: String },
}
