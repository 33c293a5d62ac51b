//! Prediction wire types.
//!
//! The provider answers both `POST /predictions` and
//! `GET /predictions/{id}` with the same object shape:
//! `{"id", "version", "status", "input", "output", "error", ...}`.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Lifecycle state reported by the provider.
///
/// `starting -> processing -> {succeeded | failed | canceled}`. Statuses the
/// client does not know are kept verbatim in [`PredictionStatus::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Unknown(String),
}

impl From<String> for PredictionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "starting" => Self::Starting,
            "processing" => Self::Processing,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::Unknown(s),
        }
    }
}

impl PredictionStatus {
    /// No transition leaves a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// `starting` or `processing`.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Starting | Self::Processing)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "starting",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Unknown(s) => s,
        }
    }
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prediction job as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
    pub status: PredictionStatus,
    #[serde(default)]
    pub input: Value,
    /// Raw output. A URL, an array of URLs, or a structured frame sequence
    /// depending on the model.
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub logs: Option<String>,
}

impl Prediction {
    /// Whether `output` carries anything usable.
    pub fn has_output(&self) -> bool {
        match &self.output {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            _ => true,
        }
    }

    /// Provider error message, if any.
    pub fn error_message(&self) -> Option<String> {
        error_text(self.error.as_ref()?)
    }
}

/// Render a provider `error` field as text. `null` and empty strings count
/// as no error.
pub(crate) fn error_text(error: &Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("detail")
            .or_else(|| map.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(error.to_string())),
        other => Some(other.to_string()),
    }
}
