//! REST client for the prediction endpoints.
//!
//! Wraps `POST /predictions` and `GET /predictions/{id}` using [`reqwest`].
//! [`PredictionApi`] is the seam the rest of the workspace depends on so
//! tests can swap in a scripted provider.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PredictionError;
use crate::prediction::{error_text, Prediction};

/// Default base URL of the hosted provider.
pub const DEFAULT_API_URL: &str = "https://api.replicate.com/v1";

/// Per-request timeout for a single submit or status call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Submission and status lookup for prediction jobs.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// Submit a job for `version` with the given model input.
    async fn create_prediction(
        &self,
        version: &str,
        input: &Value,
    ) -> Result<Prediction, PredictionError>;

    /// Fetch the current state of a job.
    async fn get_prediction(&self, id: &str) -> Result<Prediction, PredictionError>;

    /// Whether a credential is present. Used by health reporting only;
    /// the calls above fail with [`PredictionError::Configuration`] anyway.
    fn is_configured(&self) -> bool;
}

/// HTTP client for the hosted prediction API.
pub struct ReplicateApi {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl ReplicateApi {
    /// Create a client. A missing or blank `token` is accepted here and
    /// reported as [`PredictionError::Configuration`] on first use.
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self::with_client(client, api_url, token)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let token = token.filter(|t| !t.trim().is_empty());
        Self {
            client,
            api_url,
            token,
        }
    }

    fn token(&self) -> Result<&str, PredictionError> {
        self.token.as_deref().ok_or(PredictionError::Configuration)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. On failure the
    /// provider's `error`/`detail` text is preferred over the raw body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, PredictionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .and_then(error_text)
                        .or_else(|| v.get("detail").and_then(error_text))
                })
                .unwrap_or(body);
            return Err(PredictionError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Parse a successful body into a [`Prediction`]. When `reject_error`
    /// is set, a non-empty `error` field is turned into
    /// [`PredictionError::Provider`].
    async fn parse_prediction(
        response: reqwest::Response,
        reject_error: bool,
    ) -> Result<Prediction, PredictionError> {
        let status = response.status().as_u16();
        let body: Value = Self::ensure_success(response).await?.json().await?;

        if reject_error {
            if let Some(message) = body.get("error").and_then(error_text) {
                return Err(PredictionError::Provider { status, message });
            }
        }

        serde_json::from_value(body).map_err(|e| PredictionError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PredictionApi for ReplicateApi {
    async fn create_prediction(
        &self,
        version: &str,
        input: &Value,
    ) -> Result<Prediction, PredictionError> {
        let token = self.token()?;
        let body = serde_json::json!({
            "version": version,
            "input": input,
        });

        let response = self
            .client
            .post(format!("{}/predictions", self.api_url))
            .header(reqwest::header::AUTHORIZATION, format!("Token {token}"))
            .json(&body)
            .send()
            .await?;

        let prediction = Self::parse_prediction(response, true).await?;
        tracing::info!(
            prediction_id = %prediction.id,
            version,
            status = %prediction.status,
            "Prediction submitted",
        );
        Ok(prediction)
    }

    async fn get_prediction(&self, id: &str) -> Result<Prediction, PredictionError> {
        let token = self.token()?;

        let response = self
            .client
            .get(format!("{}/predictions/{}", self.api_url, id))
            .header(reqwest::header::AUTHORIZATION, format!("Token {token}"))
            .send()
            .await?;

        Self::parse_prediction(response, false).await
    }

    fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use crate::prediction::PredictionStatus;

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Accepts submissions carrying `Token secret`, like the hosted API.
    fn authenticated_provider() -> Router {
        Router::new().route(
            "/predictions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
                if auth != Some("Token secret") {
                    return (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "detail": "Invalid token." })),
                    );
                }
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "id": "p1",
                        "version": body["version"],
                        "status": "starting",
                        "input": body["input"],
                    })),
                )
            }),
        )
    }

    /// Client that talks to the local server directly, ignoring any proxy
    /// settings in the environment.
    fn local_api(url: impl Into<String>, token: &str) -> ReplicateApi {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        ReplicateApi::with_client(client, url, Some(token.to_string()))
    }

    fn answering(status: StatusCode, body: Value) -> Router {
        Router::new().route(
            "/predictions",
            post(move || async move { (status, Json(body)) }),
        )
    }

    #[tokio::test]
    async fn submission_sends_token_and_returns_prediction() {
        let url = serve(authenticated_provider()).await;
        let api = local_api(url, "secret");

        let prediction = api
            .create_prediction("v1", &json!({ "prompt": "a house" }))
            .await
            .unwrap();

        assert_eq!(prediction.id, "p1");
        assert_eq!(prediction.version.as_deref(), Some("v1"));
        assert_eq!(prediction.status, PredictionStatus::Starting);
        assert_eq!(prediction.input["prompt"], "a house");
    }

    #[tokio::test]
    async fn wrong_token_surfaces_provider_detail() {
        let url = serve(authenticated_provider()).await;
        let api = local_api(url, "nope");

        let err = api.create_prediction("v1", &json!({})).await.unwrap_err();
        assert_matches!(
            err,
            PredictionError::Provider { status: 401, ref message } if message == "Invalid token."
        );
    }

    #[tokio::test]
    async fn rejected_submission_uses_detail_text() {
        let url = serve(answering(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "detail": "Invalid version or not permitted" }),
        ))
        .await;
        let api = local_api(url, "secret");

        let err = api.create_prediction("bad", &json!({})).await.unwrap_err();
        assert_matches!(
            err,
            PredictionError::Provider { status: 422, ref message }
                if message == "Invalid version or not permitted"
        );
    }

    #[tokio::test]
    async fn error_field_on_created_submission_is_a_provider_error() {
        let url = serve(answering(
            StatusCode::CREATED,
            json!({ "id": "p1", "status": "failed", "error": "Model is offline" }),
        ))
        .await;
        let api = local_api(url, "secret");

        let err = api.create_prediction("v1", &json!({})).await.unwrap_err();
        assert_matches!(
            err,
            PredictionError::Provider { status: 201, ref message } if message == "Model is offline"
        );
    }

    #[tokio::test]
    async fn non_json_error_body_is_passed_through() {
        let router = Router::new().route(
            "/predictions",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream unavailable") }),
        );
        let url = serve(router).await;
        let api = local_api(url, "secret");

        let err = api.create_prediction("v1", &json!({})).await.unwrap_err();
        assert_matches!(
            err,
            PredictionError::Provider { status: 502, ref message }
                if message == "upstream unavailable"
        );
    }

    #[tokio::test]
    async fn status_lookup_keeps_failure_reason() {
        let router = Router::new().route(
            "/predictions/{id}",
            get(|axum::extract::Path(id): axum::extract::Path<String>| async move {
                Json(json!({ "id": id, "status": "failed", "error": "CUDA out of memory" }))
            }),
        );
        let url = serve(router).await;
        let api = local_api(format!("{url}/"), "secret");

        let prediction = api.get_prediction("p7").await.unwrap();

        assert_eq!(prediction.id, "p7");
        assert_eq!(prediction.status, PredictionStatus::Failed);
        assert_eq!(prediction.error_message().as_deref(), Some("CUDA out of memory"));
    }

    #[tokio::test]
    async fn malformed_prediction_is_a_decode_error() {
        let url = serve(answering(StatusCode::CREATED, json!({ "status": "starting" }))).await;
        let api = local_api(url, "secret");

        let err = api.create_prediction("v1", &json!({})).await.unwrap_err();
        assert_matches!(err, PredictionError::Decode(_));
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        // Port 9 is never contacted: the token check comes first.
        let api = ReplicateApi::new("http://127.0.0.1:9", None);
        assert!(!api.is_configured());

        let err = api
            .create_prediction("v", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert_matches!(err, PredictionError::Configuration);

        let err = api.get_prediction("abc").await.unwrap_err();
        assert_matches!(err, PredictionError::Configuration);
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let api = ReplicateApi::new(DEFAULT_API_URL, Some("   ".into()));
        assert!(!api.is_configured());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = ReplicateApi::new("https://example.test/v1/", Some("t".into()));
        assert_eq!(api.api_url, "https://example.test/v1");
    }
}
