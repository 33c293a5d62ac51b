#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use rendergen_api::config::ServerConfig;
use rendergen_api::router::build_app_router;
use rendergen_api::state::AppState;
use rendergen_core::presets::VideoStrategy;
use rendergen_replicate::fake::ScriptedApi;

pub const BOUNDARY: &str = "rendergen-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
///
/// Polling is shortened to 1 ms x 3 attempts so pending-job tests finish
/// quickly, and the static directory does not exist.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        replicate_api_url: "http://127.0.0.1:9".to_string(),
        replicate_api_token: Some("test-token".to_string()),
        poll_interval: Duration::from_millis(1),
        poll_max_attempts: 3,
        video_strategy: VideoStrategy::ImageFallback,
        text_to_video_version: None,
        public_backend_url: String::new(),
        static_dir: "does-not-exist".to_string(),
        ffmpeg_enabled: false,
    }
}

/// Build the full application router around a scripted provider.
pub fn build_test_app(api: Arc<ScriptedApi>) -> Router {
    build_test_app_with(api, test_config())
}

/// Same as [`build_test_app`] with a custom configuration.
pub fn build_test_app_with(api: Arc<ScriptedApi>, config: ServerConfig) -> Router {
    let state = AppState::new(config.clone(), api);
    build_app_router(state, &config)
}

/// Issue a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Issue a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with a raw body and content type.
pub async fn post_raw(app: Router, uri: &str, content_type: &str, body: Vec<u8>) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a multipart POST request.
pub async fn post_form(app: Router, uri: &str, form: FormBuilder) -> Response {
    post_raw(
        app,
        uri,
        &format!("multipart/form-data; boundary={BOUNDARY}"),
        form.build(),
    )
    .await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Minimal `multipart/form-data` body builder.
#[derive(Default)]
pub struct FormBuilder {
    body: Vec<u8>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}
