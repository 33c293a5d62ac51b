//! Liveness and client bootstrap endpoints.

use axum::extract::State;
use axum::Json;
use rendergen_core::generation::{MAX_IMAGE_BYTES, MAX_REFERENCE_IMAGES};
use rendergen_core::presets::{VIDEO_FPS, VIDEO_FRAMES, VIDEO_VERSION};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TestResponse {
    pub message: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestVideoResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub video_model: &'static str,
    pub video_frames: u32,
    pub video_fps: u32,
    pub strategy: &'static str,
}

/// Settings the browser needs before its first request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Empty when the API shares the page's origin.
    pub backend_url: String,
    pub max_images: usize,
    pub max_image_bytes: usize,
}

/// GET /test
pub async fn test() -> Json<TestResponse> {
    Json(TestResponse {
        message: "Backend is working!",
        timestamp: now(),
    })
}

/// GET /test-video
pub async fn test_video(State(state): State<AppState>) -> Json<TestVideoResponse> {
    Json(TestVideoResponse {
        message: "Video generation endpoint is available",
        timestamp: now(),
        video_model: VIDEO_VERSION,
        video_frames: VIDEO_FRAMES,
        video_fps: VIDEO_FPS,
        strategy: state.config.video_strategy.as_str(),
    })
}

/// GET /config
pub async fn client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(ClientConfig {
        backend_url: state.config.public_backend_url.clone(),
        max_images: MAX_REFERENCE_IMAGES,
        max_image_bytes: MAX_IMAGE_BYTES,
    })
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
