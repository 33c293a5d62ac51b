//! Handlers for the multipart generation routes.
//!
//! Routes:
//! - `POST /generate`               text-to-image, or image-to-image with uploads
//! - `POST /generate-face`          portrait generation
//! - `POST /generate-face-enhanced` portrait generation, stronger template
//! - `POST /generate-video`         video per the configured strategy

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use rendergen_core::generation::GenerationMode;

use crate::engine;
use crate::error::{AppError, AppResult};
use crate::response::GenerationResponse;
use crate::state::AppState;
use crate::upload::read_generation_form;

/// POST /generate
pub async fn generate_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<GenerationResponse>> {
    run(&state, GenerationMode::TextToImage, multipart).await
}

/// POST /generate-face
pub async fn generate_face(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<GenerationResponse>> {
    run(&state, GenerationMode::Face, multipart).await
}

/// POST /generate-face-enhanced
pub async fn generate_face_enhanced(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<GenerationResponse>> {
    run(&state, GenerationMode::EnhancedFace, multipart).await
}

/// POST /generate-video
///
/// Depending on `VIDEO_STRATEGY` this answers with a cinematic still
/// (`{image}`) or the video model's output (`{video}` / `{videoSequence}`).
pub async fn generate_video(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<GenerationResponse>> {
    run(&state, GenerationMode::Video, multipart).await
}

/// Decode, validate and run one request. Nothing reaches the provider
/// until the form has passed validation.
async fn run(
    state: &AppState,
    mode: GenerationMode,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<GenerationResponse>> {
    let multipart = multipart.map_err(|e| AppError::Upload(e.body_text()))?;
    let form = read_generation_form(multipart).await?;
    let request = form.into_request()?;

    let result = engine::generate(state, mode, &request).await?;
    Ok(Json(result.into()))
}
