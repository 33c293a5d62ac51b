//! Route definitions for the multipart generation endpoints.
//!
//! ```text
//! POST /generate                 generate_image
//! POST /generate-face            generate_face
//! POST /generate-face-enhanced   generate_face_enhanced
//! POST /generate-video           generate_video
//! ```

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use rendergen_core::generation::{MAX_IMAGE_BYTES, MAX_REFERENCE_IMAGES};

use crate::handlers::generation;
use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the images.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generation::generate_image))
        .route("/generate-face", post(generation::generate_face))
        .route(
            "/generate-face-enhanced",
            post(generation::generate_face_enhanced),
        )
        .route("/generate-video", post(generation::generate_video))
        .layer(DefaultBodyLimit::max(
            MAX_REFERENCE_IMAGES * MAX_IMAGE_BYTES + FORM_OVERHEAD_BYTES,
        ))
}
