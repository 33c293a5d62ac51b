//! Route definitions for frame assembly.
//!
//! ```text
//! POST /create-video   create_video
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::video;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/create-video", post(video::create_video))
}
