pub mod generation;
pub mod health;
pub mod system;
pub mod video;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree.
///
/// Everything is mounted at the root because the bundled browser client
/// posts to bare paths.
///
/// ```text
/// GET  /health                     service health
/// GET  /test                       liveness
/// GET  /test-video                 video configuration probe
/// GET  /config                     browser bootstrap settings
///
/// POST /generate                   text-to-image / image-to-image
/// POST /generate-face              portrait
/// POST /generate-face-enhanced     portrait, enhanced template
/// POST /generate-video             video per strategy
///
/// POST /create-video               assemble frames into an MP4
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(system::router())
        .merge(generation::router())
        .merge(video::router())
}
