//! Route definitions for liveness and client bootstrap.
//!
//! ```text
//! GET /test         test
//! GET /test-video   test_video
//! GET /config       client_config
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::system;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test", get(system::test))
        .route("/test-video", get(system::test_video))
        .route("/config", get(system::client_config))
}
