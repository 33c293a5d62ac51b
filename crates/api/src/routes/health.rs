use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether a provider credential is configured.
    pub provider_configured: bool,
}

/// GET /health -- returns service health.
///
/// Reports `degraded` when no provider credential is set: the server is
/// up but every generation request will fail.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_configured = state.provider.is_configured();

    let status = if provider_configured { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        provider_configured,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
