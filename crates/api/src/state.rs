use std::sync::Arc;
use std::time::Duration;

use rendergen_core::presets::PresetTable;
use rendergen_replicate::{PollConfig, PredictionApi};

use crate::config::ServerConfig;

/// Timeout for fetching one frame during video assembly.
const FRAME_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable and read-only: nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Prediction provider client.
    pub provider: Arc<dyn PredictionApi>,
    /// Per-mode generation presets.
    pub presets: Arc<PresetTable>,
    /// Polling cadence for pending predictions.
    pub poll: PollConfig,
    /// Plain HTTP client for fetching frames during video assembly.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: ServerConfig, provider: Arc<dyn PredictionApi>) -> Self {
        let presets = PresetTable::new(config.video_strategy, config.text_to_video_version.clone());
        let poll = config.poll_config();
        let http = reqwest::Client::builder()
            .timeout(FRAME_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            config: Arc::new(config),
            provider,
            presets: Arc::new(presets),
            poll,
            http,
        }
    }
}
