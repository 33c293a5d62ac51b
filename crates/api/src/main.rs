use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rendergen_api::config::ServerConfig;
use rendergen_api::router::build_app_router;
use rendergen_api::state::AppState;
use rendergen_replicate::ReplicateApi;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "rendergen_api=debug,rendergen_replicate=debug,tower_http=debug".into()
    });
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        video_strategy = config.video_strategy.as_str(),
        ffmpeg_enabled = config.ffmpeg_enabled,
        request_timeout_secs = config.request_timeout().as_secs(),
        "Loaded server configuration",
    );

    // --- Prediction provider ---
    let provider = ReplicateApi::new(
        config.replicate_api_url.clone(),
        config.replicate_api_token.clone(),
    );
    if config.replicate_api_token.is_none() {
        tracing::warn!("REPLICATE_API_TOKEN is not set; generation requests will fail");
    }

    // --- App state ---
    let state = AppState::new(config.clone(), Arc::new(provider));

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .unwrap_or_else(|e| panic!("Invalid HOST/PORT '{}:{}': {e}", config.host, config.port));
    tracing::info!(%addr, static_dir = %config.static_dir, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let signal = shutdown_signal().await;
            tracing::info!(signal, "Shutting down, waiting for in-flight generations");
        })
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

/// Resolve on SIGINT or (on Unix) SIGTERM, returning the signal's name.
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res.expect("Failed to install Ctrl-C handler");
                "SIGINT"
            }
            _ = sigterm.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
        "SIGINT"
    }
}
