use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rendergen_core::presets::VideoStrategy;
use rendergen_replicate::api::{DEFAULT_API_URL, REQUEST_TIMEOUT as PROVIDER_CALL_TIMEOUT};
use rendergen_replicate::PollConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins from comma-separated `CORS_ORIGINS`. A single
    /// `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Lower bound on the HTTP request timeout, in seconds. See
    /// [`ServerConfig::request_timeout`].
    pub request_timeout_secs: u64,
    /// Base URL of the prediction API.
    pub replicate_api_url: String,
    /// Provider credential. `None` surfaces as a configuration error on the
    /// first generation request.
    pub replicate_api_token: Option<String>,
    /// Delay between prediction status checks.
    pub poll_interval: Duration,
    /// Status checks before a prediction is declared timed out.
    pub poll_max_attempts: u32,
    /// Whether `/generate-video` calls the real video model.
    pub video_strategy: VideoStrategy,
    /// Model version for text-only video requests, if one is available.
    pub text_to_video_version: Option<String>,
    /// Backend URL handed to the browser by `GET /config`. Empty means
    /// same origin.
    pub public_backend_url: String,
    /// Directory served for non-API paths.
    pub static_dir: String,
    /// Whether `/create-video` may shell out to ffmpeg.
    pub ffmpeg_enabled: bool,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("replicate_api_url", &self.replicate_api_url)
            .field(
                "replicate_api_token",
                &self.replicate_api_token.as_ref().map(|_| "<redacted>"),
            )
            .field("poll_interval", &self.poll_interval)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("video_strategy", &self.video_strategy)
            .field("text_to_video_version", &self.text_to_video_version)
            .field("public_backend_url", &self.public_backend_url)
            .field("static_dir", &self.static_dir)
            .field("ffmpeg_enabled", &self.ffmpeg_enabled)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default                        |
    /// |-----------------------------------|--------------------------------|
    /// | `HOST`                            | `0.0.0.0`                      |
    /// | `PORT`                            | `3000`                         |
    /// | `CORS_ORIGINS`                    | `*`                            |
    /// | `REQUEST_TIMEOUT_SECS`            | `330`                          |
    /// | `REPLICATE_API_URL`               | `https://api.replicate.com/v1` |
    /// | `REPLICATE_API_TOKEN`             | unset                          |
    /// | `POLL_INTERVAL_MS`                | `2000`                         |
    /// | `POLL_MAX_ATTEMPTS`               | `150`                          |
    /// | `VIDEO_STRATEGY`                  | `image-fallback`               |
    /// | `REPLICATE_TEXT_TO_VIDEO_VERSION` | unset                          |
    /// | `PUBLIC_BACKEND_URL`              | empty                          |
    /// | `STATIC_DIR`                      | `public`                       |
    /// | `FFMPEG_ENABLED`                  | `false`                        |
    ///
    /// Panics on malformed values; misconfiguration should stop startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", "3000");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "330");

        let replicate_api_url =
            std::env::var("REPLICATE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let replicate_api_token = optional_env("REPLICATE_API_TOKEN");

        let poll_interval_ms: u64 = parse_env("POLL_INTERVAL_MS", "2000");
        let poll_max_attempts: u32 = parse_env("POLL_MAX_ATTEMPTS", "150");

        let video_strategy: VideoStrategy = std::env::var("VIDEO_STRATEGY")
            .unwrap_or_else(|_| "image-fallback".into())
            .parse()
            .unwrap_or_else(|e| panic!("VIDEO_STRATEGY is invalid: {e}"));
        let text_to_video_version = optional_env("REPLICATE_TEXT_TO_VIDEO_VERSION");

        let public_backend_url = std::env::var("PUBLIC_BACKEND_URL").unwrap_or_default();
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "public".into());
        let ffmpeg_enabled: bool = parse_env("FFMPEG_ENABLED", "false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            replicate_api_url,
            replicate_api_token,
            poll_interval: Duration::from_millis(poll_interval_ms),
            poll_max_attempts,
            video_strategy,
            text_to_video_version,
            public_backend_url,
            static_dir,
            ffmpeg_enabled,
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: self.poll_interval,
            max_attempts: self.poll_max_attempts,
        }
    }

    /// Timeout applied to every HTTP request.
    ///
    /// Never shorter than the slowest generation the poll budget allows:
    /// one submit plus every status check at the provider call timeout,
    /// plus the sleeps between checks. The poll budget therefore always
    /// ends a slow generation before the request layer does.
    pub fn request_timeout(&self) -> Duration {
        let poll = self.poll_config();
        let provider_calls = poll.max_attempts.max(1).saturating_add(1);
        let worst_case = poll
            .ceiling()
            .saturating_add(PROVIDER_CALL_TIMEOUT.saturating_mul(provider_calls));
        Duration::from_secs(self.request_timeout_secs).max(worst_case)
    }

    /// `true` when `CORS_ORIGINS` is `*`.
    pub fn cors_allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_env<T>(key: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.into())
        .trim()
        .parse()
        .unwrap_or_else(|e| panic!("{key} is invalid: {e}"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec!["*".into()],
        request_timeout_secs: 30,
        replicate_api_url: "http://localhost:0".into(),
        replicate_api_token: Some("test-token".into()),
        poll_interval: Duration::from_millis(1),
        poll_max_attempts: 3,
        video_strategy: VideoStrategy::ImageFallback,
        text_to_video_version: None,
        public_backend_url: String::new(),
        static_dir: "public".into(),
        ffmpeg_enabled: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", test_config());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("test-token"));
    }

    #[test]
    fn poll_config_follows_settings() {
        let poll = test_config().poll_config();
        assert_eq!(poll.interval, Duration::from_millis(1));
        assert_eq!(poll.max_attempts, 3);
    }

    #[test]
    fn request_timeout_covers_slowest_generation() {
        let mut config = test_config();
        config.request_timeout_secs = 330;
        config.poll_interval = Duration::from_secs(2);
        config.poll_max_attempts = 150;

        // 300 s of polling plus 151 provider calls at 30 s each.
        assert_eq!(config.request_timeout(), Duration::from_secs(300 + 151 * 30));
    }

    #[test]
    fn request_timeout_keeps_larger_setting() {
        let mut config = test_config();
        config.request_timeout_secs = 36_000;
        assert_eq!(config.request_timeout(), Duration::from_secs(36_000));
    }

    #[test]
    fn star_allows_any_origin() {
        let mut config = test_config();
        assert!(config.cors_allows_any_origin());
        config.cors_origins = vec!["http://localhost:5173".into()];
        assert!(!config.cors_allows_any_origin());
    }
}
