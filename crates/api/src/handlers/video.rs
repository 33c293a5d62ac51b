//! Handler for assembling a frame sequence into a downloadable clip.
//!
//! Routes:
//! - `POST /create-video`: MP4 stream when ffmpeg is enabled, otherwise
//!   JSON instructions for assembling the frames client-side

use std::path::Path;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rendergen_core::assembly::AssemblyPlan;
use rendergen_core::ffmpeg::{self, FfmpegError};
use rendergen_core::generation::MAX_IMAGE_BYTES;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// File name offered to the browser for the assembled clip.
const DOWNLOAD_NAME: &str = "generated-video.mp4";

/// Request body for `POST /create-video`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    #[serde(default)]
    pub frame_urls: Vec<String>,
    pub fps: Option<f64>,
}

/// POST /create-video
pub async fn create_video(
    State(state): State<AppState>,
    body: Result<Json<CreateVideoRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(input) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let plan = AssemblyPlan::new(input.frame_urls, input.fps)?;

    tracing::info!(
        frame_count = plan.frame_count(),
        fps = plan.fps,
        ffmpeg_enabled = state.config.ffmpeg_enabled,
        "Video assembly requested",
    );

    if !state.config.ffmpeg_enabled {
        return Ok(Json(plan.instructions()).into_response());
    }
    if !ffmpeg::is_available().await {
        tracing::warn!("ffmpeg enabled but not installed, returning assembly instructions");
        return Ok(Json(plan.instructions()).into_response());
    }

    match assemble(&state, &plan).await {
        Ok(video) => Ok((
            [
                (CONTENT_TYPE, "video/mp4".to_string()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
                ),
            ],
            video,
        )
            .into_response()),
        Err(AppError::Ffmpeg(FfmpegError::NotFound(e))) => {
            tracing::warn!(error = %e, "ffmpeg not available, returning assembly instructions");
            Ok(Json(plan.instructions()).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Download every frame into a scratch directory and encode them.
async fn assemble(state: &AppState, plan: &AssemblyPlan) -> AppResult<Vec<u8>> {
    let workdir = tempfile::tempdir()
        .map_err(|e| AppError::InternalError(format!("Failed to create temp dir: {e}")))?;
    let ext = plan.frame_extension();

    for (i, url) in plan.frame_urls.iter().enumerate() {
        download_frame(&state.http, url, &workdir.path().join(ffmpeg::frame_file_name(i, ext)))
            .await?;
    }
    tracing::debug!(frame_count = plan.frame_count(), "Frames downloaded");

    let output = workdir.path().join("output.mp4");
    ffmpeg::encode_frames(workdir.path(), ext, plan.fps, &output).await?;

    let video = tokio::fs::read(&output)
        .await
        .map_err(FfmpegError::IoError)?;
    tracing::info!(bytes = video.len(), "Video assembled");
    Ok(video)
}

/// Stream one frame to `dest`, refusing anything over [`MAX_IMAGE_BYTES`].
async fn download_frame(client: &reqwest::Client, url: &str, dest: &Path) -> AppResult<()> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::BadGateway(format!("Failed to fetch frame {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::BadGateway(format!(
            "Failed to fetch frame {url}: HTTP {}",
            response.status()
        )));
    }
    if response
        .content_length()
        .is_some_and(|len| len > MAX_IMAGE_BYTES as u64)
    {
        return Err(frame_too_large(url));
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(FfmpegError::IoError)?;
    let mut written = 0usize;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| AppError::BadGateway(format!("Failed to read frame {url}: {e}")))?
    {
        written += chunk.len();
        if written > MAX_IMAGE_BYTES {
            return Err(frame_too_large(url));
        }
        file.write_all(&chunk).await.map_err(FfmpegError::IoError)?;
    }
    file.flush().await.map_err(FfmpegError::IoError)?;
    Ok(())
}

fn frame_too_large(url: &str) -> AppError {
    AppError::BadGateway(format!(
        "Frame {url} is larger than {} MB",
        MAX_IMAGE_BYTES / (1024 * 1024)
    ))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn frame_server() -> Router {
        Router::new()
            .route("/small.png", get(|| async { vec![7u8; 64] }))
            .route("/limit.png", get(|| async { vec![0u8; MAX_IMAGE_BYTES] }))
            .route("/huge.png", get(|| async { vec![0u8; MAX_IMAGE_BYTES + 1] }))
            .route("/gone.png", get(|| async { StatusCode::NOT_FOUND }))
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn frames_within_the_cap_are_written() {
        let base = serve(frame_server()).await;
        let dir = tempfile::tempdir().unwrap();

        let small = dir.path().join("frame_00000.png");
        download_frame(&client(), &format!("{base}/small.png"), &small).await.unwrap();
        assert_eq!(tokio::fs::read(&small).await.unwrap(), vec![7u8; 64]);

        let limit = dir.path().join("frame_00001.png");
        download_frame(&client(), &format!("{base}/limit.png"), &limit).await.unwrap();
        assert_eq!(tokio::fs::metadata(&limit).await.unwrap().len(), MAX_IMAGE_BYTES as u64);
    }

    #[tokio::test]
    async fn oversized_frame_is_refused() {
        let base = serve(frame_server()).await;
        let dir = tempfile::tempdir().unwrap();

        let dest = dir.path().join("f.png");

        let err = download_frame(&client(), &format!("{base}/huge.png"), &dest)
            .await
            .unwrap_err();
        assert_matches!(err, AppError::BadGateway(ref msg) if msg.contains("larger than 10 MB"));
    }

    #[tokio::test]
    async fn missing_frame_is_a_bad_gateway() {
        let base = serve(frame_server()).await;
        let dir = tempfile::tempdir().unwrap();

        let dest = dir.path().join("f.png");

        let err = download_frame(&client(), &format!("{base}/gone.png"), &dest)
            .await
            .unwrap_err();
        assert_matches!(err, AppError::BadGateway(ref msg) if msg.contains("HTTP 404"));
    }
}
