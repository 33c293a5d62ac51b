//! FFmpeg command utilities for turning a directory of still frames into
//! an H.264 MP4.

use std::path::Path;

/// Error type for FFmpeg operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("frame directory not found: {0}")]
    FramesNotFound(String),
}

/// Printf-style name for frame `index` with the given extension, as
/// consumed by [`encode_frames`].
pub fn frame_file_name(index: usize, extension: &str) -> String {
    format!("frame_{index:05}.{extension}")
}

/// Return `true` if an `ffmpeg` binary can be executed.
pub async fn is_available() -> bool {
    tokio::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Encode `frame_00000.<ext>`, `frame_00001.<ext>`, ... inside `frame_dir`
/// into `output_path` at `fps` frames per second.
///
/// Output is H.264 with `yuv420p` so browsers can play it, with dimensions
/// rounded down to even values as libx264 requires.
pub async fn encode_frames(
    frame_dir: &Path,
    extension: &str,
    fps: u32,
    output_path: &Path,
) -> Result<(), FfmpegError> {
    if !frame_dir.is_dir() {
        return Err(FfmpegError::FramesNotFound(
            frame_dir.to_string_lossy().to_string(),
        ));
    }

    let pattern = frame_dir.join(format!("frame_%05d.{extension}"));

    let output = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-framerate", &fps.to_string(), "-i"])
        .arg(&pattern)
        .args([
            "-vf",
            "scale=trunc(iw/2)*2:trunc(ih/2)*2",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(output_path)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}
