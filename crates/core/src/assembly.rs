//! Frame-sequence to video assembly planning.
//!
//! When a video model hands back a sequence of stills, the browser can ask
//! the server to stitch them into a clip. [`AssemblyPlan`] validates that
//! request; [`AssemblyPlan::instructions`] describes how to do it locally
//! when the server cannot encode itself.

use serde::Serialize;

use crate::error::CoreError;

/// Frame rate used when the caller omits one.
pub const DEFAULT_ASSEMBLY_FPS: u32 = 8;
/// Highest accepted frame rate.
pub const MAX_ASSEMBLY_FPS: u32 = 60;
/// Upper bound on frames per assembly request.
pub const MAX_ASSEMBLY_FRAMES: usize = 240;

/// Extensions accepted for downloaded frames.
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// A validated frame assembly request.
#[derive(Debug, Clone)]
pub struct AssemblyPlan {
    pub frame_urls: Vec<String>,
    pub fps: u32,
}

/// JSON payload returned when the server does not encode the clip itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyInstructions {
    pub message: String,
    pub frame_count: usize,
    pub fps: u32,
    pub duration_secs: f64,
    pub frame_urls: Vec<String>,
    pub instructions: Vec<String>,
}

impl AssemblyPlan {
    pub fn new(frame_urls: Vec<String>, fps: Option<f64>) -> Result<Self, CoreError> {
        if frame_urls.is_empty() {
            return Err(CoreError::Validation(
                "frameUrls must contain at least one frame".into(),
            ));
        }
        if frame_urls.len() > MAX_ASSEMBLY_FRAMES {
            return Err(CoreError::Validation(format!(
                "frameUrls may contain at most {MAX_ASSEMBLY_FRAMES} frames"
            )));
        }
        if let Some(bad) = frame_urls
            .iter()
            .find(|u| !(u.starts_with("https://") || u.starts_with("http://")))
        {
            return Err(CoreError::Validation(format!(
                "Frame URL '{bad}' must be an http(s) URL"
            )));
        }

        let fps = match fps {
            None => DEFAULT_ASSEMBLY_FPS,
            Some(f) if f.fract() == 0.0 && f >= 1.0 && f <= MAX_ASSEMBLY_FPS as f64 => f as u32,
            Some(f) => {
                return Err(CoreError::Validation(format!(
                    "fps must be a whole number between 1 and {MAX_ASSEMBLY_FPS}, got {f}"
                )))
            }
        };

        Ok(Self { frame_urls, fps })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_urls.len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_urls.len() as f64 / self.fps as f64
    }

    /// File extension used for every downloaded frame, taken from the
    /// first URL's path. Falls back to `png`.
    pub fn frame_extension(&self) -> &'static str {
        let path = self.frame_urls[0]
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        FRAME_EXTENSIONS
            .iter()
            .copied()
            .find(|ext| path.ends_with(&format!(".{ext}")))
            .unwrap_or("png")
    }

    pub fn instructions(&self) -> AssemblyInstructions {
        let ext = self.frame_extension();
        AssemblyInstructions {
            message: "Server-side video encoding is unavailable. Download the frames and \
                      assemble them locally."
                .into(),
            frame_count: self.frame_count(),
            fps: self.fps,
            duration_secs: self.duration_secs(),
            frame_urls: self.frame_urls.clone(),
            instructions: vec![
                format!(
                    "Download each frame in order as frame_00000.{ext}, frame_00001.{ext}, ..."
                ),
                format!(
                    "Run: ffmpeg -framerate {} -i frame_%05d.{ext} -c:v libx264 -pix_fmt yuv420p video.mp4",
                    self.fps
                ),
                "Or preview the frames in sequence in the browser.".into(),
            ],
        }
    }
}
