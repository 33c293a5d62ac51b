//! Response bodies for the generation routes.
//!
//! The browser client reads exactly one of `image`, `video` or
//! `videoSequence`, so the envelope is untagged rather than `{ "data": ... }`.

use rendergen_core::output::{Frame, GenerationResult};
use serde::Serialize;

/// Successful generation payload.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GenerationResponse {
    Image {
        image: String,
    },
    Video {
        video: String,
    },
    #[serde(rename_all = "camelCase")]
    Sequence {
        video_sequence: Vec<Frame>,
        frame_count: usize,
        message: String,
    },
}

impl From<GenerationResult> for GenerationResponse {
    fn from(result: GenerationResult) -> Self {
        match result {
            GenerationResult::Image(image) => Self::Image { image },
            GenerationResult::Video(video) => Self::Video { video },
            GenerationResult::FrameSequence(frames) => {
                let frame_count = frames.len();
                Self::Sequence {
                    video_sequence: frames,
                    frame_count,
                    message: format!(
                        "Generated {frame_count} frames. Play them in sequence or assemble \
                         them with /create-video."
                    ),
                }
            }
        }
    }
}
