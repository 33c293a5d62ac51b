//! Per-mode generation presets.
//!
//! Every mode differs from the others only in data: model versions, prompt
//! template, default negative prompt, sampler parameters, response envelope
//! and the hint shown when a prediction fails. [`PresetTable`] holds one
//! [`ModePreset`] per [`GenerationMode`] and [`ModePreset::build_job`] turns a
//! validated request into the provider payload.

use std::str::FromStr;

use serde_json::{json, Map, Value};

use crate::error::CoreError;
use crate::generation::{GenerationMode, GenerationRequest};
use crate::output::OutputEnvelope;

// ---------------------------------------------------------------------------
// Model versions
// ---------------------------------------------------------------------------

/// SDXL text/image-to-image model version.
pub const SDXL_VERSION: &str = "db21e45d3f7023abc2a46ee38a23973f6dce16bb082a930b0c49861f96d1e5bf";
/// Dedicated image-to-image model version used by the plain image route.
pub const IMG2IMG_VERSION: &str =
    "c221b2b8ef527988fb59bf24a8b97c4561f1c671f73bd389f866bfb27c061316";
/// Image-to-video model version.
pub const VIDEO_VERSION: &str = "3f0457e4619daac51203dedb472816fd4af51f3149fa7a9e0b5ffcf1b8172438";

/// Frames requested from the video model.
pub const VIDEO_FRAMES: u32 = 24;
/// Frame rate requested from the video model.
pub const VIDEO_FPS: u32 = 8;

// ---------------------------------------------------------------------------
// Prompt material
// ---------------------------------------------------------------------------

const IMAGE_NEGATIVE: &str = "blurry, low quality, distorted, unrealistic";

const VIDEO_NEGATIVE: &str = "blurry, low quality, distorted, unrealistic, fast motion, jerky";

/// Anatomical-defect blocklist used by the face modes when the caller
/// supplies no negative prompt.
pub const FACE_NEGATIVE_BLOCKLIST: &str = "blurry, low quality, distorted, unrealistic, \
cartoon, anime, painting, sketch, deformed, ugly, bad anatomy, extra limbs, mutated hands, \
poorly drawn hands, poorly drawn face, mutation, extra arms, missing arms, missing legs, \
extra legs, fused fingers, too many fingers, long neck, cross-eyed, mutated eyes, sick, \
disfigured, bad proportions, cloned face, gross proportions, malformed limbs";

const PORTRAIT_PREFIX: &str = "professional portrait, ";
const PORTRAIT_SUFFIX: &str = ", beautiful face, sharp eyes, natural skin texture, \
studio lighting, 8k uhd, dslr, high quality photo, realistic, detailed";
const ENHANCED_PORTRAIT_SUFFIX: &str = ", beautiful face, sharp eyes, natural skin texture, \
studio lighting, 8k uhd, dslr, high quality photo, realistic, detailed, perfect face";

const CINEMATIC_STILL_SUFFIX: &str =
    ", cinematic, high quality, dynamic scene, motion blur, professional photography";
const CINEMATIC_MOTION_SUFFIX: &str = ", cinematic, high quality, smooth motion";

// ---------------------------------------------------------------------------
// Failure hints
// ---------------------------------------------------------------------------

const IMAGE_HINT: &str =
    "Image generation failed. Please try again with a different prompt or reference image.";
const FACE_HINT: &str =
    "Face generation failed. Please try again with a different prompt or a clearer reference photo.";
const VIDEO_HINT: &str = "Video generation failed. Please try again with a different prompt, \
or switch to image generation if the problem persists.";

// ---------------------------------------------------------------------------
// Video strategy
// ---------------------------------------------------------------------------

/// How the video mode is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoStrategy {
    /// Generate a single cinematic still and return it as an image.
    ImageFallback,
    /// Call the real video model and return a video or frame sequence.
    RealVideo,
}

impl VideoStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImageFallback => "image-fallback",
            Self::RealVideo => "video",
        }
    }
}

impl FromStr for VideoStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image-fallback" | "image" | "fallback" => Ok(Self::ImageFallback),
            "video" | "real" | "real-video" => Ok(Self::RealVideo),
            other => Err(CoreError::Validation(format!(
                "Invalid video strategy '{other}'. Must be one of: image-fallback, video"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Sampler and sizing parameters sent with every job of a mode.
#[derive(Debug, Clone)]
pub struct SamplerParams {
    pub num_inference_steps: Option<u32>,
    pub guidance_scale: Option<f64>,
    /// Only sent with image-conditioned jobs.
    pub strength: Option<f64>,
    pub width: u32,
    pub height: u32,
    /// Model-specific fields merged into the input verbatim.
    pub extra: Map<String, Value>,
}

/// Static configuration for one generation mode.
#[derive(Debug, Clone)]
pub struct ModePreset {
    pub mode: GenerationMode,
    /// Version for text-only requests. `None` means the mode needs at least
    /// one reference image.
    pub text_version: Option<String>,
    /// Version for image-conditioned requests.
    pub image_version: Option<String>,
    pub prompt_prefix: &'static str,
    pub prompt_suffix: &'static str,
    pub default_negative: &'static str,
    pub params: SamplerParams,
    pub envelope: OutputEnvelope,
    pub failure_hint: &'static str,
}

/// A provider payload ready for submission.
#[derive(Debug, Clone)]
pub struct PreparedJob {
    pub version: String,
    pub input: Value,
}

impl ModePreset {
    /// Apply the mode's prompt template.
    pub fn render_prompt(&self, prompt: &str) -> String {
        format!("{}{prompt}{}", self.prompt_prefix, self.prompt_suffix)
    }

    /// Build the provider payload for a request.
    ///
    /// The image-conditioned version is used when the request carries at
    /// least one image; otherwise the text-only version. The caller's
    /// negative prompt wins over the mode default.
    pub fn build_job(&self, request: &GenerationRequest) -> Result<PreparedJob, CoreError> {
        let base_image = request.base_image();

        let version = match base_image {
            Some(_) => self.image_version.as_ref().or(self.text_version.as_ref()),
            None => self.text_version.as_ref(),
        }
        .cloned()
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "At least one reference image is required for {} generation",
                self.mode_label()
            ))
        })?;

        let mut input = Map::new();
        input.insert("prompt".into(), json!(self.render_prompt(request.prompt())));
        input.insert(
            "negative_prompt".into(),
            json!(request.negative_prompt().unwrap_or(self.default_negative)),
        );
        if let Some(image) = base_image {
            input.insert("image".into(), json!(image.data_url()));
        }

        let p = &self.params;
        if let Some(steps) = p.num_inference_steps {
            input.insert("num_inference_steps".into(), json!(steps));
        }
        if let Some(guidance) = p.guidance_scale {
            input.insert("guidance_scale".into(), json!(guidance));
        }
        if let (Some(strength), Some(_)) = (p.strength, base_image) {
            input.insert("strength".into(), json!(strength));
        }
        input.insert("width".into(), json!(p.width));
        input.insert("height".into(), json!(p.height));
        for (k, v) in &p.extra {
            input.insert(k.clone(), v.clone());
        }

        Ok(PreparedJob {
            version,
            input: Value::Object(input),
        })
    }

    fn mode_label(&self) -> &'static str {
        match self.mode {
            GenerationMode::Video => "video",
            GenerationMode::Face | GenerationMode::EnhancedFace => "face",
            GenerationMode::TextToImage | GenerationMode::ImageToImage => "image",
        }
    }
}

/// One preset per generation mode.
#[derive(Debug, Clone)]
pub struct PresetTable {
    text_to_image: ModePreset,
    image_to_image: ModePreset,
    face: ModePreset,
    enhanced_face: ModePreset,
    video: ModePreset,
}

impl PresetTable {
    /// Build the table. `text_to_video_version` is only consulted by the
    /// real-video strategy.
    pub fn new(video_strategy: VideoStrategy, text_to_video_version: Option<String>) -> Self {
        Self {
            text_to_image: ModePreset {
                mode: GenerationMode::TextToImage,
                text_version: Some(SDXL_VERSION.into()),
                image_version: None,
                prompt_prefix: "",
                prompt_suffix: "",
                default_negative: IMAGE_NEGATIVE,
                params: sampler(Some(50), Some(7.5), None, 1024, 1024),
                envelope: OutputEnvelope::Image,
                failure_hint: IMAGE_HINT,
            },
            image_to_image: ModePreset {
                mode: GenerationMode::ImageToImage,
                text_version: None,
                image_version: Some(IMG2IMG_VERSION.into()),
                prompt_prefix: "",
                prompt_suffix: "",
                default_negative: IMAGE_NEGATIVE,
                params: sampler(Some(50), Some(7.5), Some(0.75), 1024, 1024),
                envelope: OutputEnvelope::Image,
                failure_hint: IMAGE_HINT,
            },
            face: ModePreset {
                mode: GenerationMode::Face,
                text_version: Some(SDXL_VERSION.into()),
                image_version: Some(SDXL_VERSION.into()),
                prompt_prefix: PORTRAIT_PREFIX,
                prompt_suffix: PORTRAIT_SUFFIX,
                default_negative: FACE_NEGATIVE_BLOCKLIST,
                params: sampler(Some(30), Some(7.0), Some(0.7), 1024, 1024),
                envelope: OutputEnvelope::Image,
                failure_hint: FACE_HINT,
            },
            enhanced_face: ModePreset {
                mode: GenerationMode::EnhancedFace,
                text_version: Some(SDXL_VERSION.into()),
                image_version: Some(SDXL_VERSION.into()),
                prompt_prefix: PORTRAIT_PREFIX,
                prompt_suffix: ENHANCED_PORTRAIT_SUFFIX,
                default_negative: FACE_NEGATIVE_BLOCKLIST,
                params: sampler(Some(30), Some(7.0), Some(0.7), 1024, 1024),
                envelope: OutputEnvelope::Image,
                failure_hint: FACE_HINT,
            },
            video: video_preset(video_strategy, text_to_video_version),
        }
    }

    pub fn get(&self, mode: GenerationMode) -> &ModePreset {
        match mode {
            GenerationMode::TextToImage => &self.text_to_image,
            GenerationMode::ImageToImage => &self.image_to_image,
            GenerationMode::Face => &self.face,
            GenerationMode::EnhancedFace => &self.enhanced_face,
            GenerationMode::Video => &self.video,
        }
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::new(VideoStrategy::ImageFallback, None)
    }
}

fn video_preset(strategy: VideoStrategy, text_to_video_version: Option<String>) -> ModePreset {
    match strategy {
        VideoStrategy::ImageFallback => ModePreset {
            mode: GenerationMode::Video,
            text_version: Some(SDXL_VERSION.into()),
            image_version: Some(SDXL_VERSION.into()),
            prompt_prefix: "",
            prompt_suffix: CINEMATIC_STILL_SUFFIX,
            default_negative: VIDEO_NEGATIVE,
            params: sampler(Some(30), Some(7.5), Some(0.7), 1024, 576),
            envelope: OutputEnvelope::Image,
            failure_hint: VIDEO_HINT,
        },
        VideoStrategy::RealVideo => {
            let mut params = sampler(None, None, None, 1024, 576);
            params.extra.insert("num_frames".into(), json!(VIDEO_FRAMES));
            params.extra.insert("fps".into(), json!(VIDEO_FPS));
            params.extra.insert("motion_bucket_id".into(), json!(127));
            params.extra.insert("cond_aug".into(), json!(0.02));

            ModePreset {
                mode: GenerationMode::Video,
                text_version: text_to_video_version.filter(|v| !v.trim().is_empty()),
                image_version: Some(VIDEO_VERSION.into()),
                prompt_prefix: "",
                prompt_suffix: CINEMATIC_MOTION_SUFFIX,
                default_negative: VIDEO_NEGATIVE,
                params,
                envelope: OutputEnvelope::Video,
                failure_hint: VIDEO_HINT,
            }
        }
    }
}

fn sampler(
    steps: Option<u32>,
    guidance: Option<f64>,
    strength: Option<f64>,
    width: u32,
    height: u32,
) -> SamplerParams {
    SamplerParams {
        num_inference_steps: steps,
        guidance_scale: guidance,
        strength,
        width,
        height,
        extra: Map::new(),
    }
}
