//! Generation request model and upload limits.
//!
//! A [`GenerationRequest`] can only be built through
//! [`GenerationRequest::new`], which enforces the prompt and image-count
//! rules before anything is sent to the prediction provider.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Upload limits
// ---------------------------------------------------------------------------

/// Maximum number of reference images per request.
pub const MAX_REFERENCE_IMAGES: usize = 3;
/// Maximum size of a single reference image in bytes (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// Tag applied to a reference image when the form omits `imageTypeN`.
pub const DEFAULT_IMAGE_TAG: &str = "Photo";
/// MIME type assumed when an upload carries no content type.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Message returned for a missing or blank prompt.
pub const PROMPT_REQUIRED: &str = "Prompt is required";

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Logical generation variant selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationMode {
    TextToImage,
    ImageToImage,
    Face,
    EnhancedFace,
    Video,
}

impl GenerationMode {
    /// Pick the image-conditioned or text-only flavour of a plain image
    /// request. Other modes carry both variants in their preset and are
    /// returned unchanged.
    pub fn resolve(self, has_images: bool) -> Self {
        match self {
            Self::TextToImage | Self::ImageToImage if has_images => Self::ImageToImage,
            Self::TextToImage | Self::ImageToImage => Self::TextToImage,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextToImage => "text_to_image",
            Self::ImageToImage => "image_to_image",
            Self::Face => "face",
            Self::EnhancedFace => "enhanced_face",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Reference images
// ---------------------------------------------------------------------------

/// One uploaded reference image, held in memory for the lifetime of a
/// single request.
#[derive(Clone)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    /// Free-form category from the form, e.g. "Photo", "Floor Plan", "Sketch".
    pub tag: String,
    pub original_filename: String,
}

impl ReferenceImage {
    /// Encode the image as a `data:` URL for the outbound job payload.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }
}

impl fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("tag", &self.tag)
            .field("original_filename", &self.original_filename)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A validated generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    prompt: String,
    negative_prompt: Option<String>,
    images: Vec<ReferenceImage>,
}

impl GenerationRequest {
    /// Validate and build a request.
    ///
    /// The prompt is trimmed and must be non-empty. A blank negative prompt
    /// is treated as absent so the mode default applies.
    pub fn new(
        prompt: Option<&str>,
        negative_prompt: Option<&str>,
        images: Vec<ReferenceImage>,
    ) -> Result<Self, CoreError> {
        let prompt = validate_prompt(prompt)?;

        if images.len() > MAX_REFERENCE_IMAGES {
            return Err(CoreError::Validation(format!(
                "At most {MAX_REFERENCE_IMAGES} reference images are allowed"
            )));
        }
        if let Some(img) = images.iter().find(|i| i.bytes.len() > MAX_IMAGE_BYTES) {
            return Err(CoreError::Validation(format!(
                "Image '{}' exceeds the {} MB limit",
                img.original_filename,
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }

        let negative_prompt = negative_prompt
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            prompt,
            negative_prompt,
            images,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn negative_prompt(&self) -> Option<&str> {
        self.negative_prompt.as_deref()
    }

    pub fn images(&self) -> &[ReferenceImage] {
        &self.images
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// The image sent to the provider. Only the first upload conditions
    /// the model; the others ride along for logging.
    pub fn base_image(&self) -> Option<&ReferenceImage> {
        self.images.first()
    }
}

/// Trim a prompt and reject it when absent or blank.
pub fn validate_prompt(prompt: Option<&str>) -> Result<String, CoreError> {
    match prompt.map(str::trim) {
        Some(p) if !p.is_empty() => Ok(p.to_string()),
        _ => Err(CoreError::Validation(PROMPT_REQUIRED.into())),
    }
}
