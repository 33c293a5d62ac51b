//! Multipart decoding for the generation routes.
//!
//! Upload limits are enforced while the body streams in, before the prompt
//! is looked at, so an oversized or malformed upload is always reported as
//! an upload error.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use rendergen_core::generation::{
    GenerationRequest, ReferenceImage, DEFAULT_IMAGE_MIME, DEFAULT_IMAGE_TAG, MAX_IMAGE_BYTES,
    MAX_REFERENCE_IMAGES,
};

use crate::error::{AppError, AppResult};

/// Raw form contents before validation.
#[derive(Debug, Default)]
pub struct GenerationForm {
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    /// Uploaded images keyed by slot (`image1` is slot 0).
    slots: [Option<ReferenceImage>; MAX_REFERENCE_IMAGES],
    tags: [Option<String>; MAX_REFERENCE_IMAGES],
}

impl GenerationForm {
    /// Validate into a [`GenerationRequest`]. Images keep slot order and
    /// pick up their `imageTypeN` tag.
    pub fn into_request(self) -> AppResult<GenerationRequest> {
        let GenerationForm {
            prompt,
            negative_prompt,
            slots,
            tags,
        } = self;

        let images = slots
            .into_iter()
            .zip(tags)
            .filter_map(|(image, tag)| {
                image.map(|mut image| {
                    if let Some(tag) = tag {
                        image.tag = tag;
                    }
                    image
                })
            })
            .collect();

        Ok(GenerationRequest::new(
            prompt.as_deref(),
            negative_prompt.as_deref(),
            images,
        )?)
    }

    pub fn image_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

/// Read a generation form from a multipart body.
pub async fn read_generation_form(mut multipart: Multipart) -> AppResult<GenerationForm> {
    let mut form = GenerationForm::default();
    let mut file_parts = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or("").to_string();

        if field.file_name().is_some() {
            file_parts += 1;
            if file_parts > MAX_REFERENCE_IMAGES {
                return Err(AppError::Upload("Too many files".into()));
            }

            let slot = match image_slot(&name, "image") {
                Some(slot) if form.slots[slot].is_none() => slot,
                _ => return Err(AppError::Upload(format!("Unexpected field '{name}'"))),
            };

            if let Some(image) = read_image(field).await? {
                form.slots[slot] = Some(image);
            }
            continue;
        }

        match name.as_str() {
            "prompt" => form.prompt = Some(read_text(field).await?),
            "negativePrompt" => form.negative_prompt = Some(read_text(field).await?),
            other => {
                if let Some(slot) = image_slot(other, "imageType") {
                    let tag = read_text(field).await?;
                    let tag = tag.trim();
                    if !tag.is_empty() {
                        form.tags[slot] = Some(tag.to_string());
                    }
                }
                // Other text fields are ignored.
            }
        }
    }

    Ok(form)
}

/// Map `image1`..`image3` (or `imageType1`..) to a zero-based slot.
fn image_slot(name: &str, prefix: &str) -> Option<usize> {
    let suffix = name.strip_prefix(prefix)?;
    (1..=MAX_REFERENCE_IMAGES).position(|n| suffix == n.to_string())
}

/// Stream a file part into memory, enforcing the per-file cap. Empty parts
/// (a file input left blank) yield `None`.
async fn read_image(mut field: Field<'_>) -> AppResult<Option<ReferenceImage>> {
    let original_filename = field.file_name().unwrap_or("upload").to_string();
    let mime_type = field
        .content_type()
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_string();

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(upload_error)? {
        if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
            return Err(AppError::Upload("File too large".into()));
        }
        bytes.extend_from_slice(&chunk);
    }

    if bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(ReferenceImage {
        bytes,
        mime_type,
        tag: DEFAULT_IMAGE_TAG.to_string(),
        original_filename,
    }))
}

async fn read_text(field: Field<'_>) -> AppResult<String> {
    field.text().await.map_err(upload_error)
}

fn upload_error(err: MultipartError) -> AppError {
    if err.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::Upload("File too large".into());
    }
    AppError::Upload(err.body_text())
}
