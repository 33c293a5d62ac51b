//! Generation engine.
//!
//! Turns a validated [`GenerationRequest`] into a [`GenerationResult`]:
//! picks the mode's preset, builds the provider payload, runs the
//! prediction to completion and classifies its output.

use rendergen_core::generation::{GenerationMode, GenerationRequest};
use rendergen_core::output::{classify_output, GenerationResult};
use rendergen_replicate::run_prediction;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Run one generation request for `mode`.
///
/// Plain image requests with reference images are upgraded to
/// image-to-image. Errors from the provider carry the preset's failure
/// hint.
pub async fn generate(
    state: &AppState,
    mode: GenerationMode,
    request: &GenerationRequest,
) -> AppResult<GenerationResult> {
    let mode = mode.resolve(request.has_images());
    let preset = state.presets.get(mode);
    let job = preset.build_job(request)?;

    tracing::info!(
        mode = %mode,
        image_count = request.images().len(),
        version = %job.version,
        "Starting generation",
    );
    for (i, image) in request.images().iter().enumerate() {
        tracing::debug!(
            mode = %mode,
            slot = i + 1,
            tag = %image.tag,
            mime_type = %image.mime_type,
            bytes = image.bytes.len(),
            sent = i == 0,
            "Reference image",
        );
    }

    let prediction = run_prediction(state.provider.as_ref(), &job.version, &job.input, &state.poll)
        .await
        .map_err(|e| AppError::prediction(e, preset.failure_hint))?;

    let result = classify_output(&prediction.output)
        .and_then(|output| GenerationResult::from_output(preset.envelope, output))?;

    tracing::info!(
        mode = %mode,
        prediction_id = %prediction.id,
        result = result.kind(),
        "Generation complete",
    );

    Ok(result)
}
