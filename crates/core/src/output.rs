//! Prediction output classification.
//!
//! Provider models return their output as a bare URL, an array of URLs, or
//! a structured frame sequence. [`classify_output`] turns whichever shape
//! arrived into a [`PredictionOutput`], and [`GenerationResult::from_output`]
//! folds that into the result kind the caller's mode asked for.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Keys that may carry a frame's URL inside a structured frame object.
const FRAME_URL_KEYS: &[&str] = &["url", "image", "uri"];
/// Keys that may carry a frame's position.
const FRAME_INDEX_KEYS: &[&str] = &["index", "frame_index", "frame"];

/// One still image inside a frame sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub url: String,
    pub index: usize,
    /// Any remaining per-frame fields the provider sent (timestamps,
    /// seeds, ...), passed through untouched.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Frame {
    pub fn from_url(index: usize, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index,
            metadata: Map::new(),
        }
    }
}

/// Shape of a succeeded prediction's `output` field.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutput {
    Single(String),
    Multiple(Vec<String>),
    Frames(Vec<Frame>),
}

/// Which response envelope a mode produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEnvelope {
    Image,
    Video,
}

/// Final artifact of a generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    Image(String),
    Video(String),
    FrameSequence(Vec<Frame>),
}

/// Classify a raw prediction output value.
pub fn classify_output(output: &Value) -> Result<PredictionOutput, CoreError> {
    match output {
        Value::String(url) if !url.trim().is_empty() => Ok(PredictionOutput::Single(url.clone())),
        Value::Array(items) => classify_array(items),
        Value::Object(map) => {
            if let Some(Value::Array(frames)) = map.get("frames") {
                return frames_from_items(frames).map(PredictionOutput::Frames);
            }
            match ["video", "output", "url"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
            {
                Some(url) if !url.is_empty() => Ok(PredictionOutput::Single(url.to_string())),
                _ => Err(unrecognised(output)),
            }
        }
        _ => Err(unrecognised(output)),
    }
}

fn classify_array(items: &[Value]) -> Result<PredictionOutput, CoreError> {
    if items.is_empty() {
        return Err(CoreError::UnrecognisedOutput("empty output array".into()));
    }

    if items.iter().all(Value::is_string) {
        let mut urls: Vec<String> = items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        if urls.iter().any(|u| u.trim().is_empty()) {
            return Err(CoreError::UnrecognisedOutput("blank URL in output".into()));
        }
        return Ok(if urls.len() == 1 {
            PredictionOutput::Single(urls.remove(0))
        } else {
            PredictionOutput::Multiple(urls)
        });
    }

    if items.iter().all(Value::is_object) {
        return frames_from_items(items).map(PredictionOutput::Frames);
    }

    Err(CoreError::UnrecognisedOutput(
        "array mixes URLs and structured entries".into(),
    ))
}

fn frames_from_items(items: &[Value]) -> Result<Vec<Frame>, CoreError> {
    if items.is_empty() {
        return Err(CoreError::UnrecognisedOutput("empty frame sequence".into()));
    }

    let mut frames = items
        .iter()
        .enumerate()
        .map(|(position, item)| match item {
            Value::String(url) => Ok(Frame::from_url(position, url.clone())),
            Value::Object(obj) => frame_from_object(position, obj),
            other => Err(unrecognised(other)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    frames.sort_by_key(|f| f.index);
    Ok(frames)
}

fn frame_from_object(position: usize, obj: &Map<String, Value>) -> Result<Frame, CoreError> {
    let url = FRAME_URL_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CoreError::UnrecognisedOutput(format!("frame {position} has no URL")))?;

    let index = FRAME_INDEX_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_u64))
        .map(|i| i as usize)
        .unwrap_or(position);

    let metadata = obj
        .iter()
        .filter(|(k, _)| {
            !FRAME_URL_KEYS.contains(&k.as_str()) && !FRAME_INDEX_KEYS.contains(&k.as_str())
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(Frame {
        url: url.to_string(),
        index,
        metadata,
    })
}

/// Longest excerpt of an unusable output kept in the error message.
const EXCERPT_CHARS: usize = 200;

fn unrecognised(value: &Value) -> CoreError {
    let text: String = value.to_string().chars().take(EXCERPT_CHARS).collect();
    CoreError::UnrecognisedOutput(text)
}

impl PredictionOutput {
    /// The first artifact URL, whatever the shape.
    pub fn first_url(&self) -> Option<&str> {
        match self {
            Self::Single(url) => Some(url),
            Self::Multiple(urls) => urls.first().map(String::as_str),
            Self::Frames(frames) => frames.first().map(|f| f.url.as_str()),
        }
    }
}

impl GenerationResult {
    /// Fold a classified output into the result kind an envelope expects.
    ///
    /// Image envelopes keep only the first artifact. Video envelopes keep a
    /// lone URL as a video and anything longer as a frame sequence.
    pub fn from_output(
        envelope: OutputEnvelope,
        output: PredictionOutput,
    ) -> Result<Self, CoreError> {
        match envelope {
            OutputEnvelope::Image => output
                .first_url()
                .map(|u| Self::Image(u.to_string()))
                .ok_or_else(|| CoreError::UnrecognisedOutput("no image URL in output".into())),
            OutputEnvelope::Video => Ok(match output {
                PredictionOutput::Single(url) => Self::Video(url),
                PredictionOutput::Multiple(urls) => Self::FrameSequence(
                    urls.into_iter()
                        .enumerate()
                        .map(|(i, u)| Frame::from_url(i, u))
                        .collect(),
                ),
                PredictionOutput::Frames(frames) => Self::FrameSequence(frames),
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Video(_) => "video",
            Self::FrameSequence(_) => "frame_sequence",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unusable_output_excerpt_cuts_on_char_boundary() {
        // 150 two-byte chars put byte 200 inside a character.
        let short = json!({ "xx": "é".repeat(150) });
        let err = classify_output(&short).unwrap_err();
        assert_matches_excerpt(err, &short.to_string());

        let long = json!({ "xx": "é".repeat(400) });
        let err = classify_output(&long).unwrap_err();
        let expected: String = long.to_string().chars().take(EXCERPT_CHARS).collect();
        assert_matches_excerpt(err, &expected);
    }

    fn assert_matches_excerpt(err: CoreError, expected: &str) {
        let CoreError::UnrecognisedOutput(text) = err else {
            panic!("expected unrecognised output");
        };
        assert_eq!(text, expected);
    }

    #[test]
    fn string_output_is_single() {
        let out = classify_output(&json!("https://cdn/v.mp4")).unwrap();
        assert_eq!(out, PredictionOutput::Single("https://cdn/v.mp4".into()));
    }

    #[test]
    fn one_element_array_is_single() {
        let out = classify_output(&json!(["https://cdn/x.png"])).unwrap();
        assert_eq!(out, PredictionOutput::Single("https://cdn/x.png".into()));
    }

    #[test]
    fn url_array_is_multiple() {
        let out = classify_output(&json!(["https://cdn/a.png", "https://cdn/b.png"])).unwrap();
        assert_eq!(
            out,
            PredictionOutput::Multiple(vec!["https://cdn/a.png".into(), "https://cdn/b.png".into()])
        );
    }

    #[test]
    fn structured_frames_keep_metadata_and_order() {
        let out = classify_output(&json!({
            "frames": [
                {"url": "https://cdn/f1.png", "index": 1, "timestamp": 0.125},
                {"image": "https://cdn/f0.png", "index": 0, "seed": 42}
            ]
        }))
        .unwrap();

        let PredictionOutput::Frames(frames) = out else {
            panic!("expected frames");
        };
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].url, "https://cdn/f0.png");
        assert_eq!(frames[0].metadata["seed"], 42);
        assert_eq!(frames[1].metadata["timestamp"], 0.125);
    }

    #[test]
    fn object_array_is_frames() {
        let out = classify_output(&json!([{"url": "https://cdn/a.png"}])).unwrap();
        assert_eq!(
            out,
            PredictionOutput::Frames(vec![Frame::from_url(0, "https://cdn/a.png")])
        );
    }

    #[test]
    fn empty_and_null_outputs_are_rejected() {
        assert!(classify_output(&json!([])).is_err());
        assert!(classify_output(&Value::Null).is_err());
        assert!(classify_output(&json!("")).is_err());
        assert!(classify_output(&json!({"frames": []})).is_err());
        assert!(classify_output(&json!(["https://cdn/a.png", {"url": "x"}])).is_err());
    }

    #[test]
    fn image_envelope_takes_first_url() {
        let out = PredictionOutput::Multiple(vec!["a".into(), "b".into()]);
        let res = GenerationResult::from_output(OutputEnvelope::Image, out).unwrap();
        assert_eq!(res, GenerationResult::Image("a".into()));
    }

    #[test]
    fn video_envelope_maps_single_to_video_and_many_to_sequence() {
        let single = PredictionOutput::Single("v.mp4".into());
        assert_eq!(
            GenerationResult::from_output(OutputEnvelope::Video, single).unwrap(),
            GenerationResult::Video("v.mp4".into())
        );

        let many = PredictionOutput::Multiple(vec!["f0".into(), "f1".into(), "f2".into()]);
        let GenerationResult::FrameSequence(frames) =
            GenerationResult::from_output(OutputEnvelope::Video, many).unwrap()
        else {
            panic!("expected frame sequence");
        };
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].index, 2);
    }
}
