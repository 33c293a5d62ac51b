//! Domain layer for rendergen: generation requests, the per-mode preset
//! table, prediction output classification and frame assembly.
//!
//! Nothing in this crate talks HTTP. The prediction client lives in
//! `rendergen-replicate` and the server in `rendergen-api`.

pub mod assembly;
pub mod error;
pub mod ffmpeg;
pub mod generation;
pub mod output;
pub mod presets;
