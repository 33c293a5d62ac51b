//! Client for a hosted prediction API (Replicate-style).
//!
//! Submits prediction jobs over REST, polls them to a terminal state at a
//! fixed cadence and hands back the finished [`Prediction`] with its output
//! untouched. Interpreting the output shape is the caller's job.

pub mod api;
pub mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod poll;
pub mod prediction;
pub mod runner;

pub use api::{PredictionApi, ReplicateApi};
pub use error::PredictionError;
pub use poll::{poll_for_completion, PollConfig};
pub use prediction::{Prediction, PredictionStatus};
pub use runner::run_prediction;
