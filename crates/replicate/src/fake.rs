//! Scripted in-memory [`PredictionApi`] for tests.
//!
//! Replays a fixed submit response and a queue of status responses,
//! recording every call. Once the status queue is down to its last entry
//! that entry is repeated, which makes "still processing forever" scripts
//! one element long.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::PredictionApi;
use crate::error::PredictionError;
use crate::prediction::Prediction;

/// One scripted provider answer.
#[derive(Debug, Clone)]
pub enum Scripted {
    Prediction(Prediction),
    /// Non-2xx or `error` response from the provider.
    Provider { status: u16, message: String },
    /// Credential missing.
    Unconfigured,
}

impl Scripted {
    fn into_result(self) -> Result<Prediction, PredictionError> {
        match self {
            Self::Prediction(p) => Ok(p),
            Self::Provider { status, message } => {
                Err(PredictionError::Provider { status, message })
            }
            Self::Unconfigured => Err(PredictionError::Configuration),
        }
    }
}

/// Build a prediction object with the given status and output.
pub fn prediction(id: &str, status: &str, output: Value) -> Prediction {
    serde_json::from_value(json!({
        "id": id,
        "status": status,
        "output": output,
    }))
    .expect("scripted prediction is valid")
}

/// Shorthand for a scripted prediction answer.
pub fn answer(id: &str, status: &str, output: Value) -> Scripted {
    Scripted::Prediction(prediction(id, status, output))
}

pub struct ScriptedApi {
    submit: Scripted,
    polls: Mutex<VecDeque<Scripted>>,
    created: Mutex<Vec<(String, Value)>>,
    polled: Mutex<Vec<String>>,
    poll_delay: Duration,
}

impl ScriptedApi {
    pub fn new(submit: Scripted) -> Self {
        Self {
            submit,
            polls: Mutex::new(VecDeque::new()),
            created: Mutex::new(Vec::new()),
            polled: Mutex::new(Vec::new()),
            poll_delay: Duration::ZERO,
        }
    }

    /// Make every status lookup take `delay` before answering.
    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    /// Queue status responses for subsequent `get_prediction` calls.
    pub fn then_poll(self, responses: impl IntoIterator<Item = Scripted>) -> Self {
        self.polls.lock().unwrap().extend(responses);
        self
    }

    /// `(version, input)` of every submission, in order.
    pub fn created(&self) -> Vec<(String, Value)> {
        self.created.lock().unwrap().clone()
    }

    /// Number of status lookups made.
    pub fn poll_count(&self) -> usize {
        self.polled.lock().unwrap().len()
    }

    /// Total number of provider calls of either kind.
    pub fn call_count(&self) -> usize {
        self.created.lock().unwrap().len() + self.poll_count()
    }
}

#[async_trait]
impl PredictionApi for ScriptedApi {
    async fn create_prediction(
        &self,
        version: &str,
        input: &Value,
    ) -> Result<Prediction, PredictionError> {
        self.created
            .lock()
            .unwrap()
            .push((version.to_string(), input.clone()));
        self.submit.clone().into_result()
    }

    async fn get_prediction(&self, id: &str) -> Result<Prediction, PredictionError> {
        if !self.poll_delay.is_zero() {
            tokio::time::sleep(self.poll_delay).await;
        }
        self.polled.lock().unwrap().push(id.to_string());
        let mut polls = self.polls.lock().unwrap();
        let next = if polls.len() > 1 {
            polls.pop_front()
        } else {
            polls.front().cloned()
        };
        next.unwrap_or_else(|| Scripted::Provider {
            status: 404,
            message: format!("no scripted status for {id}"),
        })
        .into_result()
    }

    fn is_configured(&self) -> bool {
        !matches!(self.submit, Scripted::Unconfigured)
    }
}
