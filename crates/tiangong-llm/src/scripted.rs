use crate::model::LanguageModel;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tiangong_core::{TiangongError, TiangongResult};

/// Deterministic model that replays queued responses in order.
///
/// Every prompt it receives is recorded. Once the queue is empty each call
/// fails with [`TiangongError::Model`].
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    /// A model answering with `responses`, one per call.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response.
    pub fn push_response(&self, response: impl Into<String>) {
        self.responses.lock().push_back(Ok(response.into()));
    }

    /// Queue a failure; the call consuming it returns a `Model` error.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Number of `generate` calls made.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> TiangongResult<String> {
        self.prompts.lock().push(prompt.to_string());
        match self.responses.lock().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(TiangongError::Model(message)),
            None => Err(TiangongError::Model("scripted model has no responses left".into())),
        }
    }
}
