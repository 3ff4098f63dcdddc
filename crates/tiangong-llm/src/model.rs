use crate::backends::claude::ClaudeBackend;
use crate::backends::openai::OpenAiBackend;
use crate::backends::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use async_trait::async_trait;
use std::sync::Arc;
use tiangong_core::TiangongResult;
use tracing::{debug, info};

/// Text generation: one prompt in, one completion out.
///
/// Implementations must be safe to share across tasks. Failures are
/// reported as errors and never as empty strings.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Produce a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> TiangongResult<String>;
}

#[async_trait]
impl<T: LanguageModel + ?Sized> LanguageModel for Arc<T> {
    async fn generate(&self, prompt: &str) -> TiangongResult<String> {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    async fn generate(&self, prompt: &str) -> TiangongResult<String> {
        (**self).generate(prompt).await
    }
}

/// Provider-dispatching model client.
pub struct LlmClient {
    inner: Inner,
    system_prompt: Option<String>,
}

enum Inner {
    Backend {
        backend: Box<dyn LlmBackend>,
        model_id: String,
    },
    Custom(Box<dyn LanguageModel>),
}

impl LlmClient {
    /// Build a client for the configured provider.
    pub fn new(config: ModelConfig) -> TiangongResult<Self> {
        let model_id = config.model_id.clone();
        let backend: Box<dyn LlmBackend> = match config.provider {
            LlmProvider::Claude => Box::new(ClaudeBackend::new(config)?),
            LlmProvider::OpenAi | LlmProvider::OpenRouter | LlmProvider::Groq => {
                Box::new(OpenAiBackend::new(config)?)
            }
        };
        info!(model = %model_id, "Language model client ready");
        Ok(Self::from_backend(backend, model_id))
    }

    /// Wrap an arbitrary backend.
    pub fn from_backend(backend: Box<dyn LlmBackend>, model_id: impl Into<String>) -> Self {
        Self {
            inner: Inner::Backend {
                backend,
                model_id: model_id.into(),
            },
            system_prompt: None,
        }
    }

    /// Wrap a custom [`LanguageModel`].
    pub fn from_model(model: Box<dyn LanguageModel>) -> Self {
        Self {
            inner: Inner::Custom(model),
            system_prompt: None,
        }
    }

    /// Send `prompt` as the system message of every request.
    ///
    /// Custom models receive the system prompt prepended to the user prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Model name, when backed by a provider.
    pub fn model_id(&self) -> Option<&str> {
        match &self.inner {
            Inner::Backend { model_id, .. } => Some(model_id),
            Inner::Custom(_) => None,
        }
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn generate(&self, prompt: &str) -> TiangongResult<String> {
        match &self.inner {
            Inner::Backend { backend, model_id } => {
                debug!(model = %model_id, prompt_chars = prompt.chars().count(), "Generating");
                backend.complete(self.system_prompt.as_deref(), prompt).await
            }
            Inner::Custom(model) => match &self.system_prompt {
                Some(sys) => model.generate(&format!("{sys}\n\n{prompt}")).await,
                None => model.generate(prompt).await,
            },
        }
    }
}
