//! Purpose-based model construction from workspace secrets.

use crate::config::{LlmProvider, ModelConfig};
use crate::model::LlmClient;
use serde::{Deserialize, Serialize};
use std::fmt;
use tiangong_core::{OpenAiSecrets, Secrets, TiangongError, TiangongResult};
use tracing::info;

/// Model used when the secrets name none.
pub const FALLBACK_MODEL: &str = "o4-mini-deep-research";

/// What a model will be used for; drives model-name selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelPurpose {
    /// Everyday drafting.
    #[default]
    General,
    /// Long-running research-oriented generation.
    DeepResearch,
    /// Freer writing.
    Creative,
}

impl fmt::Display for ModelPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelPurpose::General => write!(f, "general"),
            ModelPurpose::DeepResearch => write!(f, "deep_research"),
            ModelPurpose::Creative => write!(f, "creative"),
        }
    }
}

impl std::str::FromStr for ModelPurpose {
    type Err = TiangongError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "general" => Ok(ModelPurpose::General),
            "deep_research" => Ok(ModelPurpose::DeepResearch),
            "creative" => Ok(ModelPurpose::Creative),
            other => Err(TiangongError::InvalidConfig(format!(
                "unknown model purpose '{other}'"
            ))),
        }
    }
}

/// Knobs for [`ModelFactory::create_chat_model`].
#[derive(Debug, Clone)]
pub struct ChatModelOptions {
    /// Selection hint.
    pub purpose: ModelPurpose,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Use this model name instead of the selected one.
    pub model_override: Option<String>,
}

impl Default for ChatModelOptions {
    fn default() -> Self {
        Self {
            purpose: ModelPurpose::General,
            temperature: 0.4,
            timeout_secs: None,
            model_override: None,
        }
    }
}

/// Builds OpenAI chat clients from [`Secrets`].
#[derive(Debug, Clone)]
pub struct ModelFactory {
    openai: OpenAiSecrets,
}

impl ModelFactory {
    /// Fails with a `Config` error when no `[openai]` section is configured.
    pub fn new(secrets: &Secrets) -> TiangongResult<Self> {
        let openai = secrets.openai.clone().ok_or_else(|| {
            TiangongError::Config(
                "OpenAI credentials are not configured; add an [openai] section to the secrets file"
                    .into(),
            )
        })?;
        Ok(Self { openai })
    }

    /// Model name for `purpose`.
    pub fn select_model(&self, purpose: ModelPurpose) -> String {
        let creds = &self.openai;
        let preferred = match purpose {
            ModelPurpose::DeepResearch => creds.deep_research_model.as_ref(),
            ModelPurpose::Creative => creds.chat_model.as_ref(),
            ModelPurpose::General => None,
        };
        preferred
            .or(creds.chat_model.as_ref())
            .or(creds.model.as_ref())
            .or(creds.deep_research_model.as_ref())
            .cloned()
            .unwrap_or_else(|| FALLBACK_MODEL.to_string())
    }

    /// The [`ModelConfig`] `create_chat_model` would use.
    pub fn model_config(&self, options: &ChatModelOptions) -> ModelConfig {
        let model_id = options
            .model_override
            .clone()
            .unwrap_or_else(|| self.select_model(options.purpose));
        let mut config = ModelConfig::new(LlmProvider::OpenAi, model_id, &self.openai.api_key);
        config.api_base_url = self.openai.api_base_url.clone();
        config.temperature = options.temperature;
        config.timeout_secs = options.timeout_secs;
        config
    }

    /// Build a configured client.
    pub fn create_chat_model(&self, options: &ChatModelOptions) -> TiangongResult<LlmClient> {
        let config = self.model_config(options);
        info!(
            purpose = %options.purpose,
            model = %config.model_id,
            temperature = config.temperature,
            "Creating chat model"
        );
        LlmClient::new(config)
    }
}
