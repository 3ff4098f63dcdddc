use super::{build_http_client, send_json, LlmBackend};
use crate::config::{LlmProvider, ModelConfig};
use async_trait::async_trait;
use tiangong_core::{TiangongError, TiangongResult};
use tracing::debug;

/// OpenAI-compatible API backend.
///
/// Works with OpenAI, OpenRouter, Groq and any other provider that
/// implements the chat completions API.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    /// Build the backend and its HTTP client.
    pub fn new(config: ModelConfig) -> TiangongResult<Self> {
        let http = build_http_client(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    fn build_messages(&self, system_prompt: Option<&str>, prompt: &str) -> Vec<serde_json::Value> {
        let mut api_messages = Vec::with_capacity(2);
        if let Some(sys) = system_prompt {
            api_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }
        api_messages.push(serde_json::json!({
            "role": "user",
            "content": prompt
        }));
        api_messages
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter requires extra headers
        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request
                .header("HTTP-Referer", "https://github.com/linancn/tiangong-ai-workspace")
                .header("X-Title", "TianGong AI Workspace")
        } else {
            request
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(&self, system_prompt: Option<&str>, prompt: &str) -> TiangongResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());
        let body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": self.build_messages(system_prompt, prompt),
        });

        debug!(model = %self.config.model_id, url = %url, "Sending chat completion");
        let request = self.add_provider_headers(self.http.post(&url)).json(&body);
        let resp_body = send_json(request, "OpenAI").await?;
        parse_openai_response(&resp_body)
    }
}

/// Extract the assistant text from a chat completions response.
pub fn parse_openai_response(body: &serde_json::Value) -> TiangongResult<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| TiangongError::Model("response contained no message content".into()))
}
