/// Anthropic messages API backend.
pub mod claude;
/// OpenAI-compatible chat completions backend.
pub mod openai;

use async_trait::async_trait;
use std::time::Duration;
use tiangong_core::{TiangongError, TiangongResult};

/// Trait for model provider backends.
///
/// Each provider dialect implements this trait to handle API communication.
/// [`crate::LlmClient`] picks the backend from the configured provider.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Single-turn completion: optional system prompt plus one user prompt.
    async fn complete(&self, system_prompt: Option<&str>, prompt: &str) -> TiangongResult<String>;
}

pub(crate) fn build_http_client(timeout_secs: Option<u64>) -> TiangongResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| TiangongError::Http(format!("failed to build HTTP client: {e}")))
}

/// Send a prepared request and return the JSON body, mapping non-2xx
/// statuses to [`TiangongError::Http`].
pub(crate) async fn send_json(
    request: reqwest::RequestBuilder,
    provider: &str,
) -> TiangongResult<serde_json::Value> {
    let resp = request
        .send()
        .await
        .map_err(|e| TiangongError::Http(e.to_string()))?;

    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| TiangongError::Http(e.to_string()))?;

    if !status.is_success() {
        return Err(TiangongError::Http(format!(
            "{provider} API error {status}: {text}"
        )));
    }

    serde_json::from_str(&text)
        .map_err(|e| TiangongError::Model(format!("{provider} returned invalid JSON: {e}")))
}
