use super::{build_http_client, send_json, LlmBackend};
use crate::config::ModelConfig;
use async_trait::async_trait;
use tiangong_core::{TiangongError, TiangongResult};
use tracing::debug;

/// Claude (Anthropic) API backend.
pub struct ClaudeBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl ClaudeBackend {
    /// Build the backend and its HTTP client.
    pub fn new(config: ModelConfig) -> TiangongResult<Self> {
        let http = build_http_client(config.timeout_secs)?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl LlmBackend for ClaudeBackend {
    async fn complete(&self, system_prompt: Option<&str>, prompt: &str) -> TiangongResult<String> {
        let url = format!("{}/v1/messages", self.config.base_url());

        let mut body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [{"role": "user", "content": prompt}],
        });
        if let Some(sys) = system_prompt {
            body["system"] = serde_json::json!(sys);
        }

        debug!(model = %self.config.model_id, url = %url, "Sending messages request");
        let request = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body);

        let resp_body = send_json(request, "Claude").await?;
        parse_claude_response(&resp_body)
    }
}

/// Join the text blocks of a messages API response.
pub fn parse_claude_response(body: &serde_json::Value) -> TiangongResult<String> {
    let blocks = body["content"]
        .as_array()
        .ok_or_else(|| TiangongError::Model("response contained no content blocks".into()))?;

    let texts: Vec<&str> = blocks
        .iter()
        .filter(|block| block["type"] == "text")
        .filter_map(|block| block["text"].as_str())
        .collect();

    if texts.is_empty() {
        return Err(TiangongError::Model("response contained no text blocks".into()));
    }
    Ok(texts.join("\n"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joins_text_blocks() {
        let body = serde_json::json!({
            "content": [
                {"type": "text", "text": "first"},
                {"type": "tool_use", "id": "x", "name": "n", "input": {}},
                {"type": "text", "text": "second"}
            ]
        });
        assert_eq!(parse_claude_response(&body).unwrap(), "first\nsecond");
    }

    #[test]
    fn test_parse_without_text_is_error() {
        let body = serde_json::json!({"content": []});
        assert!(parse_claude_response(&body).is_err());
        assert!(parse_claude_response(&serde_json::json!({})).is_err());
    }
}
