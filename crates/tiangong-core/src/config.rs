//! Credentials for the services the workspace talks to.
//!
//! Secrets live in a TOML file (default `.secrets/secrets.toml`) so that API
//! key lookups are not scattered across the codebase:
//!
//! ```toml
//! [openai]
//! api_key = "sk-..."
//! chat_model = "gpt-4.1"
//! deep_research_model = "o4-mini-deep-research"
//!
//! [mcp_servers.tavily]
//! transport = "streamable_http"
//! url = "https://mcp.tavily.com/mcp/"
//! api_key = "tvly-..."
//!
//! [dify_knowledge_base]
//! api_base_url = "https://api.dify.ai/v1"
//! dataset_id = "..."
//! api_key = "..."
//! ```

use crate::{TiangongError, TiangongResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the secrets file, relative to the working directory.
pub const DEFAULT_SECRETS_PATH: &str = ".secrets/secrets.toml";

/// Environment variable that overrides [`DEFAULT_SECRETS_PATH`].
pub const SECRETS_PATH_ENV: &str = "TIANGONG_SECRETS";

/// All service credentials known to the workspace.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Secrets {
    /// OpenAI-compatible model provider credentials.
    #[serde(default)]
    pub openai: Option<OpenAiSecrets>,
    /// MCP services keyed by service name.
    #[serde(default)]
    pub mcp_servers: BTreeMap<String, McpServerSecrets>,
    /// Dify knowledge base credentials.
    #[serde(default)]
    pub dify_knowledge_base: Option<DifyKnowledgeBaseSecrets>,
}

/// OpenAI credentials plus per-purpose model names.
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiSecrets {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Generic model name.
    #[serde(default)]
    pub model: Option<String>,
    /// Model used for general and creative chat.
    #[serde(default)]
    pub chat_model: Option<String>,
    /// Model used for deep research.
    #[serde(default)]
    pub deep_research_model: Option<String>,
    /// Override for the API base URL.
    #[serde(default)]
    pub api_base_url: Option<String>,
}

/// One remote MCP service.
#[derive(Clone, Serialize, Deserialize)]
pub struct McpServerSecrets {
    /// Transport name; only `streamable_http` is supported.
    #[serde(default = "default_transport")]
    pub transport: String,
    /// Endpoint URL.
    pub url: String,
    /// Optional bearer token.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Extra HTTP headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_transport() -> String {
    "streamable_http".to_string()
}

/// Dify dataset retrieval credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct DifyKnowledgeBaseSecrets {
    /// API root, e.g. `https://api.dify.ai/v1`.
    pub api_base_url: String,
    /// Dataset to query.
    pub dataset_id: String,
    /// API key sent as a bearer token.
    pub api_key: String,
}

impl Secrets {
    /// Parse secrets from a TOML string.
    pub fn from_toml_str(raw: &str) -> TiangongResult<Self> {
        toml::from_str(raw).map_err(|e| TiangongError::Config(format!("invalid secrets: {e}")))
    }

    /// Load secrets from the given file.
    pub fn load_from(path: &Path) -> TiangongResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TiangongError::Config(format!(
                "failed to read secrets file '{}': {e}",
                path.display()
            ))
        })?;
        debug!(path = %path.display(), "Loaded secrets file");
        Self::from_toml_str(&raw)
    }

    /// Load secrets from `$TIANGONG_SECRETS` or [`DEFAULT_SECRETS_PATH`].
    pub fn load() -> TiangongResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// The path [`Secrets::load`] reads.
    pub fn default_path() -> PathBuf {
        std::env::var_os(SECRETS_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_PATH))
    }

    /// Look up an MCP service by name.
    pub fn mcp_server(&self, name: &str) -> Option<&McpServerSecrets> {
        self.mcp_servers.get(name)
    }
}

fn redacted(key: &str) -> &'static str {
    if key.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("openai", &self.openai)
            .field("mcp_servers", &self.mcp_servers)
            .field("dify_knowledge_base", &self.dify_knowledge_base)
            .finish()
    }
}

impl fmt::Debug for OpenAiSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSecrets")
            .field("api_key", &redacted(&self.api_key))
            .field("model", &self.model)
            .field("chat_model", &self.chat_model)
            .field("deep_research_model", &self.deep_research_model)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl fmt::Debug for McpServerSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpServerSecrets")
            .field("transport", &self.transport)
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_deref().map(redacted))
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Debug for DifyKnowledgeBaseSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DifyKnowledgeBaseSecrets")
            .field("api_base_url", &self.api_base_url)
            .field("dataset_id", &self.dataset_id)
            .field("api_key", &redacted(&self.api_key))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [openai]
        api_key = "sk-test"
        chat_model = "gpt-4.1"

        [mcp_servers.tavily]
        url = "https://mcp.example.com/mcp"
        api_key = "tvly-test"

        [dify_knowledge_base]
        api_base_url = "https://kb.example.com/v1"
        dataset_id = "ds-1"
        api_key = "kb-key"
    "#;

    #[test]
    fn test_parse_full_secrets() {
        let secrets = Secrets::from_toml_str(SAMPLE).unwrap();
        let openai = secrets.openai.as_ref().unwrap();
        assert_eq!(openai.chat_model.as_deref(), Some("gpt-4.1"));
        assert!(openai.deep_research_model.is_none());

        let tavily = secrets.mcp_server("tavily").unwrap();
        assert_eq!(tavily.transport, "streamable_http");
        assert_eq!(tavily.url, "https://mcp.example.com/mcp");

        assert_eq!(secrets.dify_knowledge_base.unwrap().dataset_id, "ds-1");
    }

    #[test]
    fn test_empty_secrets_are_valid() {
        let secrets = Secrets::from_toml_str("").unwrap();
        assert!(secrets.openai.is_none());
        assert!(secrets.mcp_servers.is_empty());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let secrets = Secrets::from_toml_str(SAMPLE).unwrap();
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("sk-test"));
        assert!(!rendered.contains("tvly-test"));
        assert!(!rendered.contains("kb-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let secrets = Secrets::load_from(file.path()).unwrap();
        assert!(secrets.openai.is_some());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Secrets::load_from(Path::new("/nonexistent/secrets.toml")).unwrap_err();
        assert!(matches!(err, TiangongError::Config(_)));
        assert!(err.to_string().contains("/nonexistent/secrets.toml"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Secrets::from_toml_str("[openai").unwrap_err();
        assert!(matches!(err, TiangongError::Config(_)));
    }
}
