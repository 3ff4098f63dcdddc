//! Core types and error definitions for the TianGong workspace.
//!
//! This crate provides the foundational types shared across all workspace crates,
//! including error handling, tool call abstractions, the response envelope,
//! secrets loading, the retry policy and logging setup.
//!
//! # Main types
//!
//! - [`TiangongError`]: Unified error enum for all workspace subsystems.
//! - [`TiangongResult`]: Convenience alias for `Result<T, TiangongError>`.
//! - [`ToolCall`]: An agent-initiated tool invocation request.
//! - [`ToolResult`]: The result returned after executing a tool call.
//! - [`WorkspaceResponse`]: Structured envelope for CLI and tool output.
//! - [`Secrets`]: Credentials for the model provider, MCP services and knowledge base.
//! - [`RetryPolicy`]: Bounded exponential-backoff retry policy.

/// Secrets and service configuration loaded from TOML.
pub mod config;
/// Structured response envelope.
pub mod response;
/// Retry policy with exponential backoff.
pub mod retry;
/// Logging initialisation.
pub mod telemetry;

pub use config::{DifyKnowledgeBaseSecrets, McpServerSecrets, OpenAiSecrets, Secrets};
pub use response::{ResponseStatus, WorkspaceResponse};
pub use retry::RetryPolicy;
pub use telemetry::{init_tracing, LogFormat};

use serde::{Deserialize, Serialize};

// --- Error types ---

/// Top-level error type for the TianGong workspace.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Debug, thiserror::Error)]
pub enum TiangongError {
    /// Caller input failed validation (for example an empty topic).
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A workflow kind tag that the workspace does not know.
    #[error("Unsupported workflow '{0}'")]
    UnsupportedWorkflow(String),

    /// A language-model invocation failed.
    #[error("Model error: {0}")]
    Model(String),

    /// A research provider failed.
    #[error("Research error: {0}")]
    Research(String),

    /// An outbound HTTP request failed (e.g. LLM API call).
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error in configuration loading or lookup.
    #[error("Config error: {0}")]
    Config(String),

    /// An error raised by a skill during invocation.
    #[error("Skill error: {0}")]
    Skill(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`TiangongError`].
pub type TiangongResult<T> = Result<T, TiangongError>;

// --- Tool types ---

/// A request from an agent to invoke a specific tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier assigned by the caller for this tool call.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON arguments to pass to the tool.
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Creates a tool call with a freshly generated id.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
        }
    }
}

/// The result returned after executing a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The ID of the [`ToolCall`] this result corresponds to.
    pub call_id: String,
    /// The textual output produced by the tool.
    pub content: String,
    /// Whether the tool execution ended in an error.
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful tool result.
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Creates an error tool result.
    pub fn error(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }

    /// Parses the content as JSON.
    pub fn json(&self) -> TiangongResult<serde_json::Value> {
        Ok(serde_json::from_str(&self.content)?)
    }
}
