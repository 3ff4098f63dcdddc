use crate::TiangongResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome marker of a [`WorkspaceResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The operation completed.
    Success,
    /// The operation failed; `message` says why.
    Error,
}

/// Structured envelope returned by CLI commands and agent tools so that
/// downstream consumers can parse every result the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceResponse {
    /// Success or error.
    pub status: ResponseStatus,
    /// Optional human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The result data.
    #[serde(default)]
    pub payload: Value,
    /// Free-form metadata such as `request_id`.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl WorkspaceResponse {
    /// A successful response carrying `payload`.
    pub fn ok(payload: impl Into<Value>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            payload: payload.into(),
            metadata: Map::new(),
        }
    }

    /// An error response with the given message and a null payload.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Some(message.into()),
            payload: Value::Null,
            metadata: Map::new(),
        }
    }

    /// Set the human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a caller-supplied request id to the metadata.
    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        self.with_metadata("request_id", Value::String(request_id.into()))
    }

    /// Stamp the metadata with the current UTC time (`timestamp`).
    pub fn with_timestamp(self) -> Self {
        let now = Utc::now().to_rfc3339();
        self.with_metadata("timestamp", Value::String(now))
    }

    /// Insert an arbitrary metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Whether the status is [`ResponseStatus::Success`].
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Compact JSON encoding.
    pub fn to_json(&self) -> TiangongResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON encoding, used for terminal output.
    pub fn to_json_pretty(&self) -> TiangongResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
