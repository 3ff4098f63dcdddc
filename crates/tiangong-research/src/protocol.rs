//! MCP (Model Context Protocol) JSON-RPC 2.0 message types.

use serde::{Deserialize, Serialize};

/// Protocol revision sent in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Request id echoed by the response.
    pub id: u64,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Build a request.
    pub fn new(id: u64, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 notification (no id, no response).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Method name.
    pub method: String,
}

impl JsonRpcNotification {
    /// Build a notification.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
        }
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    /// Id of the request answered; absent for server notifications.
    #[serde(default)]
    pub id: Option<u64>,
    /// Success payload.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Failure payload.
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

/// `tools/call` result.
#[derive(Debug, Clone, Deserialize)]
pub struct McpToolResult {
    /// Content blocks.
    #[serde(default)]
    pub content: Vec<McpContent>,
    /// Structured output, when the tool declares an output schema.
    #[serde(default, rename = "structuredContent")]
    pub structured_content: Option<serde_json::Value>,
    /// Whether the tool failed.
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

/// MCP content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpContent {
    /// Block type: `text`, `image`, `resource`, ...
    #[serde(rename = "type")]
    pub content_type: String,
    /// Text of a `text` block.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Remaining fields of non-text blocks.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl McpToolResult {
    /// Concatenated text of all `text` blocks.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The tool's primary output.
    ///
    /// Structured content wins; otherwise text is parsed as JSON when
    /// possible and returned as a string when not.
    pub fn primary_result(&self) -> serde_json::Value {
        if let Some(structured) = &self.structured_content {
            return structured.clone();
        }
        let text = self.joined_text();
        serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
    }

    /// Non-text content blocks.
    pub fn attachments(&self) -> Vec<serde_json::Value> {
        self.content
            .iter()
            .filter(|c| c.content_type != "text")
            .filter_map(|c| serde_json::to_value(c).ok())
            .collect()
    }
}

/// MCP `initialize` response.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    /// Protocol revision the server speaks.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server identity.
    #[serde(default, rename = "serverInfo")]
    pub server_info: Option<ServerInfo>,
}

/// Server identity from `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    #[serde(default)]
    pub version: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = JsonRpcRequest::new(1, "tools/call", Some(serde_json::json!({"name": "search"})));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 1);
        assert_eq!(json["params"]["name"], "search");

        let bare = serde_json::to_value(JsonRpcRequest::new(2, "ping", None)).unwrap();
        assert!(bare.get("params").is_none());
    }

    #[test]
    fn test_primary_result_parses_json_text() {
        let result: McpToolResult = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "{\"results\": [1, 2]}"}],
            "isError": false
        }))
        .unwrap();
        assert_eq!(result.primary_result()["results"], serde_json::json!([1, 2]));
        assert!(result.attachments().is_empty());
    }

    #[test]
    fn test_primary_result_keeps_plain_text_and_attachments() {
        let result: McpToolResult = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "plain answer"},
                {"type": "image", "data": "aGk=", "mimeType": "image/png"}
            ]
        }))
        .unwrap();
        assert_eq!(result.primary_result(), "plain answer");
        let attachments = result.attachments();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0]["mimeType"], "image/png");
    }

    #[test]
    fn test_structured_content_wins() {
        let result: McpToolResult = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "ignored"}],
            "structuredContent": {"answer": 42}
        }))
        .unwrap();
        assert_eq!(result.primary_result()["answer"], 42);
    }
}
