//! MCP client over the streamable HTTP transport.
//!
//! Every JSON-RPC message is a `POST` to the service URL. The server answers
//! either with a JSON body or with a server-sent-events stream whose `data:`
//! lines carry the JSON-RPC messages. The session id handed out by
//! `initialize` (header `Mcp-Session-Id`) is echoed on later requests.

use crate::error::SearchError;
use crate::protocol::{
    InitializeResult, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, McpToolResult,
    PROTOCOL_VERSION,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tiangong_core::McpServerSecrets;
use tracing::{debug, info};

/// Header carrying the MCP session id.
pub const SESSION_HEADER: &str = "Mcp-Session-Id";

const STREAMABLE_HTTP: &str = "streamable_http";

/// An initialised MCP session.
#[derive(Debug, Clone)]
pub struct McpSession {
    /// Session id assigned by the server, if any.
    pub id: Option<String>,
    /// The server's `initialize` answer.
    pub info: InitializeResult,
}

/// MCP client for one remote service.
pub struct McpHttpClient {
    url: String,
    headers: BTreeMap<String, String>,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl McpHttpClient {
    /// Client for `url` with default HTTP settings.
    pub fn new(url: impl Into<String>) -> Result<Self, SearchError> {
        Self::with_timeout(url, None)
    }

    /// Client for `url` with an optional request timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, SearchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SearchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            headers: BTreeMap::new(),
            http,
            next_id: AtomicU64::new(1),
        })
    }

    /// Client configured from a `[mcp_servers.<name>]` secrets entry.
    pub fn from_secrets(config: &McpServerSecrets) -> Result<Self, SearchError> {
        if config.transport != STREAMABLE_HTTP {
            return Err(SearchError::NotConfigured(format!(
                "unsupported MCP transport '{}'; only '{STREAMABLE_HTTP}' is available",
                config.transport
            )));
        }
        let mut client = Self::new(&config.url)?;
        if let Some(key) = &config.api_key {
            client = client.with_header("Authorization", format!("Bearer {key}"));
        }
        for (name, value) in &config.headers {
            client = client.with_header(name, value);
        }
        Ok(client)
    }

    /// Send `name: value` with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Service URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Perform the `initialize` handshake and send `notifications/initialized`.
    pub async fn initialize(&self) -> Result<McpSession, SearchError> {
        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "tiangong-ai-workspace",
                "version": env!("CARGO_PKG_VERSION"),
            }
        });
        let (result, session_id) = self.request("initialize", Some(params), None).await?;
        let info: InitializeResult = serde_json::from_value(result)
            .map_err(|e| SearchError::Protocol(format!("invalid initialize result: {e}")))?;

        self.notify("notifications/initialized", session_id.as_deref())
            .await?;

        info!(
            url = %self.url,
            protocol = %info.protocol_version,
            server = info.server_info.as_ref().map(|s| s.name.as_str()).unwrap_or("unknown"),
            "MCP session initialized"
        );
        Ok(McpSession {
            id: session_id,
            info,
        })
    }

    /// Open a session and invoke `tool` with `arguments`.
    ///
    /// A result flagged `isError` becomes [`SearchError::Tool`].
    pub async fn call_tool(
        &self,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<McpToolResult, SearchError> {
        let session = self.initialize().await?;
        self.call_tool_in(&session, tool, arguments).await
    }

    /// Invoke `tool` inside an existing session.
    pub async fn call_tool_in(
        &self,
        session: &McpSession,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<McpToolResult, SearchError> {
        let params = serde_json::json!({"name": tool, "arguments": arguments});
        let (result, _) = self
            .request("tools/call", Some(params), session.id.as_deref())
            .await?;
        let result: McpToolResult = serde_json::from_value(result)
            .map_err(|e| SearchError::Protocol(format!("invalid tools/call result: {e}")))?;

        if result.is_error {
            let message = result.joined_text();
            return Err(SearchError::Tool(if message.is_empty() {
                format!("tool '{tool}' reported an error")
            } else {
                message
            }));
        }
        Ok(result)
    }

    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
        session_id: Option<&str>,
    ) -> Result<(serde_json::Value, Option<String>), SearchError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let req = JsonRpcRequest::new(id, method, params);
        debug!(method, id, url = %self.url, "Sending MCP request");

        let resp = self.post(&req, session_id).await?;
        let new_session = resp
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| session_id.map(str::to_string));
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = resp.text().await?;

        let rpc = parse_rpc_body(&content_type, &body, id)?;
        if let Some(err) = rpc.error {
            return Err(SearchError::Tool(format!(
                "MCP error {}: {}",
                err.code, err.message
            )));
        }
        let result = rpc
            .result
            .ok_or_else(|| SearchError::Protocol(format!("MCP response to '{method}' has no result")))?;
        Ok((result, new_session))
    }

    async fn notify(&self, method: &str, session_id: Option<&str>) -> Result<(), SearchError> {
        self.post(&JsonRpcNotification::new(method), session_id)
            .await
            .map(|_| ())
    }

    async fn post<T: Serialize>(
        &self,
        message: &T,
        session_id: Option<&str>,
    ) -> Result<reqwest::Response, SearchError> {
        let mut request = self
            .http
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json, text/event-stream")
            .json(message);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(id) = session_id {
            request = request.header(SESSION_HEADER, id);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Transport(format!(
                "MCP server returned {status}: {body}"
            )));
        }
        Ok(resp)
    }
}

/// Extract the JSON-RPC response with id `expected_id` from a JSON or SSE body.
pub fn parse_rpc_body(
    content_type: &str,
    body: &str,
    expected_id: u64,
) -> Result<JsonRpcResponse, SearchError> {
    if content_type.starts_with("text/event-stream") {
        return body
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .filter_map(|data| serde_json::from_str::<JsonRpcResponse>(data.trim()).ok())
            .find(|resp| resp.id == Some(expected_id))
            .ok_or_else(|| {
                SearchError::Protocol(format!(
                    "event stream contained no response for request {expected_id}"
                ))
            });
    }

    let resp: JsonRpcResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Protocol(format!("invalid JSON-RPC response: {e}")))?;
    // Servers may answer an unparseable request with `id: null`.
    let unattributed_error = resp.id.is_none() && resp.error.is_some();
    if resp.id != Some(expected_id) && !unattributed_error {
        return Err(SearchError::Protocol(format!(
            "response id {:?} does not match request {expected_id}",
            resp.id
        )));
    }
    Ok(resp)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_body() {
        let resp = parse_rpc_body(
            "application/json",
            r#"{"jsonrpc":"2.0","id":3,"result":{"ok":true}}"#,
            3,
        )
        .unwrap();
        assert_eq!(resp.id, Some(3));
        assert_eq!(resp.result.unwrap()["ok"], true);
    }

    #[test]
    fn test_parse_sse_body_skips_other_messages() {
        let body = "event: message\n\
                    data: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\"}\n\n\
                    event: message\n\
                    data: {\"jsonrpc\":\"2.0\",\"id\":7,\"result\":{\"content\":[]}}\n\n";
        let resp = parse_rpc_body("text/event-stream; charset=utf-8", body, 7).unwrap();
        assert_eq!(resp.id, Some(7));
    }

    #[test]
    fn test_json_body_with_wrong_id_is_rejected() {
        let err = parse_rpc_body(
            "application/json",
            r#"{"jsonrpc":"2.0","id":4,"result":{}}"#,
            3,
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::Protocol(ref m) if m.contains("request 3")));

        let null_id_error = parse_rpc_body(
            "application/json",
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error"}}"#,
            3,
        )
        .unwrap();
        assert!(null_id_error.error.is_some());
    }

    #[test]
    fn test_parse_errors_are_protocol() {
        assert!(matches!(
            parse_rpc_body("application/json", "<html>", 1),
            Err(SearchError::Protocol(_))
        ));
        assert!(matches!(
            parse_rpc_body("text/event-stream", "data: {}\n", 1),
            Err(SearchError::Protocol(_))
        ));
    }

    #[test]
    fn test_unsupported_transport_is_not_configured() {
        let config = McpServerSecrets {
            transport: "stdio".into(),
            url: "http://localhost".into(),
            api_key: None,
            headers: BTreeMap::new(),
        };
        assert!(matches!(
            McpHttpClient::from_secrets(&config),
            Err(SearchError::NotConfigured(_))
        ));
    }
}
