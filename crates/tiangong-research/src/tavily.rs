use crate::error::SearchError;
use crate::mcp::McpHttpClient;
use crate::provider::{merge_payload, ResearchProvider, SearchOptions, SearchResponse};
use async_trait::async_trait;
use tiangong_core::Secrets;
use tracing::{debug, warn};

/// Default `[mcp_servers.<name>]` entry.
pub const DEFAULT_SERVICE: &str = "tavily";
/// Default tool exposed by the Tavily MCP server.
pub const DEFAULT_TOOL: &str = "search";

/// Web search through the Tavily MCP service.
///
/// Does not retry on its own; wrap it in [`crate::RetryingProvider`].
pub struct TavilySearchClient {
    service_name: String,
    tool_name: String,
    client: McpHttpClient,
}

impl TavilySearchClient {
    /// Client for the `tavily` service and `search` tool.
    pub fn from_secrets(secrets: &Secrets) -> Result<Self, SearchError> {
        Self::for_service(secrets, DEFAULT_SERVICE, DEFAULT_TOOL)
    }

    /// Client for a custom service entry and tool name.
    pub fn for_service(
        secrets: &Secrets,
        service_name: &str,
        tool_name: &str,
    ) -> Result<Self, SearchError> {
        let config = secrets.mcp_server(service_name).ok_or_else(|| {
            let available: Vec<&str> = secrets.mcp_servers.keys().map(String::as_str).collect();
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            SearchError::NotConfigured(format!(
                "MCP service '{service_name}' is not configured. Available services: {available}."
            ))
        })?;

        Ok(Self {
            service_name: service_name.to_string(),
            tool_name: tool_name.to_string(),
            client: McpHttpClient::from_secrets(config)?,
        })
    }

    /// Configured service name.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Configured tool name.
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }
}

#[async_trait]
impl ResearchProvider for TavilySearchClient {
    async fn search(
        &self,
        query: &str,
        options: Option<&SearchOptions>,
    ) -> Result<SearchResponse, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery("query cannot be empty".into()));
        }
        let payload = merge_payload(query, options);
        debug!(service = %self.service_name, tool = %self.tool_name, "Invoking Tavily search");

        let result = self
            .client
            .call_tool(&self.tool_name, payload)
            .await
            .inspect_err(|e| warn!(service = %self.service_name, error = %e, "Tavily search failed"))?;

        let attachments = result.attachments();
        Ok(SearchResponse {
            query: query.to_string(),
            result: result.primary_result(),
            attachments: if attachments.is_empty() {
                None
            } else {
                Some(attachments)
            },
        })
    }
}
