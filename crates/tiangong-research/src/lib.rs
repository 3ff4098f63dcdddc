//! Research providers for the TianGong workspace.
//!
//! The document workflow only sees the [`ResearchProvider`] trait. This crate
//! supplies the implementations:
//!
//! - [`TavilySearchClient`]: web search through the Tavily MCP service.
//! - [`DifyKnowledgeBaseClient`]: retrieval from a Dify dataset.
//! - [`RetryingProvider`]: wraps any provider with a [`tiangong_core::RetryPolicy`].
//!
//! [`McpHttpClient`] speaks MCP JSON-RPC over streamable HTTP and can be used
//! directly for other MCP tools.

/// Dify dataset retrieval.
pub mod dify;
/// Research error type.
pub mod error;
/// MCP streamable HTTP client.
pub mod mcp;
/// MCP JSON-RPC message types.
pub mod protocol;
/// The provider trait and response type.
pub mod provider;
/// Retry wrapper.
pub mod retrying;
/// Tavily search over MCP.
pub mod tavily;

pub use dify::DifyKnowledgeBaseClient;
pub use error::SearchError;
pub use mcp::McpHttpClient;
pub use provider::{ResearchProvider, SearchOptions, SearchResponse};
pub use retrying::RetryingProvider;
pub use tavily::TavilySearchClient;
