use crate::error::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Optional provider-specific parameters merged into the request payload.
pub type SearchOptions = serde_json::Map<String, serde_json::Value>;

/// What a research provider returns for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query as sent.
    pub query: String,
    /// Provider output.
    pub result: serde_json::Value,
    /// Extra non-text material (images, resources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<serde_json::Value>>,
}

impl SearchResponse {
    /// A response without attachments.
    pub fn new(query: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            query: query.into(),
            result,
            attachments: None,
        }
    }
}

/// Anything that can answer a research query.
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    /// Run one search.
    async fn search(
        &self,
        query: &str,
        options: Option<&SearchOptions>,
    ) -> Result<SearchResponse, SearchError>;
}

#[async_trait]
impl<T: ResearchProvider + ?Sized> ResearchProvider for Arc<T> {
    async fn search(
        &self,
        query: &str,
        options: Option<&SearchOptions>,
    ) -> Result<SearchResponse, SearchError> {
        (**self).search(query, options).await
    }
}

#[async_trait]
impl<T: ResearchProvider + ?Sized> ResearchProvider for Box<T> {
    async fn search(
        &self,
        query: &str,
        options: Option<&SearchOptions>,
    ) -> Result<SearchResponse, SearchError> {
        (**self).search(query, options).await
    }
}

/// Build the request payload: `{"query": query}` with `options` merged over it.
pub(crate) fn merge_payload(query: &str, options: Option<&SearchOptions>) -> serde_json::Value {
    let mut payload = SearchOptions::new();
    payload.insert("query".into(), serde_json::Value::String(query.to_string()));
    if let Some(options) = options {
        for (key, value) in options {
            payload.insert(key.clone(), value.clone());
        }
    }
    serde_json::Value::Object(payload)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_payload_adds_options() {
        let mut options = SearchOptions::new();
        options.insert("max_results".into(), serde_json::json!(5));
        let payload = merge_payload("solar", Some(&options));
        assert_eq!(payload, serde_json::json!({"query": "solar", "max_results": 5}));
        assert_eq!(merge_payload("solar", None), serde_json::json!({"query": "solar"}));
    }

    #[test]
    fn test_response_omits_empty_attachments() {
        let json = serde_json::to_value(SearchResponse::new("q", serde_json::json!("r"))).unwrap();
        assert_eq!(json, serde_json::json!({"query": "q", "result": "r"}));
    }
}
