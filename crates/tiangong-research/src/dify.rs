use crate::error::SearchError;
use crate::provider::{merge_payload, ResearchProvider, SearchOptions, SearchResponse};
use async_trait::async_trait;
use std::time::Duration;
use tiangong_core::{DifyKnowledgeBaseSecrets, Secrets};
use tracing::{debug, warn};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Retrieval from a Dify knowledge-base dataset.
pub struct DifyKnowledgeBaseClient {
    config: DifyKnowledgeBaseSecrets,
    http: reqwest::Client,
}

impl DifyKnowledgeBaseClient {
    /// Client from the `[dify_knowledge_base]` secrets section.
    pub fn from_secrets(secrets: &Secrets) -> Result<Self, SearchError> {
        let config = secrets.dify_knowledge_base.clone().ok_or_else(|| {
            SearchError::NotConfigured("Dify knowledge base secrets are not configured.".into())
        })?;
        Self::new(config, DEFAULT_TIMEOUT)
    }

    /// Client from explicit settings.
    pub fn new(config: DifyKnowledgeBaseSecrets, timeout: Duration) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Retrieval endpoint URL.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/datasets/{}/retrieve",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.dataset_id
        )
    }

    /// Retrieve knowledge chunks for `query`.
    ///
    /// A blank query or a `top_k` of zero is rejected before any request.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: Option<u32>,
        options: Option<&SearchOptions>,
    ) -> Result<SearchResponse, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery("Query cannot be empty.".into()));
        }
        let mut payload = merge_payload(query, options);
        if let Some(top_k) = top_k {
            if top_k == 0 {
                return Err(SearchError::InvalidQuery(
                    "top_k must be greater than zero.".into(),
                ));
            }
            payload["top_k"] = serde_json::json!(top_k);
        }

        let url = self.endpoint();
        debug!(url = %url, "Calling Dify knowledge base");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(status = %status, "Dify knowledge base request failed");
            return Err(SearchError::Transport(format!(
                "HTTP error querying Dify knowledge base: {status}: {body}"
            )));
        }

        let data: serde_json::Value = serde_json::from_str(&body).map_err(|_| {
            SearchError::Protocol("Dify knowledge base returned invalid JSON.".into())
        })?;
        Ok(SearchResponse::new(query, data))
    }
}

#[async_trait]
impl ResearchProvider for DifyKnowledgeBaseClient {
    async fn search(
        &self,
        query: &str,
        options: Option<&SearchOptions>,
    ) -> Result<SearchResponse, SearchError> {
        self.retrieve(query, None, options).await
    }
}
