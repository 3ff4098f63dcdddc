use tiangong_core::TiangongError;

/// Failure of a research provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The provider has no credentials or service entry.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The request could not be sent or the server answered with a non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with something that is not valid JSON-RPC or JSON.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The remote tool reported an error.
    #[error("tool error: {0}")]
    Tool(String),

    /// The query was rejected before any request was made.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl SearchError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            SearchError::NotConfigured(_) | SearchError::InvalidQuery(_)
        )
    }
}

impl From<SearchError> for TiangongError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NotConfigured(message) => TiangongError::Config(message),
            other => TiangongError::Research(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Transport(err.to_string())
    }
}
