use crate::error::SearchError;
use crate::provider::{ResearchProvider, SearchOptions, SearchResponse};
use async_trait::async_trait;
use tiangong_core::RetryPolicy;

/// Retries a provider's failed searches according to a [`RetryPolicy`].
///
/// Every [`SearchError`] except `InvalidQuery` and `NotConfigured` is retried.
/// When the budget runs out the last error is returned.
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: ResearchProvider> RetryingProvider<P> {
    /// Wrap `inner` with the default policy (3 attempts, 1 s base, 12 s cap).
    pub fn new(inner: P) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    /// Wrap `inner` with a custom policy.
    pub fn with_policy(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// The policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<P: ResearchProvider> ResearchProvider for RetryingProvider<P> {
    async fn search(
        &self,
        query: &str,
        options: Option<&SearchOptions>,
    ) -> Result<SearchResponse, SearchError> {
        self.policy
            .run(
                || self.inner.search(query, options),
                SearchError::is_retryable,
            )
            .await
    }
}
