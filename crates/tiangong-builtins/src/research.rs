use async_trait::async_trait;
use std::sync::Arc;
use tiangong_core::{TiangongResult, ToolCall, ToolResult};
use tiangong_research::ResearchProvider;
use tiangong_skills::skill::{Skill, SkillDescriptor};
use tracing::warn;

/// Internet search skill (`tavily_search`).
///
/// Answers `{"status": "success", "data": ...}` or
/// `{"status": "error", "message": ...}`; provider failures never surface
/// as `Err`.
pub struct ResearchSkill {
    descriptor: SkillDescriptor,
    provider: Arc<dyn ResearchProvider>,
}

impl ResearchSkill {
    /// Skill backed by `provider`.
    pub fn new(provider: Arc<dyn ResearchProvider>) -> Self {
        Self {
            descriptor: SkillDescriptor {
                name: "tavily_search".to_string(),
                description: "Search the internet using the configured Tavily MCP service."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Natural language search query"
                        },
                        "options": {
                            "type": "object",
                            "description": "Extra parameters forwarded to the search tool"
                        }
                    },
                    "required": ["query"]
                }),
            },
            provider,
        }
    }
}

#[async_trait]
impl Skill for ResearchSkill {
    fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> TiangongResult<ToolResult> {
        let query = call.arguments["query"].as_str().unwrap_or_default();
        let options = call.arguments["options"].as_object();

        match self.provider.search(query, options).await {
            Ok(response) => {
                let body = serde_json::json!({"status": "success", "data": response});
                Ok(ToolResult::success(&call.id, body.to_string()))
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Search tool failed");
                let body = serde_json::json!({"status": "error", "message": e.to_string()});
                Ok(ToolResult::error(&call.id, body.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tiangong_research::{SearchError, SearchOptions, SearchResponse};

    struct EchoProvider;

    #[async_trait]
    impl ResearchProvider for EchoProvider {
        async fn search(
            &self,
            query: &str,
            options: Option<&SearchOptions>,
        ) -> Result<SearchResponse, SearchError> {
            if query.is_empty() {
                return Err(SearchError::InvalidQuery("query cannot be empty".into()));
            }
            Ok(SearchResponse::new(
                query,
                serde_json::json!({"options": options.cloned()}),
            ))
        }
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let skill = ResearchSkill::new(Arc::new(EchoProvider));
        let result = skill
            .execute(ToolCall::new(
                "tavily_search",
                serde_json::json!({"query": "perovskite", "options": {"max_results": 2}}),
            ))
            .await
            .unwrap();
        assert!(!result.is_error);
        let json = result.json().unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["query"], "perovskite");
        assert_eq!(json["data"]["result"]["options"]["max_results"], 2);
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let skill = ResearchSkill::new(Arc::new(EchoProvider));
        let result = skill
            .execute(ToolCall::new("tavily_search", serde_json::json!({})))
            .await
            .unwrap();
        assert!(result.is_error);
        let json = result.json().unwrap();
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().unwrap().contains("empty"));
    }
}
