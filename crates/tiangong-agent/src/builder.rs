use crate::profiles::{default_subagents, SubAgentProfile, DEFAULT_SYSTEM_PROMPT};
use serde_json::json;
use std::sync::Arc;
use tiangong_builtins::{DocumentSkill, PythonSkill, ResearchSkill, ShellSkill};
use tiangong_core::{Secrets, TiangongResult, ToolCall, ToolResult};
use tiangong_llm::{ChatModelOptions, LanguageModel, ModelFactory, ModelPurpose};
use tiangong_research::{ResearchProvider, RetryingProvider, TavilySearchClient};
use tiangong_skills::{Skill, SkillDescriptor, SkillRegistry};
use tiangong_workflows::DocumentWorkflow;
use tracing::{debug, info};

/// Sampling temperature of the agent model built from secrets.
pub const AGENT_TEMPERATURE: f32 = 0.2;

/// Assembles a [`WorkspaceAgent`].
///
/// Every built-in tool is on by default. The research tool and the
/// research specialist are left out without error when no research
/// provider is available.
#[must_use]
pub struct WorkspaceAgentBuilder {
    model: Arc<dyn LanguageModel>,
    research: Option<Arc<dyn ResearchProvider>>,
    include_shell: bool,
    include_python: bool,
    include_research: bool,
    include_document: bool,
    extra_tools: Vec<Arc<dyn Skill>>,
    subagents: Vec<SubAgentProfile>,
    system_prompt: Option<String>,
}

impl WorkspaceAgentBuilder {
    /// Builder around an existing model, without a research provider.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            research: None,
            include_shell: true,
            include_python: true,
            include_research: true,
            include_document: true,
            extra_tools: Vec::new(),
            subagents: Vec::new(),
            system_prompt: None,
        }
    }

    /// Builder with the deep-research model and Tavily search taken from `secrets`.
    ///
    /// Fails only when the model cannot be created; missing Tavily settings
    /// just leave research out.
    pub fn from_secrets(secrets: &Secrets) -> TiangongResult<Self> {
        let model = ModelFactory::new(secrets)?.create_chat_model(&ChatModelOptions {
            purpose: ModelPurpose::DeepResearch,
            temperature: AGENT_TEMPERATURE,
            ..ChatModelOptions::default()
        })?;
        Ok(Self::new(Arc::new(model)).research_from_secrets(secrets))
    }

    /// Use `provider` for the research tool and the document workflow.
    pub fn research_provider(mut self, provider: Arc<dyn ResearchProvider>) -> Self {
        self.research = Some(provider);
        self
    }

    /// Use Tavily search (with retries) when `secrets` configure it.
    pub fn research_from_secrets(mut self, secrets: &Secrets) -> Self {
        match TavilySearchClient::from_secrets(secrets) {
            Ok(client) => self.research = Some(Arc::new(RetryingProvider::new(client))),
            Err(e) => debug!(error = %e, "Research provider unavailable; omitting research tool"),
        }
        self
    }

    /// Include `run_shell`.
    pub fn include_shell(mut self, include: bool) -> Self {
        self.include_shell = include;
        self
    }

    /// Include `run_python`.
    pub fn include_python(mut self, include: bool) -> Self {
        self.include_python = include;
        self
    }

    /// Include `tavily_search` (when a provider exists).
    pub fn include_research(mut self, include: bool) -> Self {
        self.include_research = include;
        self
    }

    /// Include `generate_document`.
    pub fn include_document(mut self, include: bool) -> Self {
        self.include_document = include;
        self
    }

    /// Register an additional tool.
    pub fn extra_tool(mut self, tool: Arc<dyn Skill>) -> Self {
        self.extra_tools.push(tool);
        self
    }

    /// Append a sub-agent after the defaults.
    pub fn subagent(mut self, profile: SubAgentProfile) -> Self {
        self.subagents.push(profile);
        self
    }

    /// Replace the default system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Assemble the agent.
    pub fn build(self) -> WorkspaceAgent {
        let mut registry = SkillRegistry::new();

        let shell = self.include_shell.then(|| register(&mut registry, ShellSkill::new()));
        let python = self
            .include_python
            .then(|| register(&mut registry, PythonSkill::new()));

        let research_provider = if self.include_research {
            self.research.clone()
        } else {
            None
        };
        let research = research_provider
            .clone()
            .map(|provider| register(&mut registry, ResearchSkill::new(provider)));

        let document = self.include_document.then(|| {
            let mut workflow = DocumentWorkflow::new(self.model.clone());
            if let Some(provider) = research_provider {
                workflow = workflow.with_research(provider);
            }
            register(&mut registry, DocumentSkill::new(workflow))
        });

        for tool in self.extra_tools {
            registry.register(tool);
        }

        let mut subagents = default_subagents(
            document.as_deref(),
            research.as_deref(),
            python.as_deref(),
            shell.as_deref(),
        );
        subagents.extend(self.subagents);

        let agent = WorkspaceAgent {
            system_prompt: self
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            model: self.model,
            registry,
            subagents,
        };
        info!(
            tools = agent.registry.skill_count(),
            subagents = agent.subagents.len(),
            "Workspace agent assembled"
        );
        agent
    }
}

fn register(registry: &mut SkillRegistry, skill: impl Skill + 'static) -> String {
    let name = skill.descriptor().name.clone();
    registry.register(Arc::new(skill));
    name
}

/// The assembled workspace agent: prompt, model, tools and specialists.
pub struct WorkspaceAgent {
    system_prompt: String,
    model: Arc<dyn LanguageModel>,
    registry: SkillRegistry,
    subagents: Vec<SubAgentProfile>,
}

impl WorkspaceAgent {
    /// System prompt for the main agent.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Model the agent and its document tool use.
    pub fn model(&self) -> &Arc<dyn LanguageModel> {
        &self.model
    }

    /// Registered tools.
    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    /// Names of the registered tools, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Specialist sub-agents, defaults first.
    pub fn subagents(&self) -> &[SubAgentProfile] {
        &self.subagents
    }

    /// Look up a sub-agent by name.
    pub fn subagent(&self, name: &str) -> Option<&SubAgentProfile> {
        self.subagents.iter().find(|s| s.name == name)
    }

    /// Execute a tool call against the registry.
    pub async fn call_tool(&self, call: ToolCall) -> TiangongResult<ToolResult> {
        self.registry.execute(call).await
    }

    /// JSON description of the prompt, tools and sub-agents.
    pub fn describe(&self) -> serde_json::Value {
        let tools: Vec<&SkillDescriptor> = self.registry.list_descriptors();
        json!({
            "system_prompt": self.system_prompt,
            "tools": tools,
            "subagents": self.subagents,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tiangong_llm::ScriptedModel;
    use tiangong_research::{SearchError, SearchOptions, SearchResponse};

    struct UnreachableSearch;

    #[async_trait]
    impl ResearchProvider for UnreachableSearch {
        async fn search(
            &self,
            _query: &str,
            _options: Option<&SearchOptions>,
        ) -> Result<SearchResponse, SearchError> {
            Err(SearchError::Transport("connection refused".into()))
        }
    }

    #[test]
    fn test_defaults_without_research_provider() {
        let agent = WorkspaceAgentBuilder::new(Arc::new(ScriptedModel::default())).build();
        assert_eq!(
            agent.tool_names(),
            vec!["generate_document", "run_python", "run_shell"]
        );
        assert!(agent.subagent("research-specialist").is_none());
        assert!(agent.subagent("document-specialist").is_some());
        assert_eq!(agent.system_prompt(), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_missing_tavily_secrets_silently_omit_research() {
        let agent = WorkspaceAgentBuilder::new(Arc::new(ScriptedModel::default()))
            .research_from_secrets(&Secrets::default())
            .build();
        assert!(agent.registry().get("tavily_search").is_none());
        assert_eq!(agent.subagents().len(), 2);
    }

    #[test]
    fn test_from_secrets_requires_openai() {
        assert!(WorkspaceAgentBuilder::from_secrets(&Secrets::default()).is_err());
    }

    #[test]
    fn test_flags_and_custom_prompt() {
        let agent = WorkspaceAgentBuilder::new(Arc::new(ScriptedModel::default()))
            .include_shell(false)
            .include_python(false)
            .include_document(false)
            .system_prompt("Custom")
            .subagent(SubAgentProfile {
                name: "reviewer".into(),
                description: "Reviews drafts".into(),
                system_prompt: "Review carefully.".into(),
                tools: vec![],
            })
            .build();
        assert!(agent.tool_names().is_empty());
        assert_eq!(agent.system_prompt(), "Custom");
        assert_eq!(agent.subagents().len(), 1);
        assert_eq!(agent.subagents()[0].name, "reviewer");
    }

    #[test]
    fn test_describe_lists_tools_and_subagents() {
        let agent = WorkspaceAgentBuilder::new(Arc::new(ScriptedModel::default()))
            .include_python(false)
            .build();
        let description = agent.describe();
        assert_eq!(description["tools"].as_array().unwrap().len(), 2);
        assert_eq!(description["subagents"][1]["name"], "execution-specialist");
        assert_eq!(
            description["subagents"][1]["tools"],
            serde_json::json!(["run_shell"])
        );
    }

    #[tokio::test]
    async fn test_research_provider_wires_tool_subagent_and_workflow() {
        let model = Arc::new(ScriptedModel::new(["O", "D"]));
        let agent = WorkspaceAgentBuilder::new(model.clone())
            .research_provider(Arc::new(UnreachableSearch))
            .build();

        assert_eq!(
            agent.tool_names(),
            vec!["generate_document", "run_python", "run_shell", "tavily_search"]
        );
        assert_eq!(agent.subagents().len(), 3);
        assert_eq!(
            agent.subagent("research-specialist").unwrap().tools,
            vec!["tavily_search".to_string()]
        );

        let result = agent
            .call_tool(ToolCall::new(
                "generate_document",
                serde_json::json!({"workflow": "report", "topic": "Battery recycling"}),
            ))
            .await
            .unwrap();
        assert!(!result.is_error);
        let body = result.json().unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["outline"], "O");
        assert_eq!(body["data"]["draft"], "D");
        assert_eq!(body["data"]["research"][0]["summary"], "Research step failed");
        assert_eq!(body["data"]["research"][0]["status"], "failed");
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_research_tool_reports_search_failure() {
        let agent = WorkspaceAgentBuilder::new(Arc::new(ScriptedModel::default()))
            .research_provider(Arc::new(UnreachableSearch))
            .build();
        let result = agent
            .call_tool(ToolCall::new("tavily_search", serde_json::json!({"query": "perovskite"})))
            .await
            .unwrap();
        assert!(result.is_error);
        assert_eq!(result.json().unwrap()["status"], "error");
    }

    #[tokio::test]
    async fn test_research_excluded_keeps_provider_out_of_document_workflow() {
        let model = Arc::new(ScriptedModel::new(["O", "D"]));
        let agent = WorkspaceAgentBuilder::new(model)
            .research_provider(Arc::new(UnreachableSearch))
            .include_research(false)
            .build();
        assert!(agent.registry().get("tavily_search").is_none());

        let result = agent
            .call_tool(ToolCall::new(
                "generate_document",
                serde_json::json!({"workflow": "plan", "topic": "Pilot line"}),
            ))
            .await
            .unwrap();
        assert_eq!(result.json().unwrap()["data"]["research"], serde_json::json!([]));
    }
}
