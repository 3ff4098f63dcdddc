use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tiangong_core::{TiangongError, TiangongResult};

/// Output language used when none is given.
pub const DEFAULT_LANGUAGE: &str = "zh";

/// The kinds of document the workflow can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    /// Business or technical report.
    Report,
    /// Patent disclosure sheet.
    PatentDisclosure,
    /// Project or execution plan.
    Plan,
    /// Project proposal for internal review.
    ProjectProposal,
}

impl WorkflowKind {
    /// Every kind, in declaration order.
    pub const ALL: [WorkflowKind; 4] = [
        WorkflowKind::Report,
        WorkflowKind::PatentDisclosure,
        WorkflowKind::Plan,
        WorkflowKind::ProjectProposal,
    ];

    /// The snake_case tag.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowKind::Report => "report",
            WorkflowKind::PatentDisclosure => "patent_disclosure",
            WorkflowKind::Plan => "plan",
            WorkflowKind::ProjectProposal => "project_proposal",
        }
    }

    /// Human-readable document title.
    pub fn label(self) -> &'static str {
        match self {
            WorkflowKind::Report => "report",
            WorkflowKind::PatentDisclosure => "patent disclosure",
            WorkflowKind::Plan => "project plan",
            WorkflowKind::ProjectProposal => "project proposal",
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowKind {
    type Err = TiangongError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkflowKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TiangongError::UnsupportedWorkflow(s.to_string()))
    }
}

/// A validated request for one document.
///
/// Only obtainable through [`WorkflowConfig::builder`] or deserialization,
/// both of which validate; the fields cannot change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWorkflowConfig")]
pub struct WorkflowConfig {
    workflow: WorkflowKind,
    topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audience: Option<String>,
    language: String,
    include_research: bool,
}

impl WorkflowConfig {
    /// Start building a config for `workflow` about `topic`.
    pub fn builder(workflow: WorkflowKind, topic: impl Into<String>) -> WorkflowConfigBuilder {
        WorkflowConfigBuilder {
            workflow,
            topic: topic.into(),
            instructions: None,
            audience: None,
            language: DEFAULT_LANGUAGE.to_string(),
            include_research: true,
        }
    }

    /// Document kind.
    pub fn workflow(&self) -> WorkflowKind {
        self.workflow
    }

    /// Subject of the document.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Extra guidance for the writer.
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    /// Intended readers.
    pub fn audience(&self) -> Option<&str> {
        self.audience.as_deref()
    }

    /// Output language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether the research step should run.
    pub fn include_research(&self) -> bool {
        self.include_research
    }
}

/// Builder for [`WorkflowConfig`].
#[derive(Debug, Clone)]
#[must_use]
pub struct WorkflowConfigBuilder {
    workflow: WorkflowKind,
    topic: String,
    instructions: Option<String>,
    audience: Option<String>,
    language: String,
    include_research: bool,
}

impl WorkflowConfigBuilder {
    /// Extra guidance for the writer.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Intended readers.
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Output language code (default `zh`).
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Enable or disable the research step (default enabled).
    pub fn include_research(mut self, include: bool) -> Self {
        self.include_research = include;
        self
    }

    /// Validate and build.
    ///
    /// The topic and language must contain non-whitespace characters.
    /// Blank optional fields are dropped.
    pub fn build(self) -> TiangongResult<WorkflowConfig> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(TiangongError::InvalidConfig(
                "topic must not be empty".into(),
            ));
        }
        let language = self.language.trim();
        if language.is_empty() {
            return Err(TiangongError::InvalidConfig(
                "language must not be empty".into(),
            ));
        }

        Ok(WorkflowConfig {
            workflow: self.workflow,
            topic: topic.to_string(),
            instructions: non_blank(self.instructions),
            audience: non_blank(self.audience),
            language: language.to_string(),
            include_research: self.include_research,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
struct RawWorkflowConfig {
    workflow: String,
    topic: String,
    #[serde(default)]
    instructions: Option<String>,
    #[serde(default)]
    audience: Option<String>,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_include_research")]
    include_research: bool,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_include_research() -> bool {
    true
}

impl TryFrom<RawWorkflowConfig> for WorkflowConfig {
    type Error = TiangongError;

    fn try_from(raw: RawWorkflowConfig) -> Result<Self, Self::Error> {
        let mut builder = WorkflowConfig::builder(raw.workflow.parse()?, raw.topic)
            .language(raw.language)
            .include_research(raw.include_research);
        if let Some(instructions) = raw.instructions {
            builder = builder.instructions(instructions);
        }
        if let Some(audience) = raw.audience {
            builder = builder.audience(audience);
        }
        builder.build()
    }
}

/// Outcome of a research attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchStatus {
    /// The provider answered.
    Ok,
    /// The provider failed; the run continued without its output.
    Failed,
}

/// One research note fed into the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchItem {
    /// Query sent to the provider.
    pub query: String,
    /// Provider output condensed to text.
    pub summary: String,
    /// Whether the search succeeded.
    pub status: ResearchStatus,
}

/// Output of a document workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResult {
    /// Outline from the first model call.
    pub outline: String,
    /// Draft from the second model call.
    pub draft: String,
    /// Research notes; empty when research did not run.
    pub research: Vec<ResearchItem>,
}
