//! Descriptor catalogue for discoverability.
//!
//! The catalogue lists the workflows and integrations the workspace exposes so
//! that agents (and humans) can inspect them without reading source code. It is
//! an ordinary value: build one with [`ToolCatalogue::workspace_default`] and
//! pass it to whatever needs discovery.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Broad grouping of catalogue entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    /// Multi-step document workflows.
    Workflow,
    /// Wrappers around external services.
    Integration,
    /// Autonomous agents.
    Agent,
    /// Local execution runtimes.
    Runtime,
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolCategory::Workflow => write!(f, "workflow"),
            ToolCategory::Integration => write!(f, "integration"),
            ToolCategory::Agent => write!(f, "agent"),
            ToolCategory::Runtime => write!(f, "runtime"),
        }
    }
}

impl std::str::FromStr for ToolCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "workflow" => Ok(ToolCategory::Workflow),
            "integration" => Ok(ToolCategory::Integration),
            "agent" => Ok(ToolCategory::Agent),
            "runtime" => Ok(ToolCategory::Runtime),
            other => Err(format!("unknown tool category '{other}'")),
        }
    }
}

/// Metadata describing an agent-facing workflow or integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Dotted name, e.g. `docs.report`.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Grouping.
    pub category: ToolCategory,
    /// Rust path of the function or type implementing it.
    pub entrypoint: String,
    /// Free-form search tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ToolDescriptor {
    /// Build a descriptor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: ToolCategory,
        entrypoint: impl Into<String>,
        tags: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            entrypoint: entrypoint.into(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// Name-indexed catalogue of [`ToolDescriptor`]s.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalogue {
    entries: BTreeMap<String, ToolDescriptor>,
}

impl ToolCatalogue {
    /// An empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalogue of everything this workspace ships.
    pub fn workspace_default() -> Self {
        let mut catalogue = Self::new();
        catalogue.register_many([
            ToolDescriptor::new(
                "docs.report",
                "Generate structured business or technical reports using the document workflow.",
                ToolCategory::Workflow,
                "tiangong_workflows::run_document_workflow",
                &["document", "report"],
            ),
            ToolDescriptor::new(
                "docs.patent_disclosure",
                "Draft patent disclosure sheets with optional web research.",
                ToolCategory::Workflow,
                "tiangong_workflows::run_document_workflow",
                &["document", "patent"],
            ),
            ToolDescriptor::new(
                "docs.plan",
                "Create project or execution plans with milestones and resource breakdowns.",
                ToolCategory::Workflow,
                "tiangong_workflows::run_document_workflow",
                &["document", "planning"],
            ),
            ToolDescriptor::new(
                "docs.project_proposal",
                "Prepare project proposal drafts optimised for internal reviews.",
                ToolCategory::Workflow,
                "tiangong_workflows::run_document_workflow",
                &["document", "proposal"],
            ),
            ToolDescriptor::new(
                "research.tavily",
                "Query the Tavily MCP service for live internet research.",
                ToolCategory::Integration,
                "tiangong_research::TavilySearchClient::search",
                &["research", "search"],
            ),
            ToolDescriptor::new(
                "agents.deep",
                "Workspace agent assembly (shell, Python, Tavily, document workflows).",
                ToolCategory::Agent,
                "tiangong_agent::WorkspaceAgentBuilder::build",
                &["agent", "planner"],
            ),
            ToolDescriptor::new(
                "runtime.shell",
                "Shell executor that returns structured stdout/stderr for commands.",
                ToolCategory::Runtime,
                "tiangong_builtins::ShellSkill",
                &["shell", "commands"],
            ),
            ToolDescriptor::new(
                "runtime.python",
                "Python executor for dynamic scripting with captured stdout/stderr.",
                ToolCategory::Runtime,
                "tiangong_builtins::PythonSkill",
                &["python", "scripting"],
            ),
        ]);
        catalogue
    }

    /// Register a descriptor, replacing any existing entry with the same name.
    pub fn register(&mut self, descriptor: ToolDescriptor) {
        self.entries.insert(descriptor.name.clone(), descriptor);
    }

    /// Register several descriptors.
    pub fn register_many(&mut self, descriptors: impl IntoIterator<Item = ToolDescriptor>) {
        for descriptor in descriptors {
            self.register(descriptor);
        }
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.entries.get(name)
    }

    /// All entries, ordered by name.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.entries.values().collect()
    }

    /// Entries of one category, ordered by name.
    pub fn by_category(&self, category: ToolCategory) -> Vec<&ToolDescriptor> {
        self.entries
            .values()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
