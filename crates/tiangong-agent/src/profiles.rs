use serde::{Deserialize, Serialize};

/// A specialist the main agent can hand work to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAgentProfile {
    /// Unique name, e.g. `research-specialist`.
    pub name: String,
    /// When to delegate to this sub-agent.
    pub description: String,
    /// Instructions for the sub-agent.
    pub system_prompt: String,
    /// Skill names the sub-agent may call.
    pub tools: Vec<String>,
}

/// Create the default sub-agents for the tools that are actually present.
///
/// Each argument is the registered skill name, or `None` when the tool was
/// left out.
pub fn default_subagents(
    document_tool: Option<&str>,
    research_tool: Option<&str>,
    python_tool: Option<&str>,
    shell_tool: Option<&str>,
) -> Vec<SubAgentProfile> {
    let mut profiles = Vec::new();
    if let Some(tool) = document_tool {
        profiles.push(document_specialist(tool));
    }
    if let Some(tool) = research_tool {
        profiles.push(research_specialist(tool));
    }
    let execution_tools: Vec<&str> = [python_tool, shell_tool].into_iter().flatten().collect();
    if !execution_tools.is_empty() {
        profiles.push(execution_specialist(&execution_tools));
    }
    profiles
}

fn document_specialist(tool: &str) -> SubAgentProfile {
    SubAgentProfile {
        name: "document-specialist".to_string(),
        description: "Generates reports, plans, patent disclosures, and proposals.".to_string(),
        system_prompt: DOCUMENT_PROMPT.to_string(),
        tools: vec![tool.to_string()],
    }
}

fn research_specialist(tool: &str) -> SubAgentProfile {
    SubAgentProfile {
        name: "research-specialist".to_string(),
        description: "Performs deep internet research via Tavily.".to_string(),
        system_prompt: RESEARCH_PROMPT.to_string(),
        tools: vec![tool.to_string()],
    }
}

fn execution_specialist(tools: &[&str]) -> SubAgentProfile {
    SubAgentProfile {
        name: "execution-specialist".to_string(),
        description: "Runs Python blocks and shell commands safely.".to_string(),
        system_prompt: EXECUTION_PROMPT.to_string(),
        tools: tools.iter().map(|t| (*t).to_string()).collect(),
    }
}

/// System prompt of the main workspace agent.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are the TianGong Workspace Agent.
- Plan multi-step tasks, maintain checklists, and use specialists when helpful.
- Use shell commands for filesystem inspection, package tooling, and running CLIs.
- Use Python for data processing, plotting, and quick experimentation.
- Use Tavily search to gather fresh context when required.
- Use the document generator to produce reports, plans, patent disclosures, and proposals.
- Prefer structured outputs that downstream agents can parse easily.
";

const DOCUMENT_PROMPT: &str = "\
You are a documentation specialist. Always return polished markdown drafts.";

const RESEARCH_PROMPT: &str = "\
You gather current data via Tavily search and summarise findings.";

const EXECUTION_PROMPT: &str = "\
Execute code snippets and commands. Return stdout/stderr and summarise key results.";
