//! Agent-facing skills for the TianGong workspace.
//!
//! Each capability is a [`Skill`](tiangong_skills::Skill) that agents call
//! by name:
//!
//! - `run_shell`: [`ShellSkill`]
//! - `run_python`: [`PythonSkill`]
//! - `tavily_search`: [`ResearchSkill`]
//! - `generate_document`: [`DocumentSkill`]
//!
//! [`register_workspace_tools`] registers the full set.

/// Document generation skill.
pub mod document;
/// Python execution skill.
pub mod python;
/// Internet research skill.
pub mod research;
/// Shell command execution skill.
pub mod shell;

pub use document::DocumentSkill;
pub use python::PythonSkill;
pub use research::ResearchSkill;
pub use shell::ShellSkill;

use std::sync::Arc;
use tiangong_llm::LanguageModel;
use tiangong_research::ResearchProvider;
use tiangong_skills::SkillRegistry;
use tiangong_workflows::DocumentWorkflow;

/// Register the shell and Python runtimes.
pub fn register_runtime_tools(registry: &mut SkillRegistry) {
    registry.register(Arc::new(ShellSkill::new()));
    registry.register(Arc::new(PythonSkill::new()));
}

/// Register every workspace skill.
///
/// `tavily_search` is registered only when `research` is given; the document
/// workflow uses the same provider for its research step.
pub fn register_workspace_tools(
    registry: &mut SkillRegistry,
    model: Arc<dyn LanguageModel>,
    research: Option<Arc<dyn ResearchProvider>>,
) {
    register_runtime_tools(registry);

    let mut workflow = DocumentWorkflow::new(model);
    if let Some(provider) = research {
        registry.register(Arc::new(ResearchSkill::new(provider.clone())));
        workflow = workflow.with_research(provider);
    }
    registry.register(Arc::new(DocumentSkill::new(workflow)));
}
