//! Document workflow orchestration for the TianGong workspace.
//!
//! A run produces a document in three sequential steps:
//!
//! 1. **Outline**: one language-model call.
//! 2. **Research** (optional): one search through a [`ResearchProvider`].
//!    A failing provider is contained and recorded as a single failed
//!    [`ResearchItem`]; the run continues.
//! 3. **Draft**: a second language-model call built from the outline and the
//!    research notes.
//!
//! Model failures propagate unchanged.
//!
//! [`ResearchProvider`]: tiangong_research::ResearchProvider

/// Orchestration engine.
pub mod engine;
/// Prompt construction.
pub mod prompts;
/// Configuration and result types.
pub mod types;

pub use engine::{run_document_workflow, DocumentWorkflow, RESEARCH_FAILED_SUMMARY};
pub use types::{
    ResearchItem, ResearchStatus, WorkflowConfig, WorkflowConfigBuilder, WorkflowKind,
    WorkflowResult, DEFAULT_LANGUAGE,
};
