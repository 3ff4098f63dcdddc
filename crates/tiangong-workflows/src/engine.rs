use crate::prompts::{draft_prompt, outline_prompt, research_query};
use crate::types::{ResearchItem, ResearchStatus, WorkflowConfig, WorkflowResult};
use std::sync::Arc;
use std::time::Instant;
use tiangong_core::TiangongResult;
use tiangong_llm::LanguageModel;
use tiangong_research::{ResearchProvider, SearchResponse};
use tracing::{info, warn};

/// Summary recorded when the research provider fails.
pub const RESEARCH_FAILED_SUMMARY: &str = "Research step failed";

/// Longest research summary, in characters, passed to the draft prompt.
pub const MAX_SUMMARY_CHARS: usize = 4_000;

/// A document workflow with its collaborators bound.
///
/// Holds no per-run state; one instance can serve any number of runs.
#[derive(Clone)]
pub struct DocumentWorkflow {
    model: Arc<dyn LanguageModel>,
    research: Option<Arc<dyn ResearchProvider>>,
}

impl DocumentWorkflow {
    /// Workflow without a research provider.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            research: None,
        }
    }

    /// Attach a research provider.
    pub fn with_research(mut self, provider: Arc<dyn ResearchProvider>) -> Self {
        self.research = Some(provider);
        self
    }

    /// Whether a research provider is attached.
    pub fn has_research(&self) -> bool {
        self.research.is_some()
    }

    /// Run the workflow for `config`.
    pub async fn run(&self, config: &WorkflowConfig) -> TiangongResult<WorkflowResult> {
        run_document_workflow(config, self.model.as_ref(), self.research.as_deref()).await
    }
}

/// Run outline, optional research, and draft for `config`.
///
/// Calls `model` exactly twice, outline first. Research runs only when the
/// config asks for it and a provider is given; a provider error is recorded
/// as one failed [`ResearchItem`] and never fails the run. Model errors are
/// returned unchanged.
pub async fn run_document_workflow(
    config: &WorkflowConfig,
    model: &dyn LanguageModel,
    research: Option<&dyn ResearchProvider>,
) -> TiangongResult<WorkflowResult> {
    let start = Instant::now();
    info!(
        workflow = %config.workflow(),
        topic = %config.topic(),
        include_research = config.include_research(),
        "Document workflow: starting"
    );

    // Phase 1: outline
    let outline = model.generate(&outline_prompt(config)).await?;
    info!(outline_chars = outline.chars().count(), "Document workflow: outline ready");

    // Phase 2: research
    let research = match (config.include_research(), research) {
        (true, Some(provider)) => vec![research_step(config, provider).await],
        (true, None) => {
            warn!("Research requested but no research provider is configured; skipping");
            Vec::new()
        }
        (false, _) => Vec::new(),
    };

    // Phase 3: draft
    let draft = model
        .generate(&draft_prompt(config, &outline, &research))
        .await?;

    info!(
        duration_ms = start.elapsed().as_millis() as u64,
        research_items = research.len(),
        draft_chars = draft.chars().count(),
        "Document workflow: complete"
    );

    Ok(WorkflowResult {
        outline,
        draft,
        research,
    })
}

async fn research_step(config: &WorkflowConfig, provider: &dyn ResearchProvider) -> ResearchItem {
    let query = research_query(config);
    match provider.search(&query, None).await {
        Ok(response) => {
            info!(query = %query, "Document workflow: research complete");
            ResearchItem {
                summary: summarize(&response),
                query,
                status: ResearchStatus::Ok,
            }
        }
        Err(e) => {
            warn!(query = %query, error = %e, "Research step failed; continuing without research");
            ResearchItem {
                query,
                summary: RESEARCH_FAILED_SUMMARY.to_string(),
                status: ResearchStatus::Failed,
            }
        }
    }
}

/// Render a provider response as prompt text.
fn summarize(response: &SearchResponse) -> String {
    let text = match &response.result {
        serde_json::Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };
    truncate_chars(&text, MAX_SUMMARY_CHARS)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
