#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests for the document workflow with scripted collaborators.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tiangong_core::TiangongError;
use tiangong_llm::ScriptedModel;
use tiangong_research::{ResearchProvider, SearchError, SearchOptions, SearchResponse};
use tiangong_workflows::{
    run_document_workflow, DocumentWorkflow, ResearchStatus, WorkflowConfig, WorkflowKind,
    WorkflowResult, RESEARCH_FAILED_SUMMARY,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Provider that always fails and counts how often it was asked.
#[derive(Default)]
struct FailingProvider {
    calls: AtomicU32,
}

#[async_trait]
impl ResearchProvider for FailingProvider {
    async fn search(
        &self,
        _query: &str,
        _options: Option<&SearchOptions>,
    ) -> Result<SearchResponse, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SearchError::Transport("network unavailable".into()))
    }
}

/// Provider that answers every query with a fixed result.
#[derive(Default)]
struct StaticProvider {
    calls: AtomicU32,
}

#[async_trait]
impl ResearchProvider for StaticProvider {
    async fn search(
        &self,
        query: &str,
        _options: Option<&SearchOptions>,
    ) -> Result<SearchResponse, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SearchResponse::new(
            query,
            serde_json::json!({"results": [{"title": "Recycling rates 2024", "content": "42%"}]}),
        ))
    }
}

fn config(include_research: bool) -> WorkflowConfig {
    WorkflowConfig::builder(WorkflowKind::Report, "测试主题")
        .language("zh")
        .include_research(include_research)
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// 1. Research disabled or absent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn workflow_without_research() {
    let model = ScriptedModel::new(["OUTLINE", "DRAFT"]);
    let result = run_document_workflow(&config(false), &model, None).await.unwrap();

    assert_eq!(result.outline, "OUTLINE");
    assert_eq!(result.draft, "DRAFT");
    assert!(result.research.is_empty());
}

#[tokio::test]
async fn research_disabled_never_calls_provider() {
    let model = ScriptedModel::new(["OUTLINE", "DRAFT"]);
    let provider = StaticProvider::default();
    let result = run_document_workflow(&config(false), &model, Some(&provider))
        .await
        .unwrap();

    assert!(result.research.is_empty());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn research_requested_without_provider_yields_empty_research() {
    let model = ScriptedModel::new(["OUTLINE", "DRAFT"]);
    let result = run_document_workflow(&config(true), &model, None).await.unwrap();
    assert!(result.research.is_empty());
    assert_eq!(result.draft, "DRAFT");
}

// ---------------------------------------------------------------------------
// 2. Research failure containment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn workflow_handles_research_failure() {
    let model = ScriptedModel::new(["OUTLINE", "DRAFT"]);
    let provider = FailingProvider::default();
    let result = run_document_workflow(&config(true), &model, Some(&provider))
        .await
        .unwrap();

    assert_eq!(result.outline, "OUTLINE");
    assert_eq!(result.draft, "DRAFT");
    assert_eq!(result.research.len(), 1);
    assert_eq!(result.research[0].summary, RESEARCH_FAILED_SUMMARY);
    assert_eq!(result.research[0].summary, "Research step failed");
    assert_eq!(result.research[0].status, ResearchStatus::Failed);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["research"][0]["status"], "failed");
}

#[tokio::test]
async fn failure_containment_holds_for_every_kind() {
    for kind in WorkflowKind::ALL {
        let model = ScriptedModel::new(["O", "D"]);
        let provider = FailingProvider::default();
        let config = WorkflowConfig::builder(kind, "Hydrogen storage").build().unwrap();
        let result = run_document_workflow(&config, &model, Some(&provider))
            .await
            .unwrap();
        assert_eq!(result.research.len(), 1, "kind {kind}");
        assert_eq!(result.research[0].summary, RESEARCH_FAILED_SUMMARY);
        assert_eq!(model.call_count(), 2);
    }
}

// ---------------------------------------------------------------------------
// 3. Successful research
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_research_feeds_the_draft() {
    let model = ScriptedModel::new(["OUTLINE", "DRAFT"]);
    let provider = StaticProvider::default();
    let result = run_document_workflow(&config(true), &model, Some(&provider))
        .await
        .unwrap();

    assert_eq!(result.research.len(), 1);
    let item = &result.research[0];
    assert_eq!(item.status, ResearchStatus::Ok);
    assert!(!item.summary.is_empty());
    assert!(item.summary.contains("Recycling rates 2024"));
    assert!(item.query.contains("测试主题"));

    let prompts = model.prompts();
    assert!(prompts[1].contains("Recycling rates 2024"));
}

// ---------------------------------------------------------------------------
// 4. Model calls and error propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exactly_two_model_calls_outline_first() {
    let model = ScriptedModel::new(["OUTLINE", "DRAFT"]);
    let provider = StaticProvider::default();
    run_document_workflow(&config(true), &model, Some(&provider))
        .await
        .unwrap();

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("outline"));
    assert!(prompts[0].contains("测试主题"));
    assert!(!prompts[0].contains("OUTLINE"));
    assert!(prompts[1].contains("OUTLINE"));
}

#[tokio::test]
async fn model_failure_on_outline_propagates_before_research() {
    let model = ScriptedModel::default();
    model.push_failure("upstream 500");
    let provider = StaticProvider::default();

    let err = run_document_workflow(&config(true), &model, Some(&provider))
        .await
        .unwrap_err();
    assert!(matches!(err, TiangongError::Model(ref m) if m == "upstream 500"));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn model_failure_on_draft_propagates() {
    let model = ScriptedModel::new(["OUTLINE"]);
    model.push_failure("context length exceeded");
    let provider = FailingProvider::default();

    let err = run_document_workflow(&config(true), &model, Some(&provider))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("context length exceeded"));
}

// ---------------------------------------------------------------------------
// 5. Validation before collaborators
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_kind_is_rejected_before_any_collaborator() {
    let model = ScriptedModel::new(["OUTLINE", "DRAFT"]);
    let provider = StaticProvider::default();

    let built = "invalid-kind"
        .parse::<WorkflowKind>()
        .and_then(|kind| WorkflowConfig::builder(kind, "测试主题").build());
    assert!(matches!(built, Err(TiangongError::UnsupportedWorkflow(_))));

    assert_eq!(model.call_count(), 0);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn blank_topic_is_invalid_config() {
    let err = WorkflowConfig::builder(WorkflowKind::Plan, "   ")
        .build()
        .unwrap_err();
    assert!(matches!(err, TiangongError::InvalidConfig(_)));
}

// ---------------------------------------------------------------------------
// 6. Determinism and serialization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn runs_are_deterministic_with_deterministic_collaborators() {
    let mut results = Vec::new();
    let mut prompt_sets = Vec::new();
    for _ in 0..2 {
        let model = ScriptedModel::new(["OUTLINE", "DRAFT"]);
        let provider = StaticProvider::default();
        results.push(
            run_document_workflow(&config(true), &model, Some(&provider))
                .await
                .unwrap(),
        );
        prompt_sets.push(model.prompts());
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(prompt_sets[0], prompt_sets[1]);
}

#[tokio::test]
async fn result_round_trips_through_json() {
    let model = ScriptedModel::new(["OUTLINE", "DRAFT"]);
    let provider = FailingProvider::default();
    let result = run_document_workflow(&config(true), &model, Some(&provider))
        .await
        .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let mut keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["draft", "outline", "research"]);

    let back: WorkflowResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

// ---------------------------------------------------------------------------
// 7. Bound collaborators
// ---------------------------------------------------------------------------

#[tokio::test]
async fn document_workflow_binds_collaborators() {
    let model = Arc::new(ScriptedModel::new(["OUTLINE", "DRAFT", "OUTLINE 2", "DRAFT 2"]));
    let provider = Arc::new(FailingProvider::default());
    let workflow = DocumentWorkflow::new(model.clone()).with_research(provider.clone());
    assert!(workflow.has_research());

    let first = workflow.run(&config(true)).await.unwrap();
    let second = workflow.run(&config(false)).await.unwrap();

    assert_eq!(first.research[0].status, ResearchStatus::Failed);
    assert_eq!(second.outline, "OUTLINE 2");
    assert!(second.research.is_empty());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(model.call_count(), 4);
}
