use crate::types::{ResearchItem, ResearchStatus, WorkflowConfig, WorkflowKind};

/// Section structure the outline should follow for each kind.
fn structure_hint(kind: WorkflowKind) -> &'static str {
    match kind {
        WorkflowKind::Report => {
            "executive summary, background, analysis, findings, recommendations, references"
        }
        WorkflowKind::PatentDisclosure => {
            "technical field, background art, problem solved, technical solution, \
             embodiments, beneficial effects, claims draft"
        }
        WorkflowKind::Plan => {
            "objectives, scope, milestones and timeline, resources and budget, risks, \
             success metrics"
        }
        WorkflowKind::ProjectProposal => {
            "motivation, objectives, approach, work packages, expected outcomes, \
             budget, team, risks"
        }
    }
}

/// Phrase appended to the topic to form the research query.
pub fn research_focus(kind: WorkflowKind) -> &'static str {
    match kind {
        WorkflowKind::Report => "latest data, statistics and industry developments",
        WorkflowKind::PatentDisclosure => "prior art, related patents and technical state of the art",
        WorkflowKind::Plan => "best practices, benchmarks and implementation case studies",
        WorkflowKind::ProjectProposal => "funding context, comparable projects and expected impact",
    }
}

/// The single search query issued by the research step.
pub fn research_query(config: &WorkflowConfig) -> String {
    format!("{} {}", config.topic(), research_focus(config.workflow()))
}

fn context_lines(config: &WorkflowConfig) -> String {
    let mut lines = vec![
        format!("Document type: {}", config.workflow().label()),
        format!("Topic: {}", config.topic()),
    ];
    if let Some(audience) = config.audience() {
        lines.push(format!("Audience: {audience}"));
    }
    if let Some(instructions) = config.instructions() {
        lines.push(format!("Additional instructions: {instructions}"));
    }
    lines.push(format!("Output language: {}", config.language()));
    lines.join("\n")
}

/// Prompt for the outline call.
pub fn outline_prompt(config: &WorkflowConfig) -> String {
    format!(
        "You are a senior writer preparing a {label}. Produce a detailed, hierarchical outline.\n\n\
         {context}\n\n\
         Cover these sections where relevant: {sections}.\n\
         Return only the outline as a numbered list with short notes under each heading.",
        label = config.workflow().label(),
        context = context_lines(config),
        sections = structure_hint(config.workflow()),
    )
}

/// Prompt for the draft call.
pub fn draft_prompt(config: &WorkflowConfig, outline: &str, research: &[ResearchItem]) -> String {
    let mut prompt = format!(
        "You are a senior writer. Write the complete {} following the outline below.\n\n",
        config.workflow().label()
    );
    prompt.push_str(&context_lines(config));
    prompt.push_str(&format!("\n\nOutline:\n{outline}\n"));

    if !research.is_empty() {
        prompt.push_str("\nResearch notes:\n");
        for item in research {
            let note = match item.status {
                ResearchStatus::Ok => format!("- Query: {}\n{}\n", item.query, item.summary),
                ResearchStatus::Failed => format!(
                    "- Query: {} (unavailable: {}; rely on general knowledge)\n",
                    item.query, item.summary
                ),
            };
            prompt.push_str(&note);
        }
    }

    prompt.push_str(
        "\nWrite well-structured prose under each outline heading. \
         Cite research notes where they support a statement and do not invent sources.",
    );
    prompt
}
