use async_trait::async_trait;
use serde::Deserialize;
use tiangong_core::{TiangongError, TiangongResult, ToolCall, ToolResult};
use tiangong_skills::skill::{Skill, SkillDescriptor};
use tiangong_workflows::{DocumentWorkflow, WorkflowConfig, WorkflowKind, DEFAULT_LANGUAGE};
use tracing::warn;

/// Document generation skill (`generate_document`).
///
/// Invalid arguments come back as `{"status": "error", "message": ...}`;
/// a successful run as `{"status": "success", "data": <WorkflowResult>}`.
/// Language-model failures propagate as `Err`.
pub struct DocumentSkill {
    descriptor: SkillDescriptor,
    workflow: DocumentWorkflow,
}

#[derive(Debug, Deserialize)]
struct DocumentArgs {
    workflow: String,
    topic: String,
    #[serde(default)]
    instructions: Option<String>,
    #[serde(default)]
    audience: Option<String>,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default)]
    skip_research: bool,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl DocumentArgs {
    fn into_config(self) -> TiangongResult<WorkflowConfig> {
        let kind: WorkflowKind = self.workflow.parse()?;
        let mut builder = WorkflowConfig::builder(kind, self.topic)
            .language(self.language)
            .include_research(!self.skip_research);
        if let Some(instructions) = self.instructions {
            builder = builder.instructions(instructions);
        }
        if let Some(audience) = self.audience {
            builder = builder.audience(audience);
        }
        builder.build()
    }
}

impl DocumentSkill {
    /// Skill running `workflow`.
    pub fn new(workflow: DocumentWorkflow) -> Self {
        let kinds: Vec<&str> = WorkflowKind::ALL.iter().map(|k| k.as_str()).collect();
        Self {
            descriptor: SkillDescriptor {
                name: "generate_document".to_string(),
                description: "Generate a structured document (outline, optional research, draft)."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "workflow": {"type": "string", "enum": kinds},
                        "topic": {"type": "string"},
                        "instructions": {"type": "string"},
                        "audience": {"type": "string"},
                        "language": {"type": "string", "default": DEFAULT_LANGUAGE},
                        "skip_research": {"type": "boolean", "default": false}
                    },
                    "required": ["workflow", "topic"]
                }),
            },
            workflow,
        }
    }
}

fn error_result(call_id: &str, message: String) -> ToolResult {
    let body = serde_json::json!({"status": "error", "message": message});
    ToolResult::error(call_id, body.to_string())
}

#[async_trait]
impl Skill for DocumentSkill {
    fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> TiangongResult<ToolResult> {
        let args: DocumentArgs = match serde_json::from_value(call.arguments.clone()) {
            Ok(args) => args,
            Err(e) => return Ok(error_result(&call.id, format!("Invalid arguments: {e}"))),
        };

        let config = match args.into_config() {
            Ok(config) => config,
            Err(TiangongError::UnsupportedWorkflow(kind)) => {
                warn!(workflow = %kind, "Rejected unsupported workflow");
                return Ok(error_result(
                    &call.id,
                    format!("Unsupported workflow '{kind}'."),
                ));
            }
            Err(e) => return Ok(error_result(&call.id, e.to_string())),
        };

        let result = self.workflow.run(&config).await?;
        let body = serde_json::json!({"status": "success", "data": result});
        Ok(ToolResult::success(&call.id, body.to_string()))
    }
}
