use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tiangong_core::{TiangongResult, ToolCall, ToolResult};

/// Metadata describing a skill's interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDescriptor {
    /// Name agents use to call the skill.
    pub name: String,
    /// What the skill does, shown to the model.
    pub description: String,
    /// JSON schema of the call arguments.
    pub parameters_schema: serde_json::Value,
}

/// Trait that all workspace tools implement.
///
/// Expected failures (bad arguments, a flaky remote) are reported as
/// [`ToolResult::error`]; `Err` is reserved for failures of the skill itself.
#[async_trait]
pub trait Skill: Send + Sync {
    /// Static metadata of this skill.
    fn descriptor(&self) -> &SkillDescriptor;

    /// Execute one call.
    async fn execute(&self, call: ToolCall) -> TiangongResult<ToolResult>;
}
