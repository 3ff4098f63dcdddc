use crate::skill::{Skill, SkillDescriptor};
use std::collections::BTreeMap;
use std::sync::Arc;
use tiangong_core::{TiangongError, TiangongResult, ToolCall, ToolResult};
use tracing::{debug, info};

/// Central registry for all available skills.
pub struct SkillRegistry {
    skills: BTreeMap<String, Arc<dyn Skill>>,
}

impl SkillRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            skills: BTreeMap::new(),
        }
    }

    /// Register a skill, replacing any existing skill with the same name.
    pub fn register(&mut self, skill: Arc<dyn Skill>) {
        let name = skill.descriptor().name.clone();
        info!(skill = %name, "Registered skill");
        self.skills.insert(name, skill);
    }

    /// Look up a skill by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Skill>> {
        self.skills.get(name)
    }

    /// Descriptors of every registered skill, ordered by name.
    pub fn list_descriptors(&self) -> Vec<&SkillDescriptor> {
        self.skills.values().map(|s| s.descriptor()).collect()
    }

    /// Names of every registered skill, ordered.
    pub fn names(&self) -> Vec<&str> {
        self.skills.keys().map(String::as_str).collect()
    }

    /// Share the skills named in `names` (unknown names are skipped).
    pub fn subset(&self, names: &[&str]) -> Vec<Arc<dyn Skill>> {
        names
            .iter()
            .filter_map(|name| self.skills.get(*name).cloned())
            .collect()
    }

    /// Dispatch a tool call to the skill it names.
    pub async fn execute(&self, call: ToolCall) -> TiangongResult<ToolResult> {
        let skill = self
            .skills
            .get(&call.name)
            .ok_or_else(|| TiangongError::Skill(format!("Unknown skill: {}", call.name)))?;

        debug!(skill = %call.name, call_id = %call.id, "Executing skill");
        skill.execute(call).await
    }

    /// Number of registered skills.
    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    /// Whether no skill is registered.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}
