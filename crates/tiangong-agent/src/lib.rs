//! Workspace agent assembly for the TianGong workspace.
//!
//! [`WorkspaceAgentBuilder`] gathers the workspace tools (shell, Python,
//! internet research, document generation), a system prompt and the default
//! specialist sub-agents into a [`WorkspaceAgent`] that an external agent
//! runtime can drive. Planning and tool-calling loops are left to that
//! runtime.

/// Builder and assembled agent.
pub mod builder;
/// Default system prompt and sub-agent profiles.
pub mod profiles;

pub use builder::{WorkspaceAgent, WorkspaceAgentBuilder, AGENT_TEMPERATURE};
pub use profiles::{default_subagents, SubAgentProfile, DEFAULT_SYSTEM_PROMPT};
