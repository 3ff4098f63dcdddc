//! Skills are the callable tools handed to agents; the catalogue is the
//! human- and agent-readable listing of what the workspace exposes.
//!
//! # Main types
//!
//! - [`Skill`]: Trait implemented by every executable tool.
//! - [`SkillRegistry`]: Name-indexed set of skills with dispatch.
//! - [`ToolCatalogue`]: Explicitly constructed catalogue of tool descriptors.

/// Descriptor catalogue used for discovery listings.
pub mod catalogue;
/// Name-indexed skill registry.
pub mod registry;
/// The `Skill` trait and its descriptor.
pub mod skill;

pub use catalogue::{ToolCatalogue, ToolCategory, ToolDescriptor};
pub use registry::SkillRegistry;
pub use skill::{Skill, SkillDescriptor};
