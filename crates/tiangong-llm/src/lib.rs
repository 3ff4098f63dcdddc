//! Language-model access for the TianGong workspace.
//!
//! Everything that needs text generation depends on the [`LanguageModel`]
//! trait only. Concrete providers live in [`backends`]; [`ModelFactory`] picks
//! the model name for a purpose from the configured secrets.
//!
//! # Main types
//!
//! - [`LanguageModel`]: Single-operation text generation interface.
//! - [`LlmClient`]: Provider-dispatching client built from a [`ModelConfig`].
//! - [`ModelFactory`]: Builds clients from [`tiangong_core::Secrets`].
//! - [`ScriptedModel`]: Deterministic model replaying queued responses.

/// Provider backends (OpenAI-compatible, Claude).
pub mod backends;
/// Provider and model configuration.
pub mod config;
/// Purpose-based model selection.
pub mod factory;
/// The `LanguageModel` trait and `LlmClient`.
pub mod model;
/// Deterministic scripted model.
pub mod scripted;

pub use config::{LlmProvider, ModelConfig};
pub use factory::{ChatModelOptions, ModelFactory, ModelPurpose, FALLBACK_MODEL};
pub use model::{LanguageModel, LlmClient};
pub use scripted::ScriptedModel;
