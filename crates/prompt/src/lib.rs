//! Prompt system for DocQA.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions (built-in, overridable per workspace)
//! - Handlebars template rendering
//! - Persona tone/style injection

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{load_prompt, DEFAULT_ANSWER_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptOutputSpec};
