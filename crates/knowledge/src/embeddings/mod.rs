//! Embedding providers.
//!
//! Index build and query must use the same provider and model; the model
//! identifier is stored in the index manifest and checked on load.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{GeminiEmbeddingProvider, HashingProvider};
