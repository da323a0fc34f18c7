//! Embedding provider implementations.

pub mod gemini;
pub mod hashing;

pub use gemini::GeminiEmbeddingProvider;
pub use hashing::HashingProvider;
