//! Generative model provider implementations.

pub mod gemini;

pub use gemini::GeminiClient;
