//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::providers::{GeminiEmbeddingProvider, HashingProvider};
use docqa_core::{AppError, AppResult, Credential, ServiceErrorKind, ServiceFailure};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "gemini", "hashing")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Embed document chunks for storage in an index.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Embed a search query.
    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results.pop().ok_or_else(|| {
            AppError::EmbeddingService(ServiceFailure::new(
                ServiceErrorKind::MalformedResponse,
                "No embedding returned",
            ))
        })
    }
}

/// Create an embedding provider based on configuration.
///
/// The Gemini provider requires a credential; the hashing provider runs
/// offline and ignores it.
pub fn create_provider(
    config: &EmbeddingConfig,
    credential: Option<&Credential>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "gemini" => {
            let credential = credential.ok_or_else(|| {
                AppError::Validation("An API key is required for Gemini embeddings".to_string())
            })?;
            let provider = GeminiEmbeddingProvider::new(config, credential.clone())?;
            Ok(Arc::new(provider))
        }

        "hashing" => Ok(Arc::new(HashingProvider::new(config.dimensions))),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: gemini, hashing",
            config.provider
        ))),
    }
}
