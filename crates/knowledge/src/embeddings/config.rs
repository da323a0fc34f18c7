//! Embedding configuration.

use docqa_core::config::EmbeddingSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings used to construct an embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "gemini" or "hashing"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Custom API endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Maximum number of texts per remote request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Upper bound for a single remote request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_batch_size() -> usize {
    100
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::from(&EmbeddingSettings::default())
    }
}

impl From<&EmbeddingSettings> for EmbeddingConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
            dimensions: settings.dimensions,
            batch_size: settings.batch_size.max(1),
            timeout_secs: settings.timeout_secs,
        }
    }
}

impl EmbeddingConfig {
    /// Offline hashing configuration, used by tests and demos.
    pub fn hashing(dimensions: usize) -> Self {
        Self {
            provider: "hashing".to_string(),
            model: super::providers::hashing::HASHING_MODEL.to_string(),
            dimensions,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
