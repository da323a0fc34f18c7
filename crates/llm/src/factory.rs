//! LLM provider factory.
//!
//! Creates generative-model clients from configuration, injecting the
//! credential and request timeout.

use crate::client::LlmClient;
use crate::providers::GeminiClient;
use docqa_core::{AppError, AppResult, Credential};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini")
/// * `endpoint` - Optional custom endpoint URL
/// * `credential` - API key for the provider
/// * `timeout` - Upper bound for a single request
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or the HTTP client
/// cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    credential: &Credential,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "gemini" | "google" => {
            let mut client = GeminiClient::new(credential.clone(), timeout)?;
            if let Some(endpoint) = endpoint {
                client = client.with_base_url(endpoint);
            }
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown generation provider: {}",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::new("test-key").unwrap()
    }

    #[test]
    fn test_create_gemini_client() {
        let client = create_client("gemini", None, &credential(), Duration::from_secs(5)).unwrap();
        assert_eq!(client.provider_name(), "gemini");
    }

    #[test]
    fn test_create_gemini_with_custom_endpoint() {
        let client = create_client(
            "Gemini",
            Some("http://localhost:8080/v1beta"),
            &credential(),
            Duration::from_secs(5),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, &credential(), Duration::from_secs(5)) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown generation provider")),
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
