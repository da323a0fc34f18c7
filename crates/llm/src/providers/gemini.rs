//! Gemini LLM provider implementation.
//!
//! This module provides integration with Google's Generative Language API.
//! API: https://ai.google.dev/api/generate-content

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::http::{self, API_KEY_HEADER, GOOGLE_API_BASE_URL};
use docqa_core::{AppError, AppResult, Credential, ServiceErrorKind, ServiceFailure};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini `generateContent` request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini `generateContent` response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Gemini LLM client.
pub struct GeminiClient {
    /// Base URL for the Generative Language API
    base_url: String,

    /// API key sent with every request
    credential: Credential,

    /// HTTP client
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client against the public endpoint.
    pub fn new(credential: Credential, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            base_url: GOOGLE_API_BASE_URL.to_string(),
            credential,
            client: http::build_client(timeout)?,
        })
    }

    /// Point the client at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert LlmRequest to Gemini format.
    fn to_gemini_request(&self, request: &LlmRequest) -> GenerateContentRequest {
        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config,
        }
    }

    /// Convert Gemini response to LlmResponse.
    fn convert_response(
        &self,
        request: &LlmRequest,
        response: GenerateContentResponse,
    ) -> AppResult<LlmResponse> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            AppError::GenerationService(ServiceFailure::new(
                ServiceErrorKind::MalformedResponse,
                "Gemini returned no candidates",
            ))
        })?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::GenerationService(ServiceFailure::new(
                ServiceErrorKind::MalformedResponse,
                format!(
                    "Gemini returned no text (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            )));
        }

        let usage = response
            .usage_metadata
            .map(|u| LlmUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(LlmResponse {
            content: text,
            model: response
                .model_version
                .unwrap_or_else(|| request.model.clone()),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Gemini ({})", request.model);
        tracing::debug!("Prompt length: {} chars", request.prompt.len());

        let gemini_request = self.to_gemini_request(request);
        let url = format!(
            "{}/{}:generateContent",
            self.base_url,
            http::model_path(&request.model)
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.credential.expose())
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| AppError::GenerationService(http::classify_transport_error(&e)))?;

        let response = http::check_status(response)
            .await
            .map_err(AppError::GenerationService)?;

        let gemini_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                AppError::GenerationService(ServiceFailure::new(
                    ServiceErrorKind::MalformedResponse,
                    format!("Failed to parse Gemini response: {}", e),
                ))
            })?;

        let response = self.convert_response(request, gemini_response)?;

        tracing::info!(
            "Received completion from Gemini ({} tokens)",
            response.usage.total_tokens
        );

        Ok(response)
    }
}
