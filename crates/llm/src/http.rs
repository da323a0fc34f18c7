//! HTTP helpers shared by the Google API clients.
//!
//! Translates `reqwest` failures and non-success responses into
//! [`ServiceFailure`] values so callers can see whether a retry makes sense.

use docqa_core::{AppError, AppResult, ServiceErrorKind, ServiceFailure};
use std::time::Duration;

/// Base URL of the Google Generative Language API.
pub const GOOGLE_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Build an HTTP client with a bounded request timeout.
pub fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Resource path for a model, accepting both `gemini-2.5-pro` and
/// `models/gemini-2.5-pro`.
pub fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Classify an error raised while sending a request or reading its body.
pub fn classify_transport_error(err: &reqwest::Error) -> ServiceFailure {
    let kind = if err.is_timeout() {
        ServiceErrorKind::Timeout
    } else if err.is_decode() {
        ServiceErrorKind::MalformedResponse
    } else {
        ServiceErrorKind::Network
    };

    ServiceFailure::new(kind, err.to_string())
}

/// Return the response if it succeeded, otherwise its classified failure.
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ServiceFailure::from_status(status.as_u16(), &body))
}
