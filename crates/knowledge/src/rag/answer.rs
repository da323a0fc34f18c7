//! Answer generation from retrieved chunks.

use crate::index::RetrievedChunk;
use docqa_core::config::GenerationSettings;
use docqa_core::{AppError, AppResult, ServiceErrorKind, ServiceFailure};
use docqa_llm::{LlmClient, LlmRequest};
use docqa_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;

/// Join retrieved chunk texts into one context block.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fill the persona prompt with the retrieved context and the question, send
/// it as one generation request and return the model's text unchanged.
pub async fn generate_answer(
    client: &dyn LlmClient,
    prompt: &PromptDefinition,
    settings: &GenerationSettings,
    chunks: &[RetrievedChunk],
    question: &str,
) -> AppResult<String> {
    let mut variables = HashMap::new();
    variables.insert("context".to_string(), build_context(chunks));
    variables.insert("question".to_string(), question.to_string());

    let built = build_prompt(prompt, variables)?;

    let mut request = LlmRequest::new(built.text, &settings.model);
    if let Some(temperature) = settings.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(max_tokens) = settings.max_output_tokens {
        request = request.with_max_tokens(max_tokens);
    }

    tracing::info!(
        "Generating answer with {} ({} context chunks)",
        settings.model,
        chunks.len()
    );

    let response = client.complete(&request).await.map_err(|e| match e {
        AppError::GenerationService(_) => e,
        other => AppError::GenerationService(ServiceFailure::new(
            ServiceErrorKind::Network,
            other.to_string(),
        )),
    })?;

    tracing::debug!(
        "Answer received ({} chars, {} tokens)",
        response.content.len(),
        response.usage.total_tokens
    );

    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{ScriptedClient, ScriptedReply};
    use docqa_prompt::{load_prompt, DEFAULT_ANSWER_PROMPT_ID};
    use std::path::Path;

    fn hit(text: &str, position: usize) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            distance: position as f32,
            position,
        }
    }

    fn persona() -> PromptDefinition {
        load_prompt(Path::new("/nonexistent-workspace"), DEFAULT_ANSWER_PROMPT_ID).unwrap()
    }

    #[test]
    fn test_context_is_newline_joined() {
        let context = build_context(&[hit("first", 0), hit("second", 1)]);
        assert_eq!(context, "first\nsecond");
    }

    #[tokio::test]
    async fn test_prompt_carries_context_and_question() {
        let client = ScriptedClient::new(ScriptedReply::Text("Within 48 hours.".to_string()));
        let answer = generate_answer(
            &client,
            &persona(),
            &GenerationSettings::default(),
            &[hit("Invoices must be approved within 48 hours.", 0)],
            "How long do I have to approve an invoice?",
        )
        .await
        .unwrap();

        assert_eq!(answer, "Within 48 hours.");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gemini-2.5-pro");
        assert!(requests[0]
            .prompt
            .contains("Invoices must be approved within 48 hours."));
        assert!(requests[0]
            .prompt
            .contains("How long do I have to approve an invoice?"));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let client = ScriptedClient::new(ScriptedReply::Fail(ServiceErrorKind::Quota));
        let result = generate_answer(
            &client,
            &persona(),
            &GenerationSettings::default(),
            &[hit("x", 0)],
            "q",
        )
        .await;

        match result {
            Err(AppError::GenerationService(failure)) => {
                assert_eq!(failure.kind, ServiceErrorKind::Quota)
            }
            other => panic!("Expected generation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_settings_are_forwarded() {
        let client = ScriptedClient::new(ScriptedReply::Text("ok".to_string()));
        let settings = GenerationSettings {
            temperature: Some(0.2),
            max_output_tokens: Some(256),
            ..GenerationSettings::default()
        };

        generate_answer(&client, &persona(), &settings, &[hit("x", 0)], "q")
            .await
            .unwrap();

        let request = &client.requests()[0];
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(256));
    }
}
