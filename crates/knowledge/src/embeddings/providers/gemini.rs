//! Gemini embedding provider.
//!
//! Uses the `batchEmbedContents` method of the Generative Language API.
//! Chunks are embedded with task type `RETRIEVAL_DOCUMENT` and queries with
//! `RETRIEVAL_QUERY`, both against the same model.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::provider::EmbeddingProvider;
use docqa_core::{AppError, AppResult, Credential, ServiceErrorKind, ServiceFailure};
use docqa_llm::http::{self, API_KEY_HEADER, GOOGLE_API_BASE_URL};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy)]
enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

impl TaskType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            Self::RetrievalQuery => "RETRIEVAL_QUERY",
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: EmbedContent<'a>,
    task_type: &'static str,
}

#[derive(Debug, Serialize)]
struct EmbedContent<'a> {
    parts: Vec<EmbedPart<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

/// Gemini embedding provider.
#[derive(Debug)]
pub struct GeminiEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    /// Resource name, e.g. `models/embedding-001`
    model: String,
    dimensions: usize,
    batch_size: usize,
    credential: Credential,
}

impl GeminiEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig, credential: Credential) -> AppResult<Self> {
        let base_url = config
            .endpoint
            .as_deref()
            .unwrap_or(GOOGLE_API_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: http::build_client(config.timeout())?,
            base_url,
            model: http::model_path(&config.model),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
            credential,
        })
    }

    #[instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    async fn embed_with_task(
        &self,
        texts: &[String],
        task_type: TaskType,
    ) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.request_batch(batch, task_type).await?);
        }

        Ok(embeddings)
    }

    async fn request_batch(
        &self,
        texts: &[String],
        task_type: TaskType,
    ) -> AppResult<Vec<Vec<f32>>> {
        let url = format!("{}/{}:batchEmbedContents", self.base_url, self.model);
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: &self.model,
                    content: EmbedContent {
                        parts: vec![EmbedPart { text }],
                    },
                    task_type: task_type.as_str(),
                })
                .collect(),
        };

        debug!("Requesting {} embeddings ({})", texts.len(), task_type.as_str());

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::EmbeddingService(http::classify_transport_error(&e)))?;

        let response = http::check_status(response)
            .await
            .map_err(AppError::EmbeddingService)?;

        let body: BatchEmbedResponse = response.json().await.map_err(|e| {
            AppError::EmbeddingService(ServiceFailure::new(
                ServiceErrorKind::MalformedResponse,
                format!("Failed to parse embedding response: {}", e),
            ))
        })?;

        if body.embeddings.len() != texts.len() {
            return Err(malformed(format!(
                "expected {} embeddings, received {}",
                texts.len(),
                body.embeddings.len()
            )));
        }

        body.embeddings
            .into_iter()
            .map(|embedding| {
                if embedding.values.len() == self.dimensions {
                    Ok(embedding.values)
                } else {
                    Err(malformed(format!(
                        "expected {} dimensions, received {}",
                        self.dimensions,
                        embedding.values.len()
                    )))
                }
            })
            .collect()
    }
}

fn malformed(message: String) -> AppError {
    AppError::EmbeddingService(ServiceFailure::new(
        ServiceErrorKind::MalformedResponse,
        message,
    ))
}

#[async_trait::async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed_with_task(texts, TaskType::RetrievalDocument).await
    }

    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self
            .embed_with_task(&[text.to_string()], TaskType::RetrievalQuery)
            .await?;
        results
            .pop()
            .ok_or_else(|| malformed("No embedding returned".to_string()))
    }
}
