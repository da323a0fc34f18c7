//! Shared test fixtures and fakes.


use crate::embeddings::{EmbeddingProvider, HashingProvider};
use crate::session::ProviderFactory;
use docqa_core::{AppError, AppResult, Credential, ServiceErrorKind, ServiceFailure};
use docqa_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Build a DOCX file with one paragraph per entry.
pub(crate) fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let mut docx = docx_rs::Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(
            docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*text)),
        );
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    cursor.into_inner()
}

/// Build a PDF with one Helvetica text line per page.
pub(crate) fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let page_count = pages.len();
    let font_id = 3;
    let first_page_id = 4;

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            (0..page_count)
                .map(|i| format!("{} 0 R", first_page_id + 2 * i))
                .collect::<Vec<_>>()
                .join(" "),
            page_count
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (i, text) in pages.iter().enumerate() {
        let content_id = first_page_id + 2 * i + 1;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
            font_id, content_id
        ));
        let stream = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

/// Hashing embedder that counts remote-style calls.
#[derive(Debug)]
pub(crate) struct CountingEmbedder {
    inner: HashingProvider,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub(crate) fn new(dimensions: usize) -> Self {
        Self {
            inner: HashingProvider::new(dimensions),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn provider_name(&self) -> &str {
        "counting"
    }

    fn model_name(&self) -> &str {
        "counting-v1"
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}

/// Embedder whose service is always unavailable.
#[derive(Debug)]
pub(crate) struct FailingEmbedder {
    dimensions: usize,
}

impl FailingEmbedder {
    pub(crate) fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        crate::embeddings::providers::hashing::HASHING_MODEL
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::EmbeddingService(ServiceFailure::new(
            ServiceErrorKind::Unavailable,
            "HTTP 503: service unavailable",
        )))
    }
}

#[derive(Debug, Clone)]
pub(crate) enum ScriptedReply {
    Text(String),
    Fail(ServiceErrorKind),
}

/// Generation client returning a fixed reply and recording requests.
#[derive(Debug)]
pub(crate) struct ScriptedClient {
    reply: ScriptedReply,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new(reply: ScriptedReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            ScriptedReply::Text(text) => Ok(LlmResponse {
                content: text.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 5),
            }),
            ScriptedReply::Fail(kind) => Err(AppError::GenerationService(ServiceFailure::new(
                *kind,
                "scripted failure",
            ))),
        }
    }
}

/// Provider factory handing out fixed fakes and counting constructions.
pub(crate) struct FakeProviders {
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<ScriptedClient>,
    embedders_built: AtomicUsize,
    generators_built: AtomicUsize,
}

impl FakeProviders {
    pub(crate) fn new(embedder: Arc<dyn EmbeddingProvider>, reply: ScriptedReply) -> Arc<Self> {
        Arc::new(Self {
            embedder,
            generator: Arc::new(ScriptedClient::new(reply)),
            embedders_built: AtomicUsize::new(0),
            generators_built: AtomicUsize::new(0),
        })
    }

    /// Offline hashing embeddings and a fixed answer.
    pub(crate) fn answering(answer: &str) -> Arc<Self> {
        Self::new(
            Arc::new(HashingProvider::new(64)),
            ScriptedReply::Text(answer.to_string()),
        )
    }

    pub(crate) fn failing_embeddings() -> Arc<Self> {
        Self::new(
            Arc::new(FailingEmbedder::new(64)),
            ScriptedReply::Text("unused".to_string()),
        )
    }

    pub(crate) fn embedders_built(&self) -> usize {
        self.embedders_built.load(Ordering::SeqCst)
    }

    pub(crate) fn generators_built(&self) -> usize {
        self.generators_built.load(Ordering::SeqCst)
    }

    pub(crate) fn generation_requests(&self) -> Vec<LlmRequest> {
        self.generator.requests()
    }
}

impl ProviderFactory for FakeProviders {
    fn embedder(&self, _credential: &Credential) -> AppResult<Arc<dyn EmbeddingProvider>> {
        self.embedders_built.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.embedder))
    }

    fn generator(&self, _credential: &Credential) -> AppResult<Arc<dyn LlmClient>> {
        self.generators_built.fetch_add(1, Ordering::SeqCst);
        let generator: Arc<dyn LlmClient> = self.generator.clone();
        Ok(generator)
    }
}
