//! Session controller: the "process documents" and "ask question" actions.
//!
//! All mutable state lives in a caller-owned [`Session`]; the persisted index
//! is reached through an [`IndexStore`]. Input problems (no documents, no
//! credential, no index yet) come back as warnings with the action left in
//! `Idle`. Remote service failures are returned as errors.

use crate::chunker::chunk_text;
use crate::embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
use crate::extract::{extract_documents, ExtractionOutcome};
use crate::index::{IndexStore, RetrievedChunk, NOT_READY_MESSAGE};
use crate::indexer::build_index;
use crate::rag::generate_answer;
use crate::retriever::search_index;
use crate::types::{ChatMessage, ChatRole, IndexStats, Notice, UploadedDocument};
use docqa_core::config::{ChunkingSettings, GenerationSettings, RetrievalSettings};
use docqa_core::{AppConfig, AppError, AppResult, Credential};
use docqa_llm::LlmClient;
use docqa_prompt::{load_prompt, PromptDefinition, DEFAULT_ANSWER_PROMPT_ID};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Caller-owned conversation state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    messages: Vec<ChatMessage>,
    last_index: Option<IndexStats>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chronological message log.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Statistics of the index built during this session, if any.
    pub fn last_index(&self) -> Option<&IndexStats> {
        self.last_index.as_ref()
    }

    fn append(&mut self, role: ChatRole, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }
}

/// States of the process action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessState {
    Idle,
    Validating,
    Extracting,
    Chunking,
    Indexing,
    Done,
    Failed,
}

/// States of the ask action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AskState {
    Idle,
    CheckIndex,
    Retrieving,
    Generating,
    Appended,
    Failed,
}

/// Result of a process action that did not hit a remote failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub state: ProcessState,
    pub transitions: Vec<ProcessState>,
    pub notices: Vec<Notice>,
    pub stats: Option<IndexStats>,
}

/// Result of an ask action that did not hit a remote failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskOutcome {
    pub state: AskState,
    pub transitions: Vec<AskState>,
    pub notices: Vec<Notice>,
    pub answer: Option<String>,
    pub context: Vec<RetrievedChunk>,
}

/// Builds the remote clients for a credential.
pub trait ProviderFactory: Send + Sync {
    fn embedder(&self, credential: &Credential) -> AppResult<Arc<dyn EmbeddingProvider>>;

    fn generator(&self, credential: &Credential) -> AppResult<Arc<dyn LlmClient>>;
}

/// Providers built from the application configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredProviders {
    embedding: EmbeddingConfig,
    generation: GenerationSettings,
}

impl ConfiguredProviders {
    pub fn new(embedding: EmbeddingConfig, generation: GenerationSettings) -> Self {
        Self {
            embedding,
            generation,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            EmbeddingConfig::from(&config.embedding),
            config.generation.clone(),
        )
    }
}

impl ProviderFactory for ConfiguredProviders {
    fn embedder(&self, credential: &Credential) -> AppResult<Arc<dyn EmbeddingProvider>> {
        create_provider(&self.embedding, Some(credential))
    }

    fn generator(&self, credential: &Credential) -> AppResult<Arc<dyn LlmClient>> {
        docqa_llm::create_client(
            &self.generation.provider,
            self.generation.endpoint.as_deref(),
            credential,
            Duration::from_secs(self.generation.timeout_secs),
        )
    }
}

/// Document question-answering over a single persisted index.
pub struct DocumentChat {
    store: IndexStore,
    providers: Arc<dyn ProviderFactory>,
    prompt: PromptDefinition,
    chunking: ChunkingSettings,
    retrieval: RetrievalSettings,
    generation: GenerationSettings,
    embedding_batch_size: usize,
}

impl DocumentChat {
    pub fn new(
        store: IndexStore,
        providers: Arc<dyn ProviderFactory>,
        prompt: PromptDefinition,
    ) -> Self {
        Self {
            store,
            providers,
            prompt,
            chunking: ChunkingSettings::default(),
            retrieval: RetrievalSettings::default(),
            generation: GenerationSettings::default(),
            embedding_batch_size: EmbeddingConfig::default().batch_size,
        }
    }

    /// Wire everything from the application configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let store = IndexStore::for_workspace(&config.workspace, &config.retrieval.index_name);
        let prompt = load_prompt(&config.workspace, DEFAULT_ANSWER_PROMPT_ID)?;
        let providers = Arc::new(ConfiguredProviders::from_config(config));

        Ok(Self::new(store, providers, prompt)
            .with_chunking(config.chunking.clone())
            .with_retrieval(config.retrieval.clone())
            .with_generation(config.generation.clone())
            .with_embedding_batch_size(config.embedding.batch_size))
    }

    pub fn with_chunking(mut self, chunking: ChunkingSettings) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalSettings) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn with_generation(mut self, generation: GenerationSettings) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_embedding_batch_size(mut self, batch_size: usize) -> Self {
        self.embedding_batch_size = batch_size.max(1);
        self
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Extract, chunk and index `documents`, replacing the previous index.
    pub async fn process_documents(
        &self,
        session: &mut Session,
        documents: &[UploadedDocument],
        credential: Option<&Credential>,
    ) -> AppResult<ProcessOutcome> {
        let mut trace = Trace::new("process", ProcessState::Idle);
        let mut notices = Vec::new();

        trace.enter(ProcessState::Validating);
        if documents.is_empty() {
            return Ok(trace.abort_process(
                ProcessState::Idle,
                Notice::Warning("Please upload at least one document.".to_string()),
            ));
        }
        let Some(credential) = credential else {
            return Ok(trace.abort_process(
                ProcessState::Idle,
                Notice::Warning("An API key is required to process documents.".to_string()),
            ));
        };

        trace.enter(ProcessState::Extracting);
        let ExtractionOutcome {
            text,
            warnings,
            extracted_files,
            sources,
        } = extract_documents(documents);
        notices.extend(warnings.into_iter().map(Notice::Warning));

        if text.trim().is_empty() {
            trace.enter(ProcessState::Idle);
            notices.push(Notice::Warning(
                "No text could be extracted from the uploaded documents. The existing index was left unchanged."
                    .to_string(),
            ));
            return Ok(trace.into_process(notices, None));
        }

        trace.enter(ProcessState::Chunking);
        let chunks = chunk_text(&text, &self.chunking)?;

        trace.enter(ProcessState::Indexing);
        let result = async {
            let embedder = self.providers.embedder(credential)?;
            build_index(
                &self.store,
                embedder.as_ref(),
                &chunks,
                sources,
                self.embedding_batch_size,
            )
            .await
        }
        .await;

        let stats = match result {
            Ok(stats) => stats,
            Err(e) => {
                trace.fail(ProcessState::Failed, &e);
                return Err(e);
            }
        };

        trace.enter(ProcessState::Done);
        notices.push(Notice::Success(format!(
            "Processed {} document(s) into {} chunks.",
            extracted_files, stats.chunk_count
        )));
        session.last_index = Some(stats.clone());

        Ok(trace.into_process(notices, Some(stats)))
    }

    /// Answer `question` from the indexed documents.
    ///
    /// The question is appended to the session log only once an answer
    /// attempt starts; the answer is appended when generation succeeds.
    pub async fn ask(
        &self,
        session: &mut Session,
        question: &str,
        credential: Option<&Credential>,
    ) -> AppResult<AskOutcome> {
        let mut trace = Trace::new("ask", AskState::Idle);

        let question = question.trim();
        if question.is_empty() {
            return Ok(trace.abort_ask(Notice::Warning("Please enter a question.".to_string())));
        }
        let Some(credential) = credential else {
            return Ok(trace.abort_ask(Notice::Warning(
                "An API key is required to ask questions.".to_string(),
            )));
        };

        trace.enter(AskState::CheckIndex);
        if !self.store.exists() {
            return Ok(trace.abort_ask(Notice::Warning(NOT_READY_MESSAGE.to_string())));
        }

        let embedder = self.providers.embedder(credential)?;
        let index = match self.store.open(embedder.model_name()).await {
            Ok(index) => index,
            Err(e @ (AppError::ModelMismatch { .. } | AppError::NotReady(_))) => {
                return Ok(trace.abort_ask(Notice::Warning(e.to_string())));
            }
            Err(e) => {
                trace.fail(AskState::Failed, &e);
                return Err(e);
            }
        };

        session.append(ChatRole::User, question);

        trace.enter(AskState::Retrieving);
        let context =
            match search_index(&index, embedder.as_ref(), question, self.retrieval.top_k).await {
                Ok(context) => context,
                Err(e) => {
                    trace.fail(AskState::Failed, &e);
                    return Err(e);
                }
            };

        trace.enter(AskState::Generating);
        let result = async {
            let generator = self.providers.generator(credential)?;
            generate_answer(
                generator.as_ref(),
                &self.prompt,
                &self.generation,
                &context,
                question,
            )
            .await
        }
        .await;

        let answer = match result {
            Ok(answer) => answer,
            Err(e) => {
                trace.fail(AskState::Failed, &e);
                return Err(e);
            }
        };

        session.append(ChatRole::Assistant, answer.clone());
        trace.enter(AskState::Appended);

        Ok(AskOutcome {
            state: AskState::Appended,
            transitions: trace.states,
            notices: Vec::new(),
            answer: Some(answer),
            context,
        })
    }
}

/// Records and logs state transitions of one action.
struct Trace<S> {
    action: &'static str,
    states: Vec<S>,
}

impl<S: Copy + std::fmt::Debug> Trace<S> {
    fn new(action: &'static str, initial: S) -> Self {
        Self {
            action,
            states: vec![initial],
        }
    }

    fn enter(&mut self, state: S) {
        tracing::debug!("{}: {:?}", self.action, state);
        self.states.push(state);
    }

    fn fail(&mut self, state: S, error: &AppError) {
        tracing::error!("{} failed: {}", self.action, error);
        self.states.push(state);
    }
}

impl Trace<ProcessState> {
    fn abort_process(mut self, state: ProcessState, notice: Notice) -> ProcessOutcome {
        tracing::warn!("{}: {}", self.action, notice.message());
        self.enter(state);
        self.into_process(vec![notice], None)
    }

    fn into_process(self, notices: Vec<Notice>, stats: Option<IndexStats>) -> ProcessOutcome {
        let state = self.states.last().copied().unwrap_or(ProcessState::Idle);
        ProcessOutcome {
            state,
            transitions: self.states,
            notices,
            stats,
        }
    }
}

impl Trace<AskState> {
    fn abort_ask(mut self, notice: Notice) -> AskOutcome {
        tracing::warn!("{}: {}", self.action, notice.message());
        self.enter(AskState::Idle);
        AskOutcome {
            state: AskState::Idle,
            transitions: self.states,
            notices: vec![notice],
            answer: None,
            context: Vec::new(),
        }
    }
}
