//! Document question answering over a local vector index.
//!
//! Uploaded PDF and DOCX files are extracted, split into overlapping chunks,
//! embedded and stored in a LanceDB table that each run replaces. Questions
//! are answered by retrieving the closest chunks and handing them to a
//! generation model.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod extract;
pub mod index;
pub mod indexer;
pub mod lancedb_index;
pub mod rag;
pub mod retriever;
pub mod session;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

pub use chunker::{chunk_text, reconstruct, Chunk};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use extract::{extract_documents, ExtractionOutcome};
pub use index::{IndexEntry, IndexManifest, IndexStore, RetrievedChunk, NOT_READY_MESSAGE};
pub use indexer::build_index;
pub use lancedb_index::LanceDbIndex;
pub use rag::{build_context, generate_answer};
pub use retriever::{retrieve, search_index};
pub use session::{
    AskOutcome, AskState, ConfiguredProviders, DocumentChat, ProcessOutcome, ProcessState,
    ProviderFactory, Session,
};
pub use types::{
    ChatMessage, ChatRole, DocumentFormat, IndexStats, Notice, SourceRecord, UploadedDocument,
};
pub use vector_index::VectorIndex;
