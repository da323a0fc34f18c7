//! Index building.

use crate::chunker::Chunk;
use crate::embeddings::EmbeddingProvider;
use crate::index::{IndexEntry, IndexStore};
use crate::types::{IndexStats, SourceRecord};
use docqa_core::{AppError, AppResult};
use std::time::Instant;

/// Embed `chunks` and atomically replace the index in `store`.
///
/// Nothing is written until every chunk has been embedded, so a failing
/// embedding call leaves any previous index untouched.
pub async fn build_index(
    store: &IndexStore,
    embedder: &dyn EmbeddingProvider,
    chunks: &[Chunk],
    sources: Vec<SourceRecord>,
    batch_size: usize,
) -> AppResult<IndexStats> {
    if chunks.is_empty() {
        return Err(AppError::Validation(
            "No text to index: the documents contained no extractable text".to_string(),
        ));
    }

    let start = Instant::now();
    let batch_size = batch_size.max(1);
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();

    tracing::info!(
        "Embedding {} chunks with {} ({})",
        texts.len(),
        embedder.provider_name(),
        embedder.model_name()
    );

    let mut embeddings = Vec::with_capacity(texts.len());
    for (i, batch) in texts.chunks(batch_size).enumerate() {
        let vectors = embedder.embed_batch(batch).await?;
        tracing::debug!("Embedded batch {} ({} chunks)", i + 1, vectors.len());
        embeddings.extend(vectors);
    }

    if embeddings.len() != texts.len() {
        return Err(AppError::Index(format!(
            "Got {} embeddings for {} chunks",
            embeddings.len(),
            texts.len()
        )));
    }

    let entries: Vec<IndexEntry> = texts
        .into_iter()
        .zip(embeddings)
        .map(|(text, embedding)| IndexEntry { text, embedding })
        .collect();

    let manifest = store
        .replace(
            embedder.provider_name(),
            embedder.model_name(),
            embedder.dimensions(),
            entries,
            sources,
        )
        .await?;

    let duration = start.elapsed();
    tracing::info!(
        "Indexed {} chunks in {:.2}s",
        manifest.chunk_count,
        duration.as_secs_f64()
    );

    Ok(IndexStats {
        index_id: manifest.index_id,
        chunk_count: manifest.chunk_count,
        dimensions: manifest.dimensions,
        embedding_model: manifest.embedding_model,
        duration_secs: duration.as_secs_f64(),
    })
}
