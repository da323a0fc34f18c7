//! Query-time retrieval from the persisted index.

use crate::embeddings::EmbeddingProvider;
use crate::index::{IndexStore, RetrievedChunk, NOT_READY_MESSAGE};
use crate::vector_index::VectorIndex;
use docqa_core::{AppError, AppResult};

/// Open the index in `store` and return the `k` chunks closest to `query`.
///
/// Fails with `NotReady` before any remote call when no index exists, and
/// with `ModelMismatch` when the index was built by another embedding model.
pub async fn retrieve(
    store: &IndexStore,
    embedder: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
) -> AppResult<Vec<RetrievedChunk>> {
    if !store.exists() {
        return Err(AppError::NotReady(NOT_READY_MESSAGE.to_string()));
    }

    let index = store.open(embedder.model_name()).await?;
    search_index(&index, embedder, query, k).await
}

/// Embed `query` and search an already opened index.
pub async fn search_index(
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
) -> AppResult<Vec<RetrievedChunk>> {
    if index.manifest().embedding_model != embedder.model_name() {
        return Err(AppError::ModelMismatch {
            expected: embedder.model_name().to_string(),
            found: index.manifest().embedding_model.clone(),
        });
    }

    let query_embedding = embedder.embed_query(query).await?;
    let hits = index.search(&query_embedding, k).await?;

    tracing::debug!(
        "Retrieved {} chunks (best distance: {:?})",
        hits.len(),
        hits.first().map(|h| h.distance)
    );

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashingProvider;
    use crate::index::IndexEntry;
    use crate::tests::CountingEmbedder;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_retrieve_without_index_makes_no_calls() {
        let temp = TempDir::new().unwrap();
        let store = IndexStore::for_workspace(temp.path(), "vector_index");
        let embedder = CountingEmbedder::new(8);

        let result = retrieve(&store, &embedder, "anything", 4).await;
        assert!(matches!(result, Err(AppError::NotReady(_))));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_retrieve_with_other_model_fails_fast() {
        let temp = TempDir::new().unwrap();
        let store = IndexStore::for_workspace(temp.path(), "vector_index");
        let entries = vec![IndexEntry {
            text: "x".to_string(),
            embedding: vec![0.0; 8],
        }];
        store
            .replace("gemini", "models/embedding-001", 8, entries, Vec::new())
            .await
            .unwrap();

        let embedder = CountingEmbedder::new(8);
        let result = retrieve(&store, &embedder, "x", 4).await;
        assert!(matches!(result, Err(AppError::ModelMismatch { .. })));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_identical_query_finds_its_chunk() {
        let temp = TempDir::new().unwrap();
        let store = IndexStore::for_workspace(temp.path(), "vector_index");
        let embedder = HashingProvider::new(256);

        let texts: Vec<String> = vec![
            "Expense reports are due on the fifth business day.".to_string(),
            "Invoices must be approved within 48 hours.".to_string(),
            "Vacation requests need two weeks notice.".to_string(),
            "Badges must be worn at all times.".to_string(),
            "Laptops are refreshed every three years.".to_string(),
            "Parking is free for visitors.".to_string(),
        ];
        let embeddings = embedder.embed_batch(&texts).await.unwrap();
        let entries = texts
            .iter()
            .zip(embeddings)
            .map(|(text, embedding)| IndexEntry {
                text: text.clone(),
                embedding,
            })
            .collect();
        store
            .replace("hashing", embedder.model_name(), 256, entries, Vec::new())
            .await
            .unwrap();

        for text in &texts {
            let hits = retrieve(&store, &embedder, text, 4).await.unwrap();
            assert_eq!(hits.len(), 4);
            assert_eq!(&hits[0].text, text);
            assert_eq!(hits[0].distance, 0.0);
        }
    }

    #[tokio::test]
    async fn test_search_index_reuses_an_open_index() {
        let temp = TempDir::new().unwrap();
        let store = IndexStore::for_workspace(temp.path(), "vector_index");
        let embedder = CountingEmbedder::new(32);

        let texts = vec!["Refunds take ten days.".to_string()];
        let embeddings = embedder.embed_batch(&texts).await.unwrap();
        let entries = vec![IndexEntry {
            text: texts[0].clone(),
            embedding: embeddings[0].clone(),
        }];
        store
            .replace("counting", embedder.model_name(), 32, entries, Vec::new())
            .await
            .unwrap();

        let index = store.open(embedder.model_name()).await.unwrap();
        for _ in 0..3 {
            let hits = search_index(&index, &embedder, "Refunds take ten days.", 2)
                .await
                .unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].text, texts[0]);
        }
        assert_eq!(embedder.calls(), 4);
    }
}
