//! Vector index abstraction.
//!
//! Retrieval only needs nearest-neighbour search over a built index, so the
//! trait is read-only. Building and replacing indexes is the job of
//! [`crate::index::IndexStore`].

use crate::index::{IndexManifest, RetrievedChunk};
use docqa_core::AppResult;

/// Trait for vector index backends.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Manifest the index was built with.
    fn manifest(&self) -> &IndexManifest;

    /// Return the `k` chunks closest to `query` by squared Euclidean
    /// distance, ascending. Equal distances keep insertion order.
    async fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<RetrievedChunk>>;

    /// Number of stored chunks.
    async fn count(&self) -> AppResult<usize>;
}
