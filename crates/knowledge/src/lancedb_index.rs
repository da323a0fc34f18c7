//! LanceDB-backed vector index.
//!
//! Each build writes one table of `(position, text, vector)` rows into its
//! own LanceDB database directory. Tables are never modified after creation.

use crate::index::{IndexEntry, IndexManifest, RetrievedChunk};
use crate::vector_index::VectorIndex;
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
    UInt64Array,
};
use arrow_schema::{DataType, Field, Schema};
use docqa_core::{AppError, AppResult};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::path::Path;
use std::sync::Arc;

/// Name of the chunk table inside each database.
pub const TABLE_NAME: &str = "chunks";

const POSITION_COLUMN: &str = "position";
const TEXT_COLUMN: &str = "text";
const VECTOR_COLUMN: &str = "vector";
const DISTANCE_COLUMN: &str = "_distance";

/// Chunk table stored in LanceDB.
pub struct LanceDbIndex {
    table: Table,
    manifest: IndexManifest,
}

impl std::fmt::Debug for LanceDbIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanceDbIndex")
            .field("table", &self.table.name())
            .field("manifest", &self.manifest)
            .finish()
    }
}

impl LanceDbIndex {
    /// Create a new database at `db_path` holding `entries` in insertion
    /// order.
    pub async fn create(
        db_path: &Path,
        manifest: IndexManifest,
        entries: &[IndexEntry],
    ) -> AppResult<Self> {
        std::fs::create_dir_all(db_path)
            .map_err(|e| AppError::Index(format!("Failed to create index directory: {}", e)))?;

        let conn = connect(db_path).await?;
        let schema = Self::create_schema(manifest.dimensions);
        let batch = Self::entries_to_batch(schema.clone(), manifest.dimensions, entries)?;

        let table = conn
            .create_table(
                TABLE_NAME,
                RecordBatchIterator::new(vec![Ok(batch)], schema),
            )
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to create table: {}", e)))?;

        tracing::debug!(
            "Created LanceDB table with {} chunks at {:?}",
            entries.len(),
            db_path
        );

        Ok(Self { table, manifest })
    }

    /// Open the table of an existing database.
    pub async fn open(db_path: &Path, manifest: IndexManifest) -> AppResult<Self> {
        if !db_path.is_dir() {
            return Err(AppError::Index(format!(
                "Index data missing at {:?}",
                db_path
            )));
        }

        let conn = connect(db_path).await?;
        let table = conn
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to open table: {}", e)))?;

        Ok(Self { table, manifest })
    }

    fn create_schema(dimensions: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new(POSITION_COLUMN, DataType::UInt64, false),
            Field::new(TEXT_COLUMN, DataType::Utf8, false),
            Field::new(
                VECTOR_COLUMN,
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    dimensions as i32,
                ),
                false,
            ),
        ]))
    }

    fn entries_to_batch(
        schema: Arc<Schema>,
        dimensions: usize,
        entries: &[IndexEntry],
    ) -> AppResult<RecordBatch> {
        let positions = UInt64Array::from_iter_values(0..entries.len() as u64);
        let texts = StringArray::from_iter_values(entries.iter().map(|e| e.text.as_str()));

        let values = Float32Array::from_iter_values(
            entries.iter().flat_map(|e| e.embedding.iter().copied()),
        );
        let vectors = FixedSizeListArray::try_new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            dimensions as i32,
            Arc::new(values),
            None,
        )
        .map_err(|e| AppError::Index(format!("Failed to build vector column: {}", e)))?;

        RecordBatch::try_new(
            schema,
            vec![Arc::new(positions), Arc::new(texts), Arc::new(vectors)],
        )
        .map_err(|e| AppError::Index(format!("Failed to create RecordBatch: {}", e)))
    }

    fn collect_hits(batch: &RecordBatch, hits: &mut Vec<RetrievedChunk>) -> AppResult<()> {
        let positions = batch
            .column_by_name(POSITION_COLUMN)
            .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
            .ok_or_else(|| AppError::Index("Invalid position column".to_string()))?;
        let texts = batch
            .column_by_name(TEXT_COLUMN)
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| AppError::Index("Invalid text column".to_string()))?;
        let distances = batch
            .column_by_name(DISTANCE_COLUMN)
            .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
            .ok_or_else(|| AppError::Index("Search results carry no distances".to_string()))?;

        for row in 0..batch.num_rows() {
            hits.push(RetrievedChunk {
                text: texts.value(row).to_string(),
                distance: if distances.is_null(row) {
                    f32::INFINITY
                } else {
                    distances.value(row)
                },
                position: positions.value(row) as usize,
            });
        }
        Ok(())
    }
}

async fn connect(db_path: &Path) -> AppResult<lancedb::Connection> {
    let uri = db_path.to_string_lossy().to_string();
    lancedb::connect(&uri)
        .execute()
        .await
        .map_err(|e| AppError::Index(format!("Failed to connect to LanceDB: {}", e)))
}

#[async_trait::async_trait]
impl VectorIndex for LanceDbIndex {
    fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    async fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<RetrievedChunk>> {
        if query.len() != self.manifest.dimensions {
            return Err(AppError::Index(format!(
                "Query has {} dimensions, index has {}",
                query.len(),
                self.manifest.dimensions
            )));
        }

        if k == 0 || self.manifest.chunk_count == 0 {
            return Ok(Vec::new());
        }

        // Rank every row so ties at the k-th distance resolve by position
        // rather than by scan order.
        let batches: Vec<RecordBatch> = self
            .table
            .query()
            .nearest_to(query.to_vec())
            .map_err(|e| AppError::Index(format!("Failed to create query: {}", e)))?
            .column(VECTOR_COLUMN)
            .distance_type(DistanceType::L2)
            .limit(self.manifest.chunk_count)
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to execute search: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Index(format!("Failed to collect results: {}", e)))?;

        let mut hits = Vec::new();
        for batch in &batches {
            Self::collect_hits(batch, &mut hits)?;
        }

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);

        tracing::debug!("Retrieved {} chunks (requested top-{})", hits.len(), k);
        Ok(hits)
    }

    async fn count(&self) -> AppResult<usize> {
        self.table
            .count_rows(None)
            .await
            .map_err(|e| AppError::Index(format!("Failed to count rows: {}", e)))
    }
}
