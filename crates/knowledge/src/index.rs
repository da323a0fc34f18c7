//! Persisted index location and whole-index replacement.
//!
//! An index lives in `<workspace>/.docqa/index/<name>/`. Each build writes a
//! fresh LanceDB database in its own subdirectory, then atomically replaces
//! `manifest.json`, which names the live database and the embedding model
//! that produced its vectors. A build that fails before the manifest swap
//! leaves the previous index untouched.

use crate::lancedb_index::LanceDbIndex;
use crate::types::SourceRecord;
use chrono::{DateTime, Utc};
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Version of the persisted index layout.
pub const INDEX_FORMAT_VERSION: u32 = 2;

/// Message shown when asking before any documents were processed.
pub const NOT_READY_MESSAGE: &str =
    "Documents not yet processed. Process your documents before asking questions.";

const MANIFEST_FILE: &str = "manifest.json";
const DATABASE_PREFIX: &str = "db-";

/// Metadata describing a persisted index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexManifest {
    pub format_version: u32,
    pub index_id: String,
    /// Directory name of the LanceDB database holding the chunks
    pub database: String,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub created_at: DateTime<Utc>,
    pub chunk_count: usize,
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
}

/// A chunk and its embedding, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A search hit. Lower distance means more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub distance: f32,
    /// Insertion position of the chunk in the index
    pub position: usize,
}

/// Location of the single persisted index.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store at `<workspace>/.docqa/index/<index_name>/`.
    pub fn for_workspace(workspace: &Path, index_name: &str) -> Self {
        Self::new(crate::config::get_index_path(workspace, index_name))
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    pub fn exists(&self) -> bool {
        self.manifest_path().is_file()
    }

    /// Build a new index from `entries` and make it the live one.
    ///
    /// Every embedding must have `dimensions` components. Rows keep the
    /// order of `entries`.
    pub async fn replace(
        &self,
        embedding_provider: &str,
        embedding_model: &str,
        dimensions: usize,
        entries: Vec<IndexEntry>,
        sources: Vec<SourceRecord>,
    ) -> AppResult<IndexManifest> {
        if dimensions == 0 {
            return Err(AppError::Index(
                "Embedding dimensions must be greater than 0".to_string(),
            ));
        }

        if let Some((i, bad)) = entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.embedding.len() != dimensions)
        {
            return Err(AppError::Index(format!(
                "Embedding {} has {} dimensions, expected {}",
                i,
                bad.embedding.len(),
                dimensions
            )));
        }

        fs::create_dir_all(&self.dir)?;

        let index_id = uuid::Uuid::new_v4().to_string();
        let manifest = IndexManifest {
            format_version: INDEX_FORMAT_VERSION,
            database: format!("{}{}", DATABASE_PREFIX, index_id),
            index_id,
            embedding_provider: embedding_provider.to_string(),
            embedding_model: embedding_model.to_string(),
            dimensions,
            created_at: Utc::now(),
            chunk_count: entries.len(),
            sources,
        };

        let db_path = self.dir.join(&manifest.database);
        if let Err(e) = LanceDbIndex::create(&db_path, manifest.clone(), &entries).await {
            if let Err(cleanup) = fs::remove_dir_all(&db_path) {
                tracing::debug!("Could not remove partial index {:?}: {}", db_path, cleanup);
            }
            return Err(e);
        }

        self.write_manifest(&manifest)?;
        self.remove_stale_databases(&manifest.database);

        tracing::info!(
            "Saved index {} ({} chunks) to {:?}",
            manifest.index_id,
            manifest.chunk_count,
            self.dir
        );
        Ok(manifest)
    }

    fn write_manifest(&self, manifest: &IndexManifest) -> AppResult<()> {
        let temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, manifest)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        let path = self.manifest_path();
        temp.persist(&path).map_err(|e| {
            AppError::Index(format!("Failed to replace index manifest at {:?}: {}", path, e))
        })?;
        Ok(())
    }

    /// Delete databases left by earlier builds.
    fn remove_stale_databases(&self, live: &str) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with(DATABASE_PREFIX) || name == live {
                continue;
            }
            match fs::remove_dir_all(entry.path()) {
                Ok(()) => tracing::debug!("Removed stale index database {}", name),
                Err(e) => tracing::warn!("Failed to remove stale index database {}: {}", name, e),
            }
        }
    }

    /// Open the live index, checking it was built with `expected_model`.
    pub async fn open(&self, expected_model: &str) -> AppResult<LanceDbIndex> {
        let manifest = self
            .manifest()?
            .ok_or_else(|| AppError::NotReady(NOT_READY_MESSAGE.to_string()))?;

        if manifest.format_version != INDEX_FORMAT_VERSION {
            return Err(AppError::Index(format!(
                "Unsupported index format version {} (expected {}). Process the documents again.",
                manifest.format_version, INDEX_FORMAT_VERSION
            )));
        }

        if manifest.embedding_model != expected_model {
            return Err(AppError::ModelMismatch {
                expected: expected_model.to_string(),
                found: manifest.embedding_model,
            });
        }

        let db_path = self.dir.join(&manifest.database);
        let index_id = manifest.index_id.clone();
        let chunk_count = manifest.chunk_count;
        let index = LanceDbIndex::open(&db_path, manifest).await?;

        tracing::debug!("Opened index {} ({} chunks)", index_id, chunk_count);
        Ok(index)
    }

    /// Read the manifest, if an index exists.
    pub fn manifest(&self) -> AppResult<Option<IndexManifest>> {
        let path = self.manifest_path();
        if !path.is_file() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| AppError::Index(format!("Failed to read {:?}: {}", path, e)))?;
        let manifest = serde_json::from_str(&contents)
            .map_err(|e| AppError::Index(format!("Failed to parse {:?}: {}", path, e)))?;
        Ok(Some(manifest))
    }

    /// Delete the persisted index. Returns whether one existed.
    pub fn remove(&self) -> AppResult<bool> {
        if !self.dir.exists() {
            return Ok(false);
        }
        let existed = self.exists();
        fs::remove_dir_all(&self.dir)?;
        tracing::info!("Removed index at {:?}", self.dir);
        Ok(existed)
    }
}
