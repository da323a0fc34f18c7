//! Index command handler.

use super::print_json;
use clap::{Args, Subcommand};
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::IndexStore;
use std::path::Path;
use walkdir::WalkDir;

/// Inspect or remove the persisted index
#[derive(Args, Debug)]
pub struct IndexCommand {
    #[command(subcommand)]
    pub action: IndexAction,
}

#[derive(Subcommand, Debug)]
pub enum IndexAction {
    /// Show index statistics
    Stats(IndexStatsCommand),
    /// Delete the index
    Clean,
}

/// Show index statistics
#[derive(Args, Debug)]
pub struct IndexStatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = IndexStore::for_workspace(&config.workspace, &config.retrieval.index_name);
        match &self.action {
            IndexAction::Stats(cmd) => cmd.execute(&store),
            IndexAction::Clean => clean(&store),
        }
    }
}

impl IndexStatsCommand {
    fn execute(&self, store: &IndexStore) -> AppResult<()> {
        tracing::info!("Executing index stats command");

        let manifest = store.manifest()?;
        let size_bytes = manifest.as_ref().map(|_| dir_size(store.path()));

        if self.json {
            return print_json(&serde_json::json!({
                "path": store.path(),
                "exists": manifest.is_some(),
                "sizeBytes": size_bytes,
                "manifest": manifest,
            }));
        }

        let Some(manifest) = manifest else {
            println!("No index at {}. Run `docqa process` first.", store.path().display());
            return Ok(());
        };

        println!("Index: {}", store.path().display());
        println!("  Id: {}", manifest.index_id);
        println!("  Database: {}", manifest.database);
        println!("  Created: {}", manifest.created_at);
        println!(
            "  Embeddings: {}/{} ({} dimensions)",
            manifest.embedding_provider, manifest.embedding_model, manifest.dimensions
        );
        println!("  Chunks: {}", manifest.chunk_count);
        if let Some(size) = size_bytes {
            println!("  Size: {} bytes", size);
        }
        println!("  Sources:");
        for source in &manifest.sources {
            println!(
                "  - {} ({}, {} bytes, sha256 {})",
                source.name, source.format, source.size_bytes, source.sha256
            );
        }

        Ok(())
    }
}

/// Total size of the files under `dir`.
fn dir_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.metadata().ok())
        .filter(|metadata| metadata.is_file())
        .map(|metadata| metadata.len())
        .sum()
}

fn clean(store: &IndexStore) -> AppResult<()> {
    tracing::info!("Executing index clean command");

    if store.remove()? {
        println!("Removed index {}", store.path().display());
    } else {
        println!("No index at {}", store.path().display());
    }
    Ok(())
}
