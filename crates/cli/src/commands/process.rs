//! Process command handler.

use super::{print_json, print_notices};
use crate::credential::resolve_credential;
use crate::uploads::collect_uploads;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{DocumentChat, Session};
use std::path::PathBuf;

/// Extract, chunk and index documents, replacing any previous index
#[derive(Args, Debug)]
pub struct ProcessCommand {
    /// Files or directories to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProcessCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing process command for {} paths", self.paths.len());

        let documents = collect_uploads(&self.paths)?;
        let credential = resolve_credential(config);
        let chat = DocumentChat::from_config(config)?;
        let mut session = Session::new();

        let outcome = chat
            .process_documents(&mut session, &documents, credential.as_ref())
            .await?;

        if self.json {
            return print_json(&outcome);
        }

        print_notices(&outcome.notices);
        if let Some(stats) = &outcome.stats {
            println!(
                "Index {} ({} chunks, {} dimensions, {}) built in {:.2}s",
                stats.index_id,
                stats.chunk_count,
                stats.dimensions,
                stats.embedding_model,
                stats.duration_secs
            );
        }

        Ok(())
    }
}
