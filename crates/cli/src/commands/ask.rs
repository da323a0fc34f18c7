//! Ask command handler.
//!
//! Answers a single question from the persisted index.

use super::{print_json, print_notices};
use crate::credential::resolve_credential;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{DocumentChat, RetrievedChunk, Session};

/// Ask one question about the processed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Number of chunks to retrieve (overrides retrieval.topK)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Print the retrieved context after the answer
    #[arg(long)]
    pub show_context: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.question.join(" ");
        let credential = resolve_credential(config);

        let mut retrieval = config.retrieval.clone();
        if let Some(top_k) = self.top_k {
            retrieval.top_k = top_k.max(1);
        }
        let chat = DocumentChat::from_config(config)?.with_retrieval(retrieval);
        let mut session = Session::new();

        let outcome = chat.ask(&mut session, &question, credential.as_ref()).await?;

        if self.json {
            return print_json(&outcome);
        }

        print_notices(&outcome.notices);
        if let Some(answer) = &outcome.answer {
            println!("{}", answer);
        }
        if self.show_context {
            print_context(&outcome.context);
        }

        Ok(())
    }
}

pub(crate) fn print_context(context: &[RetrievedChunk]) {
    if context.is_empty() {
        return;
    }

    println!();
    println!("Context:");
    for (rank, chunk) in context.iter().enumerate() {
        println!(
            "--- #{} (chunk {}, distance {:.4}) ---",
            rank + 1,
            chunk.position,
            chunk.distance
        );
        println!("{}", chunk.text);
    }
}
