//! Command handlers for the DocQA CLI.

pub mod ask;
pub mod chat;
pub mod index;
pub mod process;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use index::IndexCommand;
pub use process::ProcessCommand;

use docqa_core::AppResult;
use docqa_knowledge::Notice;
use serde::Serialize;

/// Print notices to stderr so stdout carries only answers and JSON.
pub(crate) fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice {
            Notice::Success(message) => eprintln!("{}", message),
            Notice::Warning(message) => eprintln!("warning: {}", message),
        }
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
