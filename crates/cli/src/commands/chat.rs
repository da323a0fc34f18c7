//! Chat command handler.
//!
//! Interactive session: plain lines are questions, `/`-prefixed lines are
//! commands. A failed turn is reported and the session continues.

use super::ask::print_context;
use super::print_notices;
use crate::credential::resolve_credential;
use crate::uploads::collect_uploads;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult, Credential};
use docqa_knowledge::{DocumentChat, Session};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive question-and-answer session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Documents to process before the first question
    pub paths: Vec<PathBuf>,

    /// Print the retrieved context after each answer
    #[arg(long)]
    pub show_context: bool,
}

/// One line of chat input.
#[derive(Debug, PartialEq)]
enum ChatInput {
    Ask(String),
    Process(Vec<PathBuf>),
    History,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

const HELP: &str = "Commands:
  /process <paths>  process documents, replacing the current index
  /history          show this session's messages
  /help             show this help
  /quit             leave the session
Anything else is asked as a question.";

fn parse_line(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Ask(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "process" => ChatInput::Process(parts.map(PathBuf::from).collect()),
        "history" => ChatInput::History,
        "help" => ChatInput::Help,
        "quit" | "exit" => ChatInput::Quit,
        other => ChatInput::Unknown(other.to_string()),
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let chat = DocumentChat::from_config(config)?;
        let credential = resolve_credential(config);
        let mut session = Session::new();

        if !self.paths.is_empty() {
            self.process(&chat, &mut session, &self.paths, credential.as_ref())
                .await;
        }

        eprintln!("Type a question, or /help for commands.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            eprint!("> ");
            std::io::stderr().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_line(&line) {
                ChatInput::Empty => {}
                ChatInput::Quit => break,
                ChatInput::Help => eprintln!("{}", HELP),
                ChatInput::History => print_history(&session),
                ChatInput::Unknown(name) => {
                    eprintln!("warning: unknown command /{}. Type /help for commands.", name)
                }
                ChatInput::Process(paths) => {
                    if paths.is_empty() {
                        eprintln!("warning: /process needs at least one path");
                    } else {
                        self.process(&chat, &mut session, &paths, credential.as_ref())
                            .await;
                    }
                }
                ChatInput::Ask(question) => {
                    match chat.ask(&mut session, &question, credential.as_ref()).await {
                        Ok(outcome) => {
                            print_notices(&outcome.notices);
                            if let Some(answer) = &outcome.answer {
                                println!("{}", answer);
                            }
                            if self.show_context {
                                print_context(&outcome.context);
                            }
                        }
                        Err(e) => eprintln!("error: {}", e),
                    }
                }
            }
        }

        tracing::info!(
            "Chat session ended after {} messages",
            session.messages().len()
        );
        Ok(())
    }

    async fn process(
        &self,
        chat: &DocumentChat,
        session: &mut Session,
        paths: &[PathBuf],
        credential: Option<&Credential>,
    ) {
        let documents = match collect_uploads(paths) {
            Ok(documents) => documents,
            Err(e) => {
                eprintln!("error: {}", e);
                return;
            }
        };

        match chat.process_documents(session, &documents, credential).await {
            Ok(outcome) => print_notices(&outcome.notices),
            Err(e) => eprintln!("error: {}", e),
        }
    }
}

fn print_history(session: &Session) {
    if session.messages().is_empty() {
        eprintln!("No messages yet.");
        return;
    }
    for message in session.messages() {
        println!(
            "[{}] {}: {}",
            message.created_at.format("%H:%M:%S"),
            message.role.as_str(),
            message.content
        );
    }
}
