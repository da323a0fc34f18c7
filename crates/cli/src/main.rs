//! DocQA CLI
//!
//! Main entry point for the docqa command-line tool.
//! Processes PDF and DOCX documents into a local index and answers questions about them.

mod commands;
mod credential;
mod uploads;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, IndexCommand, ProcessCommand};
use docqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// DocQA - ask questions about your documents
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Ask questions about your PDF and DOCX documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DOCQA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generation model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Google API key
    #[arg(long, global = true, env = "DOCQA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract, chunk and index documents
    Process(ProcessCommand),

    /// Ask one question about the processed documents
    Ask(AskCommand),

    /// Interactive question-and-answer session
    Chat(ChatCommand),

    /// Inspect or remove the persisted index
    Index(IndexCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.model,
        cli.api_key,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;
    config.validate()?;

    tracing::info!("DocQA CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!(
        "Generation model: {}, embedding model: {}",
        config.generation.model,
        config.embedding.model
    );

    config.ensure_data_dir()?;

    let command_name = match &cli.command {
        Commands::Process(_) => "process",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Index(_) => "index",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Process(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
