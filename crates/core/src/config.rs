//! Configuration management for DocQA.
//!
//! This module handles loading and merging configuration from multiple sources,
//! lowest precedence first:
//! - Built-in defaults
//! - Config file (`.docqa/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric, with all state stored in `.docqa/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::credential::Credential;
use crate::error::{AppError, AppResult};

/// Name of the per-workspace data directory.
pub const DATA_DIR_NAME: &str = ".docqa";

/// Generation providers with a client implementation.
pub const GENERATION_PROVIDERS: &[&str] = &["gemini"];

/// Embedding providers with an implementation.
pub const EMBEDDING_PROVIDERS: &[&str] = &["gemini", "hashing"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .docqa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Explicit API key (flag or DOCQA_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    pub generation: GenerationSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
}

/// Generative model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationSettings {
    pub provider: String,
    pub model: String,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-pro".to_string(),
            endpoint: None,
            timeout_secs: 120,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

/// Embedding model settings.
///
/// The same model must be used to build an index and to query it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingSettings {
    pub provider: String,
    pub model: String,
    pub endpoint: Option<String>,
    pub dimensions: usize,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "models/embedding-001".to_string(),
            endpoint: None,
            dimensions: 768,
            batch_size: 100,
            timeout_secs: 60,
        }
    }
}

/// Chunking settings, in characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            chunk_overlap: 1_000,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalSettings {
    /// Number of chunks handed to the generator
    pub top_k: usize,

    /// Name of the persisted index artifact
    pub index_name: String,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            index_name: "vector_index".to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    credentials: Option<CredentialsConfig>,
    generation: Option<GenerationSettings>,
    embedding: Option<EmbeddingSettings>,
    chunking: Option<ChunkingSettings>,
    retrieval: Option<RetrievalSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialsConfig {
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            api_key: None,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
            generation: GenerationSettings::default(),
            embedding: EmbeddingSettings::default(),
            chunking: ChunkingSettings::default(),
            retrieval: RetrievalSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration for a workspace.
    ///
    /// `workspace` and `config_file` come from the command line (clap also
    /// reads `DOCQA_WORKSPACE` and `DOCQA_CONFIG` for them).
    ///
    /// Environment variables:
    /// - `DOCQA_API_KEY`: API key
    /// - `DOCQA_MODEL`: Generation model
    /// - `DOCQA_EMBEDDING_MODEL`: Embedding model
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.data_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(model) = std::env::var("DOCQA_MODEL") {
            config.generation.model = model;
        }

        if let Ok(model) = std::env::var("DOCQA_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }

        if let Ok(key) = std::env::var("DOCQA_API_KEY") {
            config.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.clone().merge(config_file))
    }

    fn merge(mut self, file: ConfigFile) -> Self {
        if let Some(env) = file.credentials.and_then(|c| c.api_key_env) {
            self.api_key_env = env;
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        if let Some(generation) = file.generation {
            self.generation = generation;
        }
        if let Some(embedding) = file.embedding {
            self.embedding = embedding;
        }
        if let Some(chunking) = file.chunking {
            self.chunking = chunking;
        }
        if let Some(retrieval) = file.retrieval {
            self.retrieval = retrieval;
        }

        self
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the config file.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        api_key: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(model) = model {
            self.generation.model = model;
        }

        if let Some(api_key) = api_key {
            self.api_key = Some(api_key);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .docqa directory.
    pub fn data_dir(&self) -> PathBuf {
        self.workspace.join(DATA_DIR_NAME)
    }

    /// Ensure the .docqa directory exists.
    pub fn ensure_data_dir(&self) -> AppResult<()> {
        let data_dir = self.data_dir();
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir).map_err(|e| {
                AppError::Config(format!("Failed to create {} directory: {}", DATA_DIR_NAME, e))
            })?;
        }
        Ok(())
    }

    /// Resolve the API credential without prompting.
    ///
    /// An explicit key wins; otherwise the variable named by
    /// `credentials.apiKeyEnv` is read.
    pub fn resolve_api_key(&self) -> Option<Credential> {
        if let Some(credential) = self.api_key.clone().and_then(Credential::new) {
            return Some(credential);
        }

        std::env::var(&self.api_key_env)
            .ok()
            .and_then(Credential::new)
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> AppResult<()> {
        if !GENERATION_PROVIDERS.contains(&self.generation.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown generation provider: {}. Supported: {}",
                self.generation.provider,
                GENERATION_PROVIDERS.join(", ")
            )));
        }

        if !EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.chunking.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be at least 1".to_string()));
        }

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("topK must be at least 1".to_string()));
        }

        if self.retrieval.index_name.trim().is_empty() {
            return Err(AppError::Config("indexName cannot be empty".to_string()));
        }

        if self.embedding.dimensions == 0 || self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding dimensions and batchSize must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.generation.provider, "gemini");
        assert_eq!(config.generation.model, "gemini-2.5-pro");
        assert_eq!(config.embedding.model, "models/embedding-001");
        assert_eq!(config.chunking.chunk_size, 10_000);
        assert_eq!(config.chunking.chunk_overlap, 1_000);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.retrieval.index_name, "vector_index");
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_data_dir() {
        let config = AppConfig::default();
        assert!(config.data_dir().ends_with(".docqa"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("gemini-2.5-flash".to_string()),
            Some("key".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.generation.model, "gemini-2.5-flash");
        assert_eq!(overridden.api_key.as_deref(), Some("key"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
credentials:
  apiKeyEnv: MY_GEMINI_KEY
embedding:
  provider: hashing
  model: hashing-v1
  dimensions: 256
chunking:
  chunkSize: 2000
  chunkOverlap: 200
retrieval:
  topK: 6
logging:
  color: false
"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.workspace = temp.path().to_path_buf();
        let merged = config.merge_yaml(&path).unwrap();

        assert_eq!(merged.api_key_env, "MY_GEMINI_KEY");
        assert_eq!(merged.embedding.provider, "hashing");
        assert_eq!(merged.embedding.dimensions, 256);
        // Unset keys inside a section keep their defaults
        assert_eq!(merged.embedding.batch_size, 100);
        assert_eq!(merged.chunking.chunk_size, 2000);
        assert_eq!(merged.retrieval.top_k, 6);
        assert_eq!(merged.retrieval.index_name, "vector_index");
        assert_eq!(merged.generation.model, "gemini-2.5-pro");
        assert!(merged.no_color);
    }

    #[test]
    fn test_load_missing_workspace() {
        let result = AppConfig::load(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_missing_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("nope.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.generation.provider = "unknown".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.embedding.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_overlap_smaller_than_size() {
        let mut config = AppConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_top_k() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let mut config = AppConfig::default();
        config.api_key = Some("explicit".to_string());
        config.api_key_env = "DOCQA_TEST_UNSET_VARIABLE".to_string();

        let credential = config.resolve_api_key().unwrap();
        assert_eq!(credential.expose(), "explicit");
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let mut config = AppConfig::default();
        config.api_key = Some("   ".to_string());
        config.api_key_env = "DOCQA_TEST_UNSET_VARIABLE".to_string();

        assert!(config.resolve_api_key().is_none());
    }
}
