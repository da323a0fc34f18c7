//! Prompt loader for YAML prompt definitions.
//!
//! A workspace may override any prompt by placing `<id>.yml` under
//! `.docqa/prompts/`; otherwise the definition compiled into the binary is
//! used.

use crate::types::PromptDefinition;
use docqa_core::{config::DATA_DIR_NAME, AppError, AppResult};
use std::path::Path;

/// Identifier of the answer persona prompt.
pub const DEFAULT_ANSWER_PROMPT_ID: &str = "docqa.answer.default";

const BUILTIN_PROMPTS: &[(&str, &str)] = &[(
    DEFAULT_ANSWER_PROMPT_ID,
    include_str!("../prompts/docqa.answer.default.yml"),
)];

/// Variables every answer template must reference.
const REQUIRED_VARIABLES: &[&str] = &["context", "question"];

/// Load a prompt definition by ID.
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.docqa/`
/// * `prompt_id` - Prompt identifier (e.g., "docqa.answer.default")
///
/// # Example
/// ```no_run
/// use docqa_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "docqa.answer.default")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(DATA_DIR_NAME)
        .join("prompts")
        .join(format!("{}.yml", prompt_id));

    let (origin, contents) = if prompt_file.exists() {
        tracing::debug!("Loading prompt from: {:?}", prompt_file);
        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;
        (prompt_file.display().to_string(), contents)
    } else {
        let (_, builtin) = BUILTIN_PROMPTS
            .iter()
            .find(|(id, _)| *id == prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Prompt not found: {}", prompt_id)))?;
        ("built-in".to_string(), builtin.to_string())
    };

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML ({}): {}", origin, e))
    })?;

    validate_prompt(&definition)?;

    tracing::info!(
        "Loaded prompt: {} ({}, {})",
        definition.id,
        definition.title,
        origin
    );

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    let mut parts = def.api_version.split('.');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(major), Some(minor), None)
            if !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
    );
    if !well_formed {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    for variable in REQUIRED_VARIABLES {
        if !def.template.contains(&format!("{{{{{}}}}}", variable)) {
            return Err(AppError::Prompt(format!(
                "Prompt {} must reference {{{{{}}}}}",
                def.id, variable
            )));
        }
    }

    Ok(())
}
