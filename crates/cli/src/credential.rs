//! Credential resolution for commands that reach the hosted models.

use dialoguer::Password;
use docqa_core::{AppConfig, Credential};
use std::io::IsTerminal;

/// Resolve the API key from flags, environment or config, falling back to a
/// masked prompt when stdin and stderr are attached to a terminal.
pub fn resolve_credential(config: &AppConfig) -> Option<Credential> {
    if let Some(credential) = config.resolve_api_key() {
        return Some(credential);
    }

    if !(std::io::stdin().is_terminal() && std::io::stderr().is_terminal()) {
        tracing::debug!("No API key configured and no terminal to prompt on");
        return None;
    }

    match Password::new()
        .with_prompt(format!("Google API key ({} is not set)", config.api_key_env))
        .allow_empty_password(true)
        .interact()
    {
        Ok(secret) => Credential::new(secret),
        Err(e) => {
            tracing::warn!("Could not read API key: {}", e);
            None
        }
    }
}
