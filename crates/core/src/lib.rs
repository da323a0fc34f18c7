//! DocQA Core Library
//!
//! This crate provides the foundational utilities shared by every DocQA crate:
//! - Error handling (`AppError`, `AppResult`, `ServiceFailure`)
//! - Logging infrastructure
//! - Configuration management
//! - The opaque API `Credential`

pub mod config;
pub mod credential;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use credential::Credential;
pub use error::{AppError, AppResult, ServiceErrorKind, ServiceFailure};
