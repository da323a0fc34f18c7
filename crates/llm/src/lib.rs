//! Generative-model integration crate for DocQA.
//!
//! This crate provides a provider-agnostic abstraction for sending a single
//! prompt to a hosted large language model and receiving its text output.
//!
//! # Providers
//! - **Gemini**: Google Generative Language API (default)
//!
//! # Example
//! ```no_run
//! use docqa_core::Credential;
//! use docqa_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = Credential::new("api-key").unwrap();
//! let client = GeminiClient::new(credential, Duration::from_secs(60))?;
//! let request = LlmRequest::new("Hello, world!", "gemini-2.5-pro");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod http;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::GeminiClient;
