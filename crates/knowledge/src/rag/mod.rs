//! Retrieval-augmented answer generation.

pub mod answer;

pub use answer::{build_context, generate_answer};
