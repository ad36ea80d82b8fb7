//! OpenAI-compatible scoring and suggestion backends.
//!
//! Works with any endpoint that speaks the chat completions API, including:
//!
//! - Groq (default)
//! - OpenAI cloud API
//! - Ollama (in OpenAI compatibility mode)
//! - vLLM
//!
//! # Example
//!
//! ```rust,no_run
//! use fypmatch_inference::openai::{OpenAIScorer, ScoringConfig};
//!
//! let scorer = OpenAIScorer::new(ScoringConfig {
//!     base_url: "http://localhost:11434/v1".to_string(),
//!     api_key: None,
//!     model: "llama3.1".to_string(),
//!     ..Default::default()
//! })
//! .unwrap();
//! ```

mod backend;
mod client;
mod error;
mod generator;
mod types;

pub use backend::{OpenAIScorer, ScoringConfig};
pub use generator::{GenerationConfig, OpenAIGenerator};
pub use error::{to_fypmatch_error, OpenAIErrorCode};
pub use types::*;
