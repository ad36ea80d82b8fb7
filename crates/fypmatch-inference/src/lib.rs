//! # fypmatch-inference
//!
//! Scoring oracle and idea generator implementations for fypmatch.
//!
//! This crate provides:
//! - An OpenAI-compatible chat completions client that scores candidate batches
//! - Prompt construction and answer parsing for the five-criterion rubric
//! - Project idea and interest suggestions over the same endpoint
//! - A token-bucket pacer that spaces calls to hosted providers
//! - A deterministic mock oracle and mock generator (feature `mock`)
//!
//! # Feature Flags
//!
//! - `mock`: Enable [`mock::MockScoringOracle`] and [`mock::MockIdeaGenerator`]
//!   for downstream tests
//! - `integration`: Enable tests that require a live scoring endpoint
//!
//! # Example
//!
//! ```rust,no_run
//! use fypmatch_inference::{OpenAIScorer, ScoringConfig, ThrottledOracle};
//!
//! let config = ScoringConfig::from_env();
//! let rpm = config.requests_per_minute;
//! let oracle = ThrottledOracle::new(OpenAIScorer::new(config).unwrap(), rpm);
//! ```

pub mod openai;
pub mod parse;
pub mod prompt;
pub mod throttle;

// Mock scoring oracle for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use fypmatch_core::{Error, IdeaGenerator, Profile, ProjectIdea, Result, ScoreMap, ScoringOracle};

pub use openai::{GenerationConfig, OpenAIGenerator, OpenAIScorer, ScoringConfig};
pub use parse::{parse_interests, parse_projects, parse_scores};
pub use throttle::{Pacer, ThrottledOracle};
