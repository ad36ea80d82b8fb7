//! # fypmatch-jobs
//!
//! Background match jobs for fypmatch.
//!
//! This crate provides:
//! - The paginated candidate-scoring loop ([`Matcher`])
//! - Top-k selection and hydration of the best candidates
//! - A bounded job runner that stores `processing`/`done`/`error` states
//! - An in-memory job status store
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fypmatch_jobs::{JobRunner, MatchConfig, Matcher, MemoryJobStore, RunnerConfig};
//!
//! let matcher = Matcher::new(store, oracle, MatchConfig::from_env());
//! let runner = JobRunner::new(matcher, Arc::new(MemoryJobStore::new()), RunnerConfig::from_env());
//!
//! let job_id = runner.submit(query).await?;
//! let mut events = runner.events();
//! while let Ok(event) = events.recv().await {
//!     println!("Event: {:?}", event);
//! }
//! ```

pub mod matcher;
pub mod memory;
pub mod selector;
pub mod worker;

pub use fypmatch_core::{Error, JobState, Profile, Result, ScoreMap};

pub use matcher::{FetchOutcome, MatchConfig, MatchState, Matcher};
pub use memory::MemoryJobStore;
pub use selector::{hydrate, select_top};
pub use worker::{JobRunner, RunnerConfig, RunnerEvent};
