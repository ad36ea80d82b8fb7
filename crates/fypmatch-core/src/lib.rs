//! # fypmatch-core
//!
//! Core types, traits, and abstractions for the fypmatch collaborator matcher.
//!
//! This crate provides the foundational data structures (profiles, score maps,
//! job states) and the trait seams (candidate store, scoring oracle, idea
//! generator, job status store) that the other fypmatch crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use validation::{
    validate_domain, validate_interest_request, validate_profile, FieldError, ProfileSummary,
};
