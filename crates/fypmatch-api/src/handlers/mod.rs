//! HTTP handlers.

pub mod generation;
pub mod health;
pub mod matching;
pub mod profiles;
