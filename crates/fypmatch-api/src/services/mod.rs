//! Backing services owned by the API process.

pub mod job_store;

pub use job_store::RedisJobStore;
