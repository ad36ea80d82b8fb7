//! Structured logging conventions for fypmatch.
//!
//! Every crate logs through `tracing` with the same field names, so log
//! aggregation can follow a job across the API, runner, loop and oracle.
//!
//! ## Field Names
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `subsystem` | `"api"`, `"db"`, `"inference"` or `"jobs"` |
//! | `component` | Unit within a subsystem: `"matcher"`, `"selector"`, `"runner"`, `"pool"`, `"openai"`, `"generator"` |
//! | `op` | Logical operation: `"fetch_page"`, `"score_batch"`, `"hydrate"`, `"generate_projects"` |
//! | `job_id` | Match job UUID |
//! | `profile_id` | Profile id being operated on |
//! | `duration_ms` | Wall-clock duration in milliseconds |
//! | `offset`, `batch_size`, `scored_count`, `result_count` | Loop measurements |
//! | `model` | Model name used for scoring or generation |
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Job failed, store unreachable |
//! | WARN  | Recoverable issue: skipped batch, dropped id, missing record |
//! | INFO  | Lifecycle events: startup, job submitted/completed |
//! | DEBUG | Per-page decisions, config choices |
//! | TRACE | Per-candidate scores |
