//! Core traits for fypmatch abstractions.
//!
//! These traits are the seams between the matching loop and its collaborators,
//! so stores and oracles can be swapped for in-memory doubles in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{JobState, Profile, ProjectIdea, ScoreMap};

// =============================================================================
// CANDIDATE STORE
// =============================================================================

/// Paged read access to stored candidate profiles, plus ingestion.
///
/// Implementations must paginate without overlap for a stable store and must
/// eventually return an empty page once `offset` passes the last candidate.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Fetch up to `limit` candidates starting at `offset` in a stable order.
    async fn fetch_page(&self, offset: i64, limit: i64) -> Result<Vec<Profile>>;

    /// Batched lookup by id. Missing ids are absent from the result; order is
    /// unspecified.
    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Profile>>;

    /// Total number of stored candidates.
    async fn count(&self) -> Result<i64>;

    /// Insert or replace a candidate keyed by `profile.id`.
    async fn upsert(&self, profile: &Profile) -> Result<()>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<()> {
        self.count().await.map(|_| ())
    }
}

// =============================================================================
// SCORING ORACLE
// =============================================================================

/// Scores a batch of candidates against a query profile.
///
/// Returned ids are a subset of the batch ids. Scores lie in `0.0..=5.0`.
/// Transient provider failures are reported as
/// [`Error::ScoringUnavailable`](crate::Error::ScoringUnavailable).
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    async fn score(&self, query: &Profile, batch: &[Profile]) -> Result<ScoreMap>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

// =============================================================================
// IDEA GENERATOR
// =============================================================================

/// Suggests project ideas and interests for students filling in a profile.
#[async_trait]
pub trait IdeaGenerator: Send + Sync {
    /// Suggest project ideas within `domain`.
    async fn generate_projects(&self, domain: &str) -> Result<Vec<ProjectIdea>>;

    /// Suggest interests to add to `current`. Entries already in `current`
    /// (compared case-insensitively) are never returned.
    async fn suggest_interests(&self, current: &[String]) -> Result<Vec<String>>;

    /// Model identifier, for logging and health reporting.
    fn model_name(&self) -> &str;
}

// =============================================================================
// JOB STATUS STORE
// =============================================================================

/// Key-value store of job status blobs keyed by job id.
#[async_trait]
pub trait JobStatusStore: Send + Sync {
    /// Write the state for a job, replacing any previous state.
    async fn put(&self, job_id: Uuid, state: &JobState) -> Result<()>;

    /// Read the state for a job; `None` if the id was never written.
    async fn get(&self, job_id: Uuid) -> Result<Option<JobState>>;
}
