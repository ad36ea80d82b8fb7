use std::sync::Arc;
use std::time::Instant;

use fypmatch_core::{CandidateStore, IdeaGenerator};
use fypmatch_jobs::JobRunner;

use crate::config::RateLimitConfig;
use crate::middleware::{build_rate_limiter, GlobalRateLimiter};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub runner: JobRunner,
    /// Same store the runner's matcher reads from.
    pub store: Arc<dyn CandidateStore>,
    pub generator: Arc<dyn IdeaGenerator>,
    pub rate_limit: RateLimitConfig,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        runner: JobRunner,
        generator: Arc<dyn IdeaGenerator>,
        rate_limit: &RateLimitConfig,
    ) -> Self {
        Self {
            store: runner.matcher().store().clone(),
            runner,
            generator,
            rate_limit: rate_limit.clone(),
            rate_limiter: build_rate_limiter(rate_limit),
            started_at: Instant::now(),
        }
    }
}
