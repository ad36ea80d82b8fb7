//! Match job runner.
//!
//! Each submitted query becomes one spawned task that runs the scoring loop
//! and top-k selection, then records the terminal state. A semaphore bounds
//! how many jobs score at once; jobs waiting for a permit stay `processing`.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, Semaphore};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use fypmatch_core::defaults;
use fypmatch_core::{Error, JobState, JobStatusStore, Profile, Result};

use crate::matcher::Matcher;

/// Configuration for the job runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum number of jobs scoring concurrently.
    pub max_concurrent_jobs: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: defaults::JOB_MAX_CONCURRENT,
        }
    }
}

impl RunnerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `JOB_MAX_CONCURRENT` | `4` | Max concurrent match jobs |
    pub fn from_env() -> Self {
        let max_concurrent_jobs = std::env::var("JOB_MAX_CONCURRENT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults::JOB_MAX_CONCURRENT)
            .max(1);
        Self {
            max_concurrent_jobs,
        }
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max.max(1);
        self
    }
}

/// Event emitted by the job runner.
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    /// A job acquired a worker permit and started scoring.
    JobStarted { job_id: Uuid },
    /// A job finished and its result was stored.
    JobCompleted { job_id: Uuid, result_count: usize },
    /// A job failed. `error` is the internal cause, not the stored message.
    JobFailed { job_id: Uuid, error: String },
}

/// Runs match jobs in the background and records their status.
#[derive(Clone)]
pub struct JobRunner {
    matcher: Arc<Matcher>,
    jobs: Arc<dyn JobStatusStore>,
    permits: Arc<Semaphore>,
    event_tx: broadcast::Sender<RunnerEvent>,
    config: RunnerConfig,
}

impl JobRunner {
    pub fn new(matcher: Matcher, jobs: Arc<dyn JobStatusStore>, config: RunnerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(defaults::EVENT_BUS_CAPACITY);
        Self {
            matcher: Arc::new(matcher),
            jobs,
            permits: Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1))),
            event_tx,
            config,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Get a receiver for runner events.
    pub fn events(&self) -> broadcast::Receiver<RunnerEvent> {
        self.event_tx.subscribe()
    }

    /// Record a new `processing` job for `query`, start it, and return its id.
    ///
    /// Fails only if the initial status cannot be written; in that case no
    /// job is started.
    pub async fn submit(&self, query: Profile) -> Result<Uuid> {
        let job_id = Uuid::now_v7();
        self.jobs.put(job_id, &JobState::Processing).await?;

        info!(
            subsystem = "jobs",
            component = "runner",
            op = "submit",
            job_id = %job_id,
            "Match job submitted"
        );

        let runner = self.clone();
        let span = info_span!("match_job", job_id = %job_id);
        tokio::spawn(async move { runner.execute(job_id, query).await }.instrument(span));

        Ok(job_id)
    }

    /// Current state of a job; `None` for an unknown id.
    pub async fn status(&self, job_id: Uuid) -> Result<Option<JobState>> {
        self.jobs.get(job_id).await
    }

    async fn execute(self, job_id: Uuid, query: Profile) {
        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                self.finish(job_id, Err(Error::Internal(e.to_string())), Instant::now())
                    .await;
                return;
            }
        };

        let start = Instant::now();
        let _ = self.event_tx.send(RunnerEvent::JobStarted { job_id });

        // Run in a child task so a panic inside the loop still ends the job.
        let matcher = self.matcher.clone();
        let outcome = tokio::spawn(
            async move { matcher.find_matches(query).await }.in_current_span(),
        )
        .await
        .unwrap_or_else(|e| Err(Error::Internal(format!("match task panicked: {e}"))));

        self.finish(job_id, outcome, start).await;
    }

    async fn finish(&self, job_id: Uuid, outcome: Result<Vec<Profile>>, start: Instant) {
        let duration_ms = start.elapsed().as_millis() as u64;
        let (state, event) = match outcome {
            Ok(result) => {
                info!(
                    subsystem = "jobs",
                    component = "runner",
                    job_id = %job_id,
                    result_count = result.len(),
                    duration_ms,
                    "Match job completed"
                );
                let result_count = result.len();
                (
                    JobState::Done { result },
                    RunnerEvent::JobCompleted {
                        job_id,
                        result_count,
                    },
                )
            }
            Err(e) => {
                warn!(
                    subsystem = "jobs",
                    component = "runner",
                    job_id = %job_id,
                    error = %e,
                    duration_ms,
                    "Match job failed"
                );
                (
                    JobState::Error {
                        error: defaults::JOB_FAILED_MESSAGE.to_string(),
                    },
                    RunnerEvent::JobFailed {
                        job_id,
                        error: e.to_string(),
                    },
                )
            }
        };

        if let Err(e) = self.jobs.put(job_id, &state).await {
            error!(
                subsystem = "jobs",
                component = "runner",
                job_id = %job_id,
                status = state.status(),
                error = %e,
                "Failed to store terminal job state"
            );
            return;
        }
        let _ = self.event_tx.send(event);
    }
}
