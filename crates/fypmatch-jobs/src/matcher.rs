//! Paginated candidate-scoring loop.
//!
//! One [`MatchState`] per job walks the candidate store page by page, sends
//! each page to the scoring oracle and merges the returned scores. The loop is
//! strictly sequential: a page is fetched, scored and merged before the next
//! fetch. The only data-driven exit is an empty page.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use fypmatch_core::defaults;
use fypmatch_core::{CandidateStore, Error, Profile, Result, ScoreMap, ScoringOracle};

use crate::selector::{hydrate, select_top};

/// Loop and selection parameters.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Candidates requested per fetch.
    pub page_size: i64,
    /// Matches kept after scoring.
    pub top_k: usize,
    /// Maximum store fetches per job, including the final empty one.
    pub max_pages: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::MATCH_PAGE_SIZE,
            top_k: defaults::MATCH_TOP_K,
            max_pages: defaults::MATCH_MAX_PAGES,
        }
    }
}

impl MatchConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `MATCH_PAGE_SIZE` | `20` | Candidates per page |
    /// | `MATCH_TOP_K` | `5` | Matches returned |
    /// | `MATCH_MAX_PAGES` | `10000` | Fetch bound per job |
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            page_size: std::env::var("MATCH_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(d.page_size),
            top_k: std::env::var("MATCH_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.top_k),
            max_pages: std::env::var("MATCH_MAX_PAGES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(d.max_pages),
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// Result of one store fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A non-empty page of candidates.
    Page(Vec<Profile>),
    /// No candidates at this offset; the store is exhausted.
    Empty,
    /// The store could not be read.
    Failed(Error),
}

impl From<Result<Vec<Profile>>> for FetchOutcome {
    fn from(result: Result<Vec<Profile>>) -> Self {
        match result {
            Ok(page) if page.is_empty() => FetchOutcome::Empty,
            Ok(page) => FetchOutcome::Page(page),
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}

/// Working state of one in-flight match job.
#[derive(Debug, Clone)]
pub struct MatchState {
    pub query: Profile,
    pub scores: ScoreMap,
    pub offset: i64,
    pub limit: i64,
    pub done: bool,
    /// Candidates of the most recent page.
    pub batch: Vec<Profile>,
    /// Store fetches issued so far, including an empty final one.
    pub pages_fetched: usize,
    /// Pages whose scoring failed transiently and contributed no scores.
    pub skipped_batches: usize,
}

impl MatchState {
    pub fn new(query: Profile, limit: i64) -> Self {
        Self {
            query,
            scores: ScoreMap::new(),
            offset: 0,
            limit,
            done: false,
            batch: Vec::new(),
            pages_fetched: 0,
            skipped_batches: 0,
        }
    }
}

/// Drives the scoring loop and top-k selection for a query.
pub struct Matcher {
    store: Arc<dyn CandidateStore>,
    oracle: Arc<dyn ScoringOracle>,
    config: MatchConfig,
}

impl Matcher {
    pub fn new(
        store: Arc<dyn CandidateStore>,
        oracle: Arc<dyn ScoringOracle>,
        config: MatchConfig,
    ) -> Self {
        Self {
            store,
            oracle,
            config,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn CandidateStore> {
        &self.store
    }

    pub fn oracle(&self) -> &Arc<dyn ScoringOracle> {
        &self.oracle
    }

    /// Advance the loop by one fetch.
    ///
    /// Transient oracle failures skip the page. Store failures, other oracle
    /// failures and exceeding the fetch bound are returned as errors.
    pub async fn step(&self, state: &mut MatchState) -> Result<()> {
        if state.done {
            return Ok(());
        }
        if state.pages_fetched >= self.config.max_pages {
            return Err(Error::Job(format!(
                "candidate store returned no empty page within {} fetches",
                self.config.max_pages
            )));
        }

        let outcome: FetchOutcome = self
            .store
            .fetch_page(state.offset, state.limit)
            .await
            .into();
        state.pages_fetched += 1;

        match outcome {
            FetchOutcome::Empty => {
                debug!(
                    subsystem = "jobs",
                    component = "matcher",
                    op = "fetch_page",
                    offset = state.offset,
                    pages_fetched = state.pages_fetched,
                    "Candidate store exhausted"
                );
                state.batch.clear();
                state.done = true;
            }
            FetchOutcome::Failed(e) => return Err(e),
            FetchOutcome::Page(batch) => {
                debug!(
                    subsystem = "jobs",
                    component = "matcher",
                    op = "fetch_page",
                    offset = state.offset,
                    batch_size = batch.len(),
                    "Fetched candidate page"
                );
                state.offset += batch.len() as i64;
                state.batch = batch;

                match self.oracle.score(&state.query, &state.batch).await {
                    Ok(scores) => state.scores.merge(scores),
                    Err(e) if e.is_transient() => {
                        state.skipped_batches += 1;
                        warn!(
                            subsystem = "jobs",
                            component = "matcher",
                            op = "score_batch",
                            batch_size = state.batch.len(),
                            error = %e,
                            "Scoring unavailable, batch contributes no scores"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }

    /// Run the loop for `query` until the store is exhausted.
    pub async fn run(&self, query: Profile) -> Result<MatchState> {
        let start = Instant::now();
        let mut state = MatchState::new(query, self.config.page_size);

        while !state.done {
            self.step(&mut state).await?;
        }

        info!(
            subsystem = "jobs",
            component = "matcher",
            op = "run",
            model = self.oracle.model_name(),
            pages_fetched = state.pages_fetched,
            skipped_batches = state.skipped_batches,
            scored_count = state.scores.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Scoring loop finished"
        );
        Ok(state)
    }

    /// Run the loop, then select and hydrate the top-k candidates.
    ///
    /// The full ranking is handed to hydration so candidates deleted after
    /// scoring are replaced by the next-best survivors.
    pub async fn find_matches(&self, query: Profile) -> Result<Vec<Profile>> {
        let state = self.run(query).await?;
        let ranked = select_top(&state.scores, state.scores.len());
        hydrate(self.store.as_ref(), &ranked, self.config.top_k).await
    }
}
