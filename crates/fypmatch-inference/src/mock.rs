//! Mock scoring oracle and idea generator for deterministic testing.
//!
//! Scores with the same five-criterion rubric the LLM is asked to apply,
//! computed from word and tag overlap, so tests get stable, explainable
//! numbers. Failures can be scripted per call index.
//!
//! [`MockIdeaGenerator`] echoes the domain into templated project ideas and
//! suggests numbered interests, or fails every call when asked to.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fypmatch_inference::mock::{MockFailure, MockScoringOracle};
//!
//! let oracle = MockScoringOracle::new()
//!     .with_score("s2", 4.5)
//!     .fail_on_call(1, MockFailure::Transient);
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use fypmatch_core::defaults::{SCORE_MAX, SCORE_MIN};
use fypmatch_core::{Error, IdeaGenerator, Profile, ProjectIdea, Result, ScoreMap, ScoringOracle};

/// Kind of failure to inject on a scripted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Provider unavailable; the loop skips the batch.
    Transient,
    /// Unusable answer; the job fails.
    Malformed,
    /// Bad credentials; the job fails.
    Config,
}

impl MockFailure {
    fn to_error(self, call: usize) -> Error {
        match self {
            MockFailure::Transient => {
                Error::ScoringUnavailable(format!("mock 503 on call {call}"))
            }
            MockFailure::Malformed => {
                Error::MalformedScores(format!("mock count mismatch on call {call}"))
            }
            MockFailure::Config => Error::Config(format!("mock 401 on call {call}")),
        }
    }
}

/// One recorded `score` call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub query_id: String,
    pub batch_ids: Vec<String>,
    pub failed: bool,
}

#[derive(Debug, Clone, Default)]
struct MockConfig {
    fixed_scores: HashMap<String, f64>,
    failures: HashMap<usize, MockFailure>,
}

/// Deterministic [`ScoringOracle`] for tests.
#[derive(Clone, Default)]
pub struct MockScoringOracle {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockScoringOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always score `id` with `score` instead of the rubric.
    pub fn with_score(mut self, id: impl Into<String>, score: f64) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_scores
            .insert(id.into(), score);
        self
    }

    /// Fail the zero-based `call`-th invocation of `score`.
    pub fn fail_on_call(mut self, call: usize, failure: MockFailure) -> Self {
        Arc::make_mut(&mut self.config)
            .failures
            .insert(call, failure);
        self
    }

    fn log(&self) -> MutexGuard<'_, Vec<MockCall>> {
        self.call_log.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.log().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log().len()
    }

    /// Ids of every candidate the oracle was asked to score, in call order.
    pub fn scored_ids(&self) -> Vec<String> {
        self.log()
            .iter()
            .flat_map(|c| c.batch_ids.iter().cloned())
            .collect()
    }
}

fn words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

fn tags(items: &[String]) -> BTreeSet<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    shared / union
}

/// Rubric score of `candidate` against `query`.
///
/// Each criterion is 0-1 and scores 0 when one of its inputs is empty.
pub fn rubric_score(query: &Profile, candidate: &Profile) -> f64 {
    let query_idea = words(&query.idea);
    let candidate_interest_words: BTreeSet<String> = candidate
        .interests
        .iter()
        .flat_map(|i| words(i))
        .collect();

    let idea_similarity = jaccard(&query_idea, &words(&candidate.idea));
    let idea_interest = jaccard(&query_idea, &candidate_interest_words);
    let shared_interests = jaccard(&tags(&query.interests), &tags(&candidate.interests));

    let stack = tags(&query.tech_stack);
    let skills = tags(&candidate.metadata.skills);
    let skill_match = if stack.is_empty() || skills.is_empty() {
        0.0
    } else {
        stack.intersection(&skills).count() as f64 / stack.len() as f64
    };

    let overall = (idea_similarity + idea_interest + shared_interests + skill_match) / 4.0;
    let total = idea_similarity + idea_interest + shared_interests + skill_match + overall;
    ((total * 10.0).round() / 10.0).clamp(SCORE_MIN, SCORE_MAX)
}

#[async_trait]
impl ScoringOracle for MockScoringOracle {
    async fn score(&self, query: &Profile, batch: &[Profile]) -> Result<ScoreMap> {
        let failure = {
            let mut log = self.log();
            let call = log.len();
            let failure = self.config.failures.get(&call).map(|f| f.to_error(call));
            log.push(MockCall {
                query_id: query.id.clone(),
                batch_ids: batch.iter().map(|p| p.id.clone()).collect(),
                failed: failure.is_some(),
            });
            failure
        };
        if let Some(err) = failure {
            return Err(err);
        }

        Ok(batch
            .iter()
            .map(|c| {
                let score = self
                    .config
                    .fixed_scores
                    .get(&c.id)
                    .copied()
                    .unwrap_or_else(|| rubric_score(query, c));
                (c.id.clone(), score)
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "mock-rubric"
    }
}

/// Deterministic [`IdeaGenerator`] for tests.
#[derive(Clone, Default)]
pub struct MockIdeaGenerator {
    failing: bool,
    calls: Arc<Mutex<usize>>,
}

impl MockIdeaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call as an unavailable provider would.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self) -> Result<()> {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        *calls += 1;
        if self.failing {
            return Err(Error::ScoringUnavailable(format!("mock 503 on call {}", *calls - 1)));
        }
        Ok(())
    }
}

#[async_trait]
impl IdeaGenerator for MockIdeaGenerator {
    async fn generate_projects(&self, domain: &str) -> Result<Vec<ProjectIdea>> {
        self.record()?;
        Ok((1..=2)
            .map(|n| ProjectIdea {
                title: format!("{domain} project {n}"),
                idea: format!("Idea {n} for a student team working in {domain}."),
                tech_stack: vec!["Python".to_string()],
            })
            .collect())
    }

    async fn suggest_interests(&self, current: &[String]) -> Result<Vec<String>> {
        self.record()?;
        Ok((current.len() + 1..=current.len() + 3)
            .map(|n| format!("Interest {n}"))
            .collect())
    }

    fn model_name(&self) -> &str {
        "mock-generator"
    }
}
