//! Scoring loop behaviour against in-memory stores and the mock oracle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use fypmatch_core::{CandidateStore, Error, Profile, Result};
use fypmatch_db::test_fixtures::{sample_profile, sample_profiles};
use fypmatch_db::MemoryCandidateStore;
use fypmatch_inference::mock::{MockFailure, MockScoringOracle};
use fypmatch_jobs::{MatchConfig, Matcher};

/// Wraps a store and counts `fetch_page` calls.
struct CountingStore<S> {
    inner: S,
    fetches: AtomicUsize,
}

impl<S> CountingStore<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            fetches: AtomicUsize::new(0),
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: CandidateStore> CandidateStore for CountingStore<S> {
    async fn fetch_page(&self, offset: i64, limit: i64) -> Result<Vec<Profile>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_page(offset, limit).await
    }

    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Profile>> {
        self.inner.fetch_by_ids(ids).await
    }

    async fn count(&self) -> Result<i64> {
        self.inner.count().await
    }

    async fn upsert(&self, profile: &Profile) -> Result<()> {
        self.inner.upsert(profile).await
    }
}

/// Never runs out of candidates.
struct EndlessStore;

#[async_trait]
impl CandidateStore for EndlessStore {
    async fn fetch_page(&self, offset: i64, _limit: i64) -> Result<Vec<Profile>> {
        Ok(vec![sample_profile(&format!("e{offset}"))])
    }

    async fn fetch_by_ids(&self, _ids: &[String]) -> Result<Vec<Profile>> {
        Ok(vec![])
    }

    async fn count(&self) -> Result<i64> {
        Ok(i64::MAX)
    }

    async fn upsert(&self, _profile: &Profile) -> Result<()> {
        Ok(())
    }
}

/// Returns the same id on the first two pages, then runs dry.
struct OverlappingStore;

#[async_trait]
impl CandidateStore for OverlappingStore {
    async fn fetch_page(&self, offset: i64, _limit: i64) -> Result<Vec<Profile>> {
        Ok(match offset {
            0 => vec![sample_profile("dup"), sample_profile("a")],
            2 => vec![sample_profile("dup")],
            _ => vec![],
        })
    }

    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Profile>> {
        Ok(ids.iter().map(|id| sample_profile(id)).collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(2)
    }

    async fn upsert(&self, _profile: &Profile) -> Result<()> {
        Ok(())
    }
}

/// Fails on the second page.
struct FlakyStore;

#[async_trait]
impl CandidateStore for FlakyStore {
    async fn fetch_page(&self, offset: i64, _limit: i64) -> Result<Vec<Profile>> {
        if offset == 0 {
            Ok(sample_profiles(2))
        } else {
            Err(Error::Storage("connection reset".into()))
        }
    }

    async fn fetch_by_ids(&self, _ids: &[String]) -> Result<Vec<Profile>> {
        Ok(vec![])
    }

    async fn count(&self) -> Result<i64> {
        Ok(2)
    }

    async fn upsert(&self, _profile: &Profile) -> Result<()> {
        Ok(())
    }
}

fn query() -> Profile {
    sample_profile("query")
}

#[tokio::test]
async fn test_fetch_count_is_pages_plus_one() {
    for (n, page) in [(1usize, 20i64), (5, 20), (20, 20), (21, 20), (7, 3), (9, 3), (10, 1)] {
        let store = Arc::new(CountingStore::new(MemoryCandidateStore::with_profiles(
            sample_profiles(n),
        )));
        let matcher = Matcher::new(
            store.clone(),
            Arc::new(MockScoringOracle::new()),
            MatchConfig::default().with_page_size(page),
        );

        let state = matcher.run(query()).await.unwrap();

        let expected = (n as i64 + page - 1) / page + 1;
        assert_eq!(store.fetches() as i64, expected, "n={n} page={page}");
        assert_eq!(state.pages_fetched as i64, expected);
        assert_eq!(state.scores.len(), n);
    }
}

#[tokio::test]
async fn test_empty_store_is_done_immediately() {
    let store = Arc::new(CountingStore::new(MemoryCandidateStore::new()));
    let oracle = MockScoringOracle::new();
    let matcher = Matcher::new(store.clone(), Arc::new(oracle.clone()), MatchConfig::default());

    let state = matcher.run(query()).await.unwrap();
    assert!(state.done);
    assert!(state.scores.is_empty());
    assert_eq!(store.fetches(), 1);
    assert_eq!(oracle.call_count(), 0);

    let result = matcher.find_matches(query()).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_five_candidates_single_page() {
    let store = Arc::new(CountingStore::new(MemoryCandidateStore::with_profiles(
        sample_profiles(5),
    )));
    let oracle = MockScoringOracle::new()
        .with_score("s1", 1.0)
        .with_score("s2", 4.5)
        .with_score("s3", 3.0)
        .with_score("s4", 0.5)
        .with_score("s5", 2.0);
    let matcher = Matcher::new(
        store.clone(),
        Arc::new(oracle.clone()),
        MatchConfig::default().with_page_size(20).with_top_k(5),
    );

    let result = matcher.find_matches(query()).await.unwrap();

    assert_eq!(store.fetches(), 2);
    assert_eq!(oracle.call_count(), 1);
    assert_eq!(oracle.calls()[0].batch_ids.len(), 5);

    let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["s2", "s3", "s5", "s1", "s4"]);
    let scores: Vec<f64> = result.iter().map(|p| p.score).collect();
    assert_eq!(scores, vec![4.5, 3.0, 2.0, 1.0, 0.5]);
}

/// Pages see every candidate, but `gone` is deleted before hydration.
struct DeletedAfterScoringStore {
    inner: MemoryCandidateStore,
    gone: &'static str,
}

#[async_trait]
impl CandidateStore for DeletedAfterScoringStore {
    async fn fetch_page(&self, offset: i64, limit: i64) -> Result<Vec<Profile>> {
        self.inner.fetch_page(offset, limit).await
    }

    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Profile>> {
        let mut found = self.inner.fetch_by_ids(ids).await?;
        found.retain(|p| p.id != self.gone);
        Ok(found)
    }

    async fn count(&self) -> Result<i64> {
        self.inner.count().await
    }

    async fn upsert(&self, profile: &Profile) -> Result<()> {
        self.inner.upsert(profile).await
    }
}

#[tokio::test]
async fn test_deleted_top_candidate_is_replaced_by_next_ranked() {
    let store = DeletedAfterScoringStore {
        inner: MemoryCandidateStore::with_profiles(sample_profiles(4)),
        gone: "s2",
    };
    let oracle = MockScoringOracle::new()
        .with_score("s1", 3.0)
        .with_score("s2", 5.0)
        .with_score("s3", 2.0)
        .with_score("s4", 1.0);
    let matcher = Matcher::new(
        Arc::new(store),
        Arc::new(oracle),
        MatchConfig::default().with_page_size(10).with_top_k(2),
    );

    let result = matcher.find_matches(query()).await.unwrap();

    let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s3"]);
}

#[tokio::test]
async fn test_transient_failure_skips_only_that_batch() {
    let oracle = MockScoringOracle::new().fail_on_call(1, MockFailure::Transient);
    let matcher = Matcher::new(
        Arc::new(MemoryCandidateStore::with_profiles(sample_profiles(6))),
        Arc::new(oracle.clone()),
        MatchConfig::default().with_page_size(2),
    );

    let state = matcher.run(query()).await.unwrap();

    assert!(state.done);
    assert_eq!(oracle.call_count(), 3);
    assert_eq!(state.skipped_batches, 1);
    for id in ["s1", "s2", "s5", "s6"] {
        assert!(state.scores.contains(id), "{id} should be scored");
    }
    for id in ["s3", "s4"] {
        assert!(!state.scores.contains(id), "{id} came from the failed batch");
    }
}

#[tokio::test]
async fn test_transient_failure_job_still_returns_matches() {
    let oracle = MockScoringOracle::new().fail_on_call(1, MockFailure::Transient);
    let matcher = Matcher::new(
        Arc::new(MemoryCandidateStore::with_profiles(sample_profiles(6))),
        Arc::new(oracle),
        MatchConfig::default().with_page_size(2).with_top_k(10),
    );

    let result = matcher.find_matches(query()).await.unwrap();
    assert_eq!(result.len(), 4);
}

#[tokio::test]
async fn test_merge_is_last_write_wins() {
    // First page scored by one oracle, the rest by another that rates "dup"
    // differently.
    let first = MockScoringOracle::new().with_score("dup", 1.0).with_score("a", 2.0);
    let matcher = Matcher::new(
        Arc::new(OverlappingStore),
        Arc::new(first.clone()),
        MatchConfig::default().with_page_size(2),
    );
    let mut state = fypmatch_jobs::MatchState::new(query(), 2);
    matcher.step(&mut state).await.unwrap();
    assert_eq!(state.scores.get("dup"), Some(1.0));

    let later = MockScoringOracle::new().with_score("dup", 4.0);
    let matcher = Matcher::new(
        Arc::new(OverlappingStore),
        Arc::new(later),
        MatchConfig::default().with_page_size(2),
    );
    while !state.done {
        matcher.step(&mut state).await.unwrap();
    }

    assert_eq!(state.scores.get("dup"), Some(4.0));
    assert_eq!(state.scores.get("a"), Some(2.0));
    assert_eq!(state.scores.len(), 2);
}

#[tokio::test]
async fn test_malformed_oracle_output_fails_job() {
    let oracle = MockScoringOracle::new().fail_on_call(0, MockFailure::Malformed);
    let matcher = Matcher::new(
        Arc::new(MemoryCandidateStore::with_profiles(sample_profiles(3))),
        Arc::new(oracle),
        MatchConfig::default(),
    );

    let err = matcher.find_matches(query()).await.unwrap_err();
    assert!(matches!(err, Error::MalformedScores(_)));
}

#[tokio::test]
async fn test_page_bound_stops_endless_store() {
    let oracle = MockScoringOracle::new();
    let matcher = Matcher::new(
        Arc::new(EndlessStore),
        Arc::new(oracle.clone()),
        MatchConfig::default().with_max_pages(5),
    );

    let err = matcher.run(query()).await.unwrap_err();
    assert!(matches!(err, Error::Job(_)));
    assert_eq!(oracle.call_count(), 5);
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let matcher = Matcher::new(
        Arc::new(FlakyStore),
        Arc::new(MockScoringOracle::new()),
        MatchConfig::default().with_page_size(2),
    );

    let err = matcher.run(query()).await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
}
