//! Provider pacing for scoring oracles and idea generators.
//!
//! Hosted LLM providers enforce per-minute request and token quotas. The
//! matching loop never sleeps; instead the oracle is wrapped in a token bucket
//! that spaces requests evenly and waits before each call until a permit is
//! available. The generator holds its own bucket the same way.

use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::debug;

use fypmatch_core::{Profile, Result, ScoreMap, ScoringOracle};

/// Token bucket that spaces provider calls evenly.
///
/// The bucket holds a single permit, so calls are spaced evenly instead of
/// bursting at the start of each minute.
pub struct Pacer {
    limiter: Option<DefaultDirectRateLimiter>,
}

impl Pacer {
    /// Allow `requests_per_minute` calls. Zero disables pacing.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let limiter = NonZeroU32::new(requests_per_minute).map(|rpm| {
            RateLimiter::direct(Quota::per_minute(rpm).allow_burst(NonZeroU32::MIN))
        });
        Self { limiter }
    }

    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    pub fn is_active(&self) -> bool {
        self.limiter.is_some()
    }

    /// Wait until a permit is available.
    pub async fn wait(&self, component: &'static str) {
        if let Some(limiter) = &self.limiter {
            if limiter.check().is_err() {
                debug!(
                    subsystem = "inference",
                    component = component,
                    "Waiting for rate limit permit"
                );
                limiter.until_ready().await;
            }
        }
    }
}

/// An oracle that waits for a rate-limit permit before every call.
pub struct ThrottledOracle<O> {
    inner: O,
    pacer: Pacer,
}

impl<O: ScoringOracle> ThrottledOracle<O> {
    /// Wrap `inner`, allowing `requests_per_minute` calls. Zero disables pacing.
    pub fn new(inner: O, requests_per_minute: u32) -> Self {
        Self {
            inner,
            pacer: Pacer::per_minute(requests_per_minute),
        }
    }

    /// Wrap `inner` without any pacing.
    pub fn unthrottled(inner: O) -> Self {
        Self {
            inner,
            pacer: Pacer::unlimited(),
        }
    }

    pub fn is_throttled(&self) -> bool {
        self.pacer.is_active()
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

#[async_trait]
impl<O: ScoringOracle> ScoringOracle for ThrottledOracle<O> {
    async fn score(&self, query: &Profile, batch: &[Profile]) -> Result<ScoreMap> {
        self.pacer.wait("throttle").await;
        self.inner.score(query, batch).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    struct Counting(AtomicUsize);

    #[async_trait]
    impl ScoringOracle for Counting {
        async fn score(&self, _query: &Profile, _batch: &[Profile]) -> Result<ScoreMap> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ScoreMap::new())
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_zero_rate_disables_throttle() {
        let oracle = ThrottledOracle::new(Counting(AtomicUsize::new(0)), 0);
        assert!(!oracle.is_throttled());

        let start = Instant::now();
        for _ in 0..5 {
            oracle.score(&Profile::default(), &[]).await.unwrap();
        }
        assert_eq!(oracle.inner().0.load(Ordering::SeqCst), 5);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_calls_are_spaced() {
        // 1200/min leaves 50ms between calls.
        let oracle = ThrottledOracle::new(Counting(AtomicUsize::new(0)), 1200);
        assert!(oracle.is_throttled());

        let start = Instant::now();
        for _ in 0..3 {
            oracle.score(&Profile::default(), &[]).await.unwrap();
        }
        assert_eq!(oracle.inner().0.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[test]
    fn test_model_name_passes_through() {
        let oracle = ThrottledOracle::unthrottled(Counting(AtomicUsize::new(0)));
        assert_eq!(oracle.model_name(), "counting");
    }

    #[tokio::test]
    async fn test_unlimited_pacer_never_waits() {
        let pacer = Pacer::unlimited();
        assert!(!pacer.is_active());
        let start = Instant::now();
        for _ in 0..10 {
            pacer.wait("test").await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
