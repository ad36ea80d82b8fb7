//! Job runner lifecycle tests.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use fypmatch_core::defaults::JOB_FAILED_MESSAGE;
use fypmatch_core::JobState;
use fypmatch_db::test_fixtures::{sample_profile, sample_profiles};
use fypmatch_db::MemoryCandidateStore;
use fypmatch_inference::mock::{MockFailure, MockScoringOracle};
use fypmatch_jobs::{JobRunner, MatchConfig, Matcher, MemoryJobStore, RunnerConfig, RunnerEvent};

fn runner(n: usize, oracle: MockScoringOracle, max_concurrent: usize) -> JobRunner {
    let matcher = Matcher::new(
        Arc::new(MemoryCandidateStore::with_profiles(sample_profiles(n))),
        Arc::new(oracle),
        MatchConfig::default().with_page_size(4),
    );
    JobRunner::new(
        matcher,
        Arc::new(MemoryJobStore::new()),
        RunnerConfig::default().with_max_concurrent(max_concurrent),
    )
}

async fn wait_terminal(runner: &JobRunner, job_id: Uuid) -> JobState {
    for _ in 0..200 {
        match runner.status(job_id).await.unwrap() {
            Some(state) if state.is_terminal() => return state,
            _ => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }
    panic!("job {job_id} did not finish");
}

#[tokio::test]
async fn test_submit_then_poll_until_done() {
    let runner = runner(10, MockScoringOracle::new().with_score("s7", 5.0), 2);

    let job_id = runner.submit(sample_profile("query")).await.unwrap();
    assert!(runner.status(job_id).await.unwrap().is_some());

    match wait_terminal(&runner, job_id).await {
        JobState::Done { result } => {
            assert_eq!(result.len(), 5);
            assert_eq!(result[0].id, "s7");
            assert_eq!(result[0].score, 5.0);
            assert!(result.windows(2).all(|w| w[0].score >= w[1].score));
        }
        other => panic!("expected done, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_job_stores_generic_message() {
    let runner = runner(3, MockScoringOracle::new().fail_on_call(0, MockFailure::Config), 1);

    let job_id = runner.submit(sample_profile("query")).await.unwrap();

    assert_eq!(
        wait_terminal(&runner, job_id).await,
        JobState::Error {
            error: JOB_FAILED_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn test_events_report_lifecycle() {
    let runner = runner(2, MockScoringOracle::new(), 1);
    let mut events = runner.events();

    let job_id = runner.submit(sample_profile("query")).await.unwrap();

    let started = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(started, RunnerEvent::JobStarted { job_id });

    let finished = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        finished,
        RunnerEvent::JobCompleted {
            job_id,
            result_count: 2
        }
    );
}

#[tokio::test]
async fn test_failure_event_carries_internal_cause() {
    let runner = runner(2, MockScoringOracle::new().fail_on_call(0, MockFailure::Malformed), 1);
    let mut events = runner.events();

    let job_id = runner.submit(sample_profile("query")).await.unwrap();

    loop {
        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        if let RunnerEvent::JobFailed { job_id: id, error } = event {
            assert_eq!(id, job_id);
            assert!(error.contains("mock count mismatch"));
            break;
        }
    }
}

#[tokio::test]
async fn test_concurrent_jobs_are_independent() {
    let runner = runner(8, MockScoringOracle::new(), 2);

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(runner.submit(sample_profile(&format!("q{i}"))).await.unwrap());
    }

    for id in ids {
        match wait_terminal(&runner, id).await {
            JobState::Done { result } => assert_eq!(result.len(), 5),
            other => panic!("expected done, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_unknown_job_is_none() {
    let runner = runner(1, MockScoringOracle::new(), 1);
    assert!(runner.status(Uuid::now_v7()).await.unwrap().is_none());
}
