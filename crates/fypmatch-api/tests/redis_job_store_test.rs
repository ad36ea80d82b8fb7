//! Redis job store tests. Require a running Redis:
//!
//! ```bash
//! REDIS_URL=redis://localhost:6379 cargo test -p fypmatch-api -- --ignored
//! ```

use uuid::Uuid;

use fypmatch_api::config::JobStoreConfig;
use fypmatch_api::services::RedisJobStore;
use fypmatch_core::{JobState, JobStatusStore};
use fypmatch_db::test_fixtures::sample_profile;

fn config(ttl_seconds: Option<u64>) -> JobStoreConfig {
    JobStoreConfig {
        redis_enabled: true,
        redis_url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".into()),
        ttl_seconds,
    }
}

#[tokio::test]
#[ignore]
async fn test_put_get_round_trip_through_lifecycle() {
    let store = RedisJobStore::connect(&config(Some(60))).await.unwrap();
    let id = Uuid::now_v7();

    assert!(store.get(id).await.unwrap().is_none());

    store.put(id, &JobState::Processing).await.unwrap();
    assert_eq!(store.get(id).await.unwrap(), Some(JobState::Processing));

    let done = JobState::Done {
        result: vec![sample_profile("s1").with_score(4.0)],
    };
    store.put(id, &done).await.unwrap();
    assert_eq!(store.get(id).await.unwrap(), Some(done));
}

#[tokio::test]
#[ignore]
async fn test_keys_use_job_prefix() {
    let store = RedisJobStore::connect(&config(Some(60))).await.unwrap();
    let id = Uuid::now_v7();
    assert_eq!(store.key(id), format!("fyp:job:{id}"));
}
