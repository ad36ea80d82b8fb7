//! In-memory job status store.
//!
//! Used when Redis is disabled and in tests. Entries live for the lifetime of
//! the process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use fypmatch_core::{JobState, JobStatusStore, Result};

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<Uuid, JobState>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStatusStore for MemoryJobStore {
    async fn put(&self, job_id: Uuid, state: &JobState) -> Result<()> {
        self.jobs.write().await.insert(job_id, state.clone());
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<JobState>> {
        Ok(self.jobs.read().await.get(&job_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_replaces_state() {
        let store = MemoryJobStore::new();
        let id = Uuid::now_v7();

        store.put(id, &JobState::Processing).await.unwrap();
        store
            .put(id, &JobState::Done { result: vec![] })
            .await
            .unwrap();

        assert_eq!(
            store.get(id).await.unwrap(),
            Some(JobState::Done { result: vec![] })
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let store = MemoryJobStore::new();
        assert!(store.get(Uuid::now_v7()).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
