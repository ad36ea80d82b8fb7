//! In-memory candidate store.
//!
//! Used by tests and by the API when `CANDIDATE_STORE=memory`. Pages follow
//! insertion order; an upsert of an existing id replaces it in place.

use async_trait::async_trait;
use tokio::sync::RwLock;

use fypmatch_core::{CandidateStore, Error, Profile, Result};

#[derive(Default)]
pub struct MemoryCandidateStore {
    profiles: RwLock<Vec<Profile>>,
}

impl MemoryCandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with profiles in the given order.
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            profiles: RwLock::new(profiles.into_iter().collect()),
        }
    }

    /// Remove a profile, returning whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        let mut guard = self.profiles.write().await;
        let before = guard.len();
        guard.retain(|p| p.id != id);
        guard.len() != before
    }
}

#[async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn fetch_page(&self, offset: i64, limit: i64) -> Result<Vec<Profile>> {
        if offset < 0 || limit <= 0 {
            return Err(Error::InvalidInput(format!(
                "invalid page window offset={offset} limit={limit}"
            )));
        }
        let guard = self.profiles.read().await;
        Ok(guard
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Profile>> {
        let guard = self.profiles.read().await;
        Ok(guard
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.profiles.read().await.len() as i64)
    }

    async fn upsert(&self, profile: &Profile) -> Result<()> {
        let mut guard = self.profiles.write().await;
        match guard.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => guard.push(profile.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::sample_profiles;

    #[tokio::test]
    async fn test_pages_do_not_overlap() {
        let store = MemoryCandidateStore::with_profiles(sample_profiles(7));

        let first = store.fetch_page(0, 5).await.unwrap();
        let second = store.fetch_page(5, 5).await.unwrap();
        let third = store.fetch_page(7, 5).await.unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 2);
        assert!(third.is_empty());
        assert_eq!(second[0].id, "s6");
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = MemoryCandidateStore::with_profiles(sample_profiles(3));
        let mut changed = sample_profiles(2).remove(1);
        changed.domain = "Robotics".to_string();

        store.upsert(&changed).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 3);
        let page = store.fetch_page(0, 10).await.unwrap();
        assert_eq!(page[1].id, "s2");
        assert_eq!(page[1].domain, "Robotics");
    }

    #[tokio::test]
    async fn test_fetch_by_ids_skips_missing() {
        let store = MemoryCandidateStore::with_profiles(sample_profiles(3));
        let found = store
            .fetch_by_ids(&["s3".to_string(), "nope".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "s3");
    }

    #[tokio::test]
    async fn test_invalid_window_rejected() {
        let store = MemoryCandidateStore::new();
        assert!(matches!(
            store.fetch_page(0, 0).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(store.fetch_page(-1, 5).await.is_err());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryCandidateStore::with_profiles(sample_profiles(2));
        assert!(store.remove("s1").await);
        assert!(!store.remove("s1").await);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
