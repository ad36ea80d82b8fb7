//! Redis-backed job status store.
//!
//! Each job is one string key `fyp:job:<uuid>` holding the JSON job state.
//! Keys are written when the job is enqueued and again when it finishes.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};
use uuid::Uuid;

use fypmatch_core::defaults::JOB_KEY_PREFIX;
use fypmatch_core::{Error, JobState, JobStatusStore, Result};

use crate::config::JobStoreConfig;

fn storage_err(e: redis::RedisError) -> Error {
    Error::Storage(format!("redis: {}", e))
}

#[derive(Clone)]
pub struct RedisJobStore {
    connection: ConnectionManager,
    ttl_seconds: Option<u64>,
    prefix: String,
}

impl RedisJobStore {
    /// Connect using `config.redis_url`.
    pub async fn connect(config: &JobStoreConfig) -> Result<Self> {
        let client = redis::Client::open(config.redis_url.as_str())
            .map_err(|e| Error::Config(format!("invalid REDIS_URL: {}", e)))?;
        let connection = ConnectionManager::new(client).await.map_err(storage_err)?;

        info!(
            subsystem = "jobs",
            component = "redis_job_store",
            ttl_seconds = config.ttl_seconds.unwrap_or(0),
            "Redis job store connected"
        );

        Ok(Self {
            connection,
            ttl_seconds: config.ttl_seconds,
            prefix: JOB_KEY_PREFIX.to_string(),
        })
    }

    pub fn key(&self, job_id: Uuid) -> String {
        format!("{}{}", self.prefix, job_id)
    }
}

#[async_trait]
impl JobStatusStore for RedisJobStore {
    async fn put(&self, job_id: Uuid, state: &JobState) -> Result<()> {
        let key = self.key(job_id);
        let value = serde_json::to_string(state)?;
        let mut conn = self.connection.clone();

        match self.ttl_seconds {
            Some(ttl) => conn.set_ex::<_, _, ()>(&key, value, ttl).await,
            None => conn.set::<_, _, ()>(&key, value).await,
        }
        .map_err(storage_err)?;

        debug!(
            subsystem = "jobs",
            component = "redis_job_store",
            job_id = %job_id,
            status = state.status(),
            "Job state stored"
        );
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<JobState>> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(self.key(job_id)).await.map_err(storage_err)?;
        raw.map(|s| serde_json::from_str(&s).map_err(Error::from))
            .transpose()
    }
}
