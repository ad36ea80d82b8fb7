//! # fypmatch-db
//!
//! Candidate store for fypmatch.
//!
//! This crate provides:
//! - Connection pool management
//! - A PostgreSQL [`CandidateStore`](fypmatch_core::CandidateStore) over `std_profile`
//! - An in-memory store for tests and database-less deployments
//!
//! ## Example
//!
//! ```rust,ignore
//! use fypmatch_db::Database;
//! use fypmatch_core::CandidateStore;
//!
//! let db = Database::connect("postgres://localhost/fypmatch").await?;
//! db.migrate().await?;
//! let first_page = db.profiles.fetch_page(0, 20).await?;
//! ```

pub mod memory;
pub mod pool;
pub mod profiles;

// Note: always compiled so other crates' tests can share the sample profiles.
pub mod test_fixtures;

pub use fypmatch_core::{CandidateStore, Error, Profile, Result};
pub use memory::MemoryCandidateStore;
pub use pool::{
    create_pool, create_pool_with_config, log_pool_metrics, spawn_pool_monitor, PoolConfig,
};
pub use profiles::PgProfileRepository;

/// Database context holding the pool and the profile repository.
#[derive(Clone)]
pub struct Database {
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub profiles: PgProfileRepository,
}

impl Database {
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            profiles: PgProfileRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with default pool settings.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
