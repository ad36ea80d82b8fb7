//! Candidate profile repository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use fypmatch_core::{CandidateStore, Error, Metadata, Profile, Result};

const PROFILE_COLUMNS: &str =
    "id, title, domain, idea, tech_stack, interests, score, metadata";

/// PostgreSQL implementation of [`CandidateStore`] over the `std_profile` table.
///
/// Pages are ordered by `(created_at, id)`. Upserts keep the original
/// `created_at`, so re-ingesting a profile does not move it in the scan.
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: Pool<Postgres>,
}

impl PgProfileRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn profile_from_row(row: &PgRow) -> Result<Profile> {
    let Json(metadata): Json<Metadata> = row.try_get("metadata")?;
    Ok(Profile {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        domain: row.try_get("domain")?,
        idea: row.try_get("idea")?,
        tech_stack: row.try_get("tech_stack")?,
        interests: row.try_get("interests")?,
        score: row.try_get("score")?,
        metadata,
    })
}

#[async_trait]
impl CandidateStore for PgProfileRepository {
    async fn fetch_page(&self, offset: i64, limit: i64) -> Result<Vec<Profile>> {
        if offset < 0 || limit <= 0 {
            return Err(Error::InvalidInput(format!(
                "invalid page window offset={offset} limit={limit}"
            )));
        }

        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM std_profile
             ORDER BY created_at, id
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "profiles",
            op = "fetch_page",
            offset,
            limit,
            batch_size = rows.len(),
            "Fetched candidate page"
        );

        rows.iter().map(profile_from_row).collect()
    }

    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM std_profile WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM std_profile")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.try_get("n")?)
    }

    async fn upsert(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO std_profile
                (id, title, domain, idea, tech_stack, interests, score, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                domain = EXCLUDED.domain,
                idea = EXCLUDED.idea,
                tech_stack = EXCLUDED.tech_stack,
                interests = EXCLUDED.interests,
                score = EXCLUDED.score,
                metadata = EXCLUDED.metadata,
                updated_at = now()
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.title)
        .bind(&profile.domain)
        .bind(&profile.idea)
        .bind(&profile.tech_stack)
        .bind(&profile.interests)
        .bind(profile.score)
        .bind(Json(&profile.metadata))
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "profiles",
            op = "upsert",
            profile_id = %profile.id,
            "Upserted candidate profile"
        );
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
