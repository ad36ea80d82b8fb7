//! Match job submission, polling, profile validation and matching metadata.

use std::collections::BTreeSet;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{debug, info};
use uuid::Uuid;

use fypmatch_core::defaults::{STATS_SAMPLE_LIST_MAX, STATS_SAMPLE_SIZE};
use fypmatch_core::{validate_profile, JobState, Profile, ProfileSummary};

use crate::error::ApiError;
use crate::requests::ProfileRequest;
use crate::state::AppState;

const JOB_NOT_FOUND: &str = "Job not found";

/// Validate the query profile and enqueue a match job. Returns 202 with the
/// job id; the result is polled from [`get_match_status`].
pub async fn find_matches(
    State(state): State<AppState>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let query = validate_profile(req.into_profile())?;
    let profile_id = query.id.clone();

    let job_id = state
        .runner
        .submit(query)
        .await
        .map_err(|e| ApiError::internal("Match finding failed", e))?;

    info!(
        subsystem = "api",
        op = "find_matches",
        job_id = %job_id,
        profile_id = %profile_id,
        "Match job accepted"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "success": true,
            "job_id": job_id,
            "status": "processing",
        })),
    ))
}

/// Current state of a match job. Ids that are unknown or not UUIDs are 404.
pub async fn get_match_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobState>, ApiError> {
    let job_id =
        Uuid::parse_str(&job_id).map_err(|_| ApiError::NotFound(JOB_NOT_FOUND.to_string()))?;

    state
        .runner
        .status(job_id)
        .await
        .map_err(|e| ApiError::internal("Failed to read job status", e))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(JOB_NOT_FOUND.to_string()))
}

/// Validate a profile without matching. Not rate limited.
pub async fn validate(
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let profile = validate_profile(req.into_profile())?;
    debug!(subsystem = "api", op = "validate", "Profile validation passed");

    Ok(Json(serde_json::json!({
        "valid": true,
        "message": "Profile validation successful",
        "profile_summary": ProfileSummary::from(&profile),
    })))
}

/// Domain, department and tech stack statistics over a sample of the store.
#[derive(Debug, PartialEq, serde::Serialize)]
pub struct SampleStats {
    pub unique_domains: usize,
    pub unique_departments: usize,
    pub avg_tech_stack_size: f64,
    pub sample_domains: Vec<String>,
    pub sample_departments: Vec<String>,
}

impl SampleStats {
    /// Summarize `sample`; names are listed sorted, at most
    /// `STATS_SAMPLE_LIST_MAX` each, and the average is rounded to one decimal.
    pub fn from_sample(sample: &[Profile]) -> Self {
        let domains: BTreeSet<&str> = sample.iter().map(|p| p.domain.as_str()).collect();
        let departments: BTreeSet<&str> = sample
            .iter()
            .map(|p| p.metadata.department.as_str())
            .collect();
        let avg = if sample.is_empty() {
            0.0
        } else {
            let total: usize = sample.iter().map(|p| p.tech_stack.len()).sum();
            (total as f64 / sample.len() as f64 * 10.0).round() / 10.0
        };
        let listed = |set: &BTreeSet<&str>| -> Vec<String> {
            set.iter()
                .take(STATS_SAMPLE_LIST_MAX)
                .map(|s| s.to_string())
                .collect()
        };

        Self {
            unique_domains: domains.len(),
            unique_departments: departments.len(),
            avg_tech_stack_size: avg,
            sample_domains: listed(&domains),
            sample_departments: listed(&departments),
        }
    }
}

/// Candidate pool statistics computed from the first `STATS_SAMPLE_SIZE`
/// profiles in store order.
pub async fn matching_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    const FAILED: &str = "Unable to retrieve statistics";

    let total = state
        .store
        .count()
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;
    if total == 0 {
        return Ok(Json(serde_json::json!({
            "total_profiles": 0,
            "status": "No data available",
            "message": "No student profiles are available for matching yet",
        })));
    }

    let sample = state
        .store
        .fetch_page(0, STATS_SAMPLE_SIZE)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;
    let stats = SampleStats::from_sample(&sample);

    Ok(Json(serde_json::json!({
        "total_profiles": total,
        "status": "Data available",
        "sample_size": sample.len(),
        "unique_domains": stats.unique_domains,
        "unique_departments": stats.unique_departments,
        "avg_tech_stack_size": stats.avg_tech_stack_size,
        "sample_domains": stats.sample_domains,
        "sample_departments": stats.sample_departments,
    })))
}

/// Configured request limit for the rate-limited routes.
pub async fn rate_limit_status(State(state): State<AppState>) -> impl IntoResponse {
    let limit = &state.rate_limit;
    if state.rate_limiter.is_some() {
        Json(serde_json::json!({
            "enabled": true,
            "requests": limit.requests,
            "period_secs": limit.period_secs,
            "message": "Rate limiting is active",
        }))
    } else {
        Json(serde_json::json!({
            "enabled": false,
            "message": "Rate limiting is disabled",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fypmatch_db::test_fixtures::sample_profile;

    fn profile(id: &str, domain: &str, department: &str, stack: usize) -> Profile {
        let mut p = sample_profile(id);
        p.domain = domain.to_string();
        p.metadata.department = department.to_string();
        p.tech_stack = (0..stack).map(|i| format!("tool-{i}")).collect();
        p
    }

    #[test]
    fn test_sample_stats_counts_and_rounds() {
        let sample = vec![
            profile("a", "Web Development", "CS", 2),
            profile("b", "AI", "CS", 3),
            profile("c", "Web Development", "SE", 2),
        ];
        let stats = SampleStats::from_sample(&sample);

        assert_eq!(stats.unique_domains, 2);
        assert_eq!(stats.unique_departments, 2);
        assert_eq!(stats.avg_tech_stack_size, 2.3);
        assert_eq!(stats.sample_domains, vec!["AI", "Web Development"]);
    }

    #[test]
    fn test_sample_lists_are_capped() {
        let sample: Vec<Profile> = (0..15)
            .map(|i| profile(&format!("p{i}"), &format!("Domain {i:02}"), "CS", 1))
            .collect();
        let stats = SampleStats::from_sample(&sample);

        assert_eq!(stats.unique_domains, 15);
        assert_eq!(stats.sample_domains.len(), STATS_SAMPLE_LIST_MAX);
        assert_eq!(stats.avg_tech_stack_size, 1.0);
    }
}
