//! Project idea and interest suggestions.
//!
//! Both endpoints call the LLM synchronously and share the generator's pacing.
//! Provider errors are logged; clients only see a fixed failure message.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use fypmatch_core::{validate_domain, validate_interest_request};

use crate::error::ApiError;
use crate::requests::{InterestRequest, ProjectRequest};
use crate::state::AppState;

const PROJECT_FAILED: &str = "Project generation failed";
const INTEREST_FAILED: &str = "Interest generation failed";

/// Suggest project ideas for a domain.
pub async fn generate_project(
    State(state): State<AppState>,
    payload: Result<Json<ProjectRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let domain = validate_domain(&req.domain)?;

    let projects = state
        .generator
        .generate_projects(&domain)
        .await
        .map_err(|e| ApiError::internal(PROJECT_FAILED, e))?;

    info!(
        subsystem = "api",
        op = "generate_project",
        model = state.generator.model_name(),
        result_count = projects.len(),
        "Project ideas generated"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "result": {
            "domain": domain,
            "projects": projects,
        },
    })))
}

/// Suggest interests to add to a student's current list.
pub async fn generate_interests(
    State(state): State<AppState>,
    payload: Result<Json<InterestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let (student_id, current) = validate_interest_request(&req.student_id, &req.interests)?;

    let suggested = state
        .generator
        .suggest_interests(&current)
        .await
        .map_err(|e| ApiError::internal(INTEREST_FAILED, e))?;

    info!(
        subsystem = "api",
        op = "generate_interests",
        student_id = %student_id,
        result_count = suggested.len(),
        "Interests suggested"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "result": {
            "student_id": student_id,
            "interests": suggested,
        },
    })))
}
