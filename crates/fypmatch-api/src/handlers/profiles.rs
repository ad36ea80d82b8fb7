//! Candidate ingestion and store statistics.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use fypmatch_core::validate_profile;

use crate::error::ApiError;
use crate::requests::ProfileRequest;
use crate::state::AppState;

/// Validate and upsert a candidate profile.
pub async fn ingest_user(
    State(state): State<AppState>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let profile = validate_profile(req.into_profile())?;

    state
        .store
        .upsert(&profile)
        .await
        .map_err(|e| ApiError::internal("User ingestion failed", e))?;

    info!(subsystem = "api", op = "ingest_user", profile_id = %profile.id, "Candidate ingested");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "User data ingested successfully",
        "id": profile.id,
    })))
}

pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let total = state
        .store
        .count()
        .await
        .map_err(|e| ApiError::internal("Failed to get stats", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "total_profiles": total,
    })))
}
