use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use tracing::warn;

use crate::state::AppState;

/// Liveness plus a candidate store probe. Always 200; a failing store
/// reports `degraded`.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, store_profiles) = match state.store.count().await {
        Ok(n) => ("healthy", Some(n)),
        Err(e) => {
            warn!(subsystem = "api", component = "health", error = %e, "Candidate store unreachable");
            ("degraded", None)
        }
    };

    Json(serde_json::json!({
        "status": status,
        "service": "fypmatch-api",
        "version": env!("CARGO_PKG_VERSION"),
        "store_profiles": store_profiles,
    }))
}

/// `Xh Ym Zs`.
fn format_uptime(secs: u64) -> String {
    format!("{}h {}m {}s", secs / 3600, secs % 3600 / 60, secs % 60)
}

/// Health plus uptime, backing services and effective configuration.
pub async fn health_detailed(State(state): State<AppState>) -> impl IntoResponse {
    let (status, candidate_store) = match state.store.count().await {
        Ok(n) => (
            "healthy",
            serde_json::json!({ "status": "connected", "profiles": n }),
        ),
        Err(e) => {
            warn!(subsystem = "api", component = "health", error = %e, "Candidate store unreachable");
            ("degraded", serde_json::json!({ "status": "error" }))
        }
    };

    let uptime = state.started_at.elapsed().as_secs();
    let matcher = state.runner.matcher();
    let matching = matcher.config();

    Json(serde_json::json!({
        "status": status,
        "service": "fypmatch-api",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": uptime,
        "uptime_formatted": format_uptime(uptime),
        "services": {
            "candidate_store": candidate_store,
            "scoring": { "model": matcher.oracle().model_name() },
            "generation": { "model": state.generator.model_name() },
        },
        "configuration": {
            "rate_limit_enabled": state.rate_limiter.is_some(),
            "rate_limit_requests": state.rate_limit.requests,
            "rate_limit_period_secs": state.rate_limit.period_secs,
            "page_size": matching.page_size,
            "top_k": matching.top_k,
            "max_concurrent_jobs": state.runner.config().max_concurrent_jobs,
        },
    }))
}
