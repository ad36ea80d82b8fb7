//! # fypmatch-api
//!
//! HTTP surface of fypmatch: submits match jobs, serves their status,
//! ingests candidate profiles and suggests project ideas and interests.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod requests;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use fypmatch_core::defaults;

pub use config::{AppConfig, HttpConfig};
pub use error::ApiError;
pub use state::AppState;

use handlers::{generation, health, matching, profiles};
use middleware::{rate_limit_middleware, MakeRequestUuidV7};

fn cors_layer(http: &HttpConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(defaults::CORS_MAX_AGE_SECS));

    // Credentials cannot be combined with a wildcard origin.
    if http.allows_any_origin() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_origin(AllowOrigin::list(http.origin_headers()))
            .allow_credentials(true)
    }
}

/// Build the application router with all middleware applied.
pub fn app(state: AppState, http: &HttpConfig) -> Router {
    let limited = Router::new()
        .route("/find_matches", post(matching::find_matches))
        .route("/find_matches/:job_id", get(matching::get_match_status))
        .route("/ingest_user", post(profiles::ingest_user))
        .route("/stats", get(profiles::stats))
        .route("/matching/stats", get(matching::matching_stats))
        .route("/generate_project", post(generation::generate_project))
        .route("/generate_interests", post(generation::generate_interests))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/", get(health::health_check))
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_detailed))
        .route("/matching/validate", post(matching::validate))
        .route("/matching/rate-limit", get(matching::rate_limit_status))
        .merge(limited)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(http))
        .layer(RequestBodyLimitLayer::new(http.max_body_bytes))
        .with_state(state)
}
