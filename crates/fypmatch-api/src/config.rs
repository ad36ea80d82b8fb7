//! Server configuration, assembled once at startup from the environment.

use axum::http::HeaderValue;
use tracing::warn;

use fypmatch_core::defaults;
use fypmatch_inference::{GenerationConfig, ScoringConfig};
use fypmatch_jobs::{MatchConfig, RunnerConfig};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

/// Which candidate store backs the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateStoreKind {
    Postgres,
    /// Process-local store, empty at startup.
    Memory,
}

impl CandidateStoreKind {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Self::Memory,
            "postgres" | "postgresql" | "" => Self::Postgres,
            other => {
                warn!(value = other, "Unknown CANDIDATE_STORE, using postgres");
                Self::Postgres
            }
        }
    }
}

/// Job status store settings.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `REDIS_ENABLED` | `true` | Use Redis; otherwise an in-memory store |
/// | `REDIS_URL` | `redis://localhost:6379` | Redis connection URL |
/// | `REDIS_JOB_TTL` | `0` | Expiry of job keys in seconds, `0` for none |
#[derive(Debug, Clone)]
pub struct JobStoreConfig {
    pub redis_enabled: bool,
    pub redis_url: String,
    pub ttl_seconds: Option<u64>,
}

impl Default for JobStoreConfig {
    fn default() -> Self {
        Self {
            redis_enabled: false,
            redis_url: "redis://localhost:6379".to_string(),
            ttl_seconds: None,
        }
    }
}

impl JobStoreConfig {
    pub fn from_env() -> Self {
        Self {
            redis_enabled: std::env::var("REDIS_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            redis_url: env_or("REDIS_URL", "redis://localhost:6379"),
            ttl_seconds: Some(env_parse("REDIS_JOB_TTL", 0u64)).filter(|t| *t > 0),
        }
    }
}

/// Global request rate limit.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests: u64,
    pub period_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests: defaults::RATE_LIMIT_REQUESTS,
            period_secs: defaults::RATE_LIMIT_PERIOD_SECS,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            enabled: env_flag("RATE_LIMIT_ENABLED", d.enabled),
            requests: env_parse("RATE_LIMIT_REQUESTS", d.requests),
            period_secs: env_parse("RATE_LIMIT_PERIOD_SECS", d.period_secs),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// HTTP layer settings that do not depend on backing services.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Allowed CORS origins; a single `*` allows any origin.
    pub cors_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec!["*".to_string()],
            max_body_bytes: defaults::MAX_BODY_SIZE_BYTES,
        }
    }
}

impl HttpConfig {
    pub fn from_env() -> Self {
        Self {
            cors_origins: split_origins(&env_or("CORS_ORIGINS", "*")),
            ..Self::default()
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }

    /// Origins that parse as header values. Invalid entries are logged and
    /// dropped.
    pub fn origin_headers(&self) -> Vec<HeaderValue> {
        self.cors_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", o, e);
                    None
                }
            })
            .collect()
    }
}

/// Split a comma-separated origin list. An empty list means any origin.
pub fn split_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub candidate_store: CandidateStoreKind,
    pub job_store: JobStoreConfig,
    pub rate_limit: RateLimitConfig,
    pub http: HttpConfig,
    pub matching: MatchConfig,
    pub runner: RunnerConfig,
    pub scoring: ScoringConfig,
    pub generation: GenerationConfig,
}

impl AppConfig {
    /// Read every section from the environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `HOST` | `0.0.0.0` |
    /// | `PORT` | `8000` |
    /// | `DATABASE_URL` | `postgres://localhost/fypmatch` |
    /// | `CANDIDATE_STORE` | `postgres` |
    /// | `CORS_ORIGINS` | `*` |
    ///
    /// Section variables are documented on each section's `from_env`.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", defaults::SERVER_PORT),
            database_url: env_or("DATABASE_URL", "postgres://localhost/fypmatch"),
            candidate_store: CandidateStoreKind::parse(&env_or("CANDIDATE_STORE", "postgres")),
            job_store: JobStoreConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            http: HttpConfig::from_env(),
            matching: MatchConfig::from_env(),
            runner: RunnerConfig::from_env(),
            scoring: ScoringConfig::from_env(),
            generation: GenerationConfig::from_env(),
        }
    }
}
