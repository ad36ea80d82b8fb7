//! fypmatch-api - HTTP API server for fypmatch

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fypmatch_api::config::{AppConfig, CandidateStoreKind, JobStoreConfig};
use fypmatch_api::services::RedisJobStore;
use fypmatch_api::AppState;
use fypmatch_core::{CandidateStore, IdeaGenerator, JobStatusStore, ScoringOracle};
use fypmatch_db::{
    log_pool_metrics, spawn_pool_monitor, Database, MemoryCandidateStore, PoolConfig,
};
use fypmatch_inference::{OpenAIGenerator, OpenAIScorer, ThrottledOracle};
use fypmatch_jobs::{JobRunner, Matcher, MemoryJobStore};

/// Initialize tracing.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables daily-rotated file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "fypmatch_api=debug,fypmatch_jobs=debug,fypmatch_inference=info,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = match log_file.as_deref() {
        Some(path) => {
            let path = std::path::Path::new(path);
            let dir = path.parent().unwrap_or(std::path::Path::new("."));
            let name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("fypmatch-api.log");
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));

            if log_format == "json" {
                registry
                    .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                    .init();
            } else {
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(log_ansi.unwrap_or(false));
                registry.with(layer).init();
            }
            Some(guard)
        }
        None => {
            if log_format == "json" {
                registry.with(tracing_subscriber::fmt::layer().json()).init();
            } else {
                let mut layer = tracing_subscriber::fmt::layer();
                if let Some(ansi) = log_ansi {
                    layer = layer.with_ansi(ansi);
                }
                registry.with(layer).init();
            }
            None
        }
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );
    guard
}

async fn candidate_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CandidateStore>> {
    match config.candidate_store {
        CandidateStoreKind::Postgres => {
            info!("Connecting to database...");
            let pool_config = PoolConfig::from_env();
            let metrics_interval = pool_config.metrics_interval;
            let db = Database::connect_with_config(&config.database_url, pool_config).await?;
            info!("Running database migrations...");
            db.migrate().await?;
            log_pool_metrics(&db.pool);
            if let Some(every) = metrics_interval {
                spawn_pool_monitor(db.pool.clone(), every);
            }
            info!("Database ready");
            Ok(Arc::new(db.profiles))
        }
        CandidateStoreKind::Memory => {
            warn!("Using in-memory candidate store; ingested profiles are lost on restart");
            Ok(Arc::new(MemoryCandidateStore::new()))
        }
    }
}

/// Redis when enabled and reachable, otherwise process memory.
async fn job_store(config: &JobStoreConfig) -> Arc<dyn JobStatusStore> {
    if !config.redis_enabled {
        info!("Redis job store disabled via REDIS_ENABLED=false, using memory");
        return Arc::new(MemoryJobStore::new());
    }
    match RedisJobStore::connect(config).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Failed to connect to Redis, job status kept in memory");
            Arc::new(MemoryJobStore::new())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging();

    let config = AppConfig::from_env();
    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if config.rate_limit.enabled {
            "enabled"
        } else {
            "disabled"
        },
        config.rate_limit.requests,
        config.rate_limit.period_secs
    );

    let store = candidate_store(&config).await?;
    let jobs = job_store(&config.job_store).await;

    let rpm = config.scoring.requests_per_minute;
    let oracle: Arc<dyn ScoringOracle> = Arc::new(ThrottledOracle::new(
        OpenAIScorer::new(config.scoring.clone())?,
        rpm,
    ));
    info!(
        model = oracle.model_name(),
        requests_per_minute = rpm,
        "Scoring oracle initialized"
    );

    let matcher = Matcher::new(store, oracle, config.matching.clone());
    let runner = JobRunner::new(matcher, jobs, config.runner.clone());
    info!(
        max_concurrent_jobs = runner.config().max_concurrent_jobs,
        "Job runner ready"
    );

    let generator: Arc<dyn IdeaGenerator> =
        Arc::new(OpenAIGenerator::new(config.generation.clone())?);

    let state = AppState::new(runner, generator, &config.rate_limit);
    let app = fypmatch_api::app(state, &config.http);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
