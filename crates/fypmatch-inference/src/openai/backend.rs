//! OpenAI-compatible scoring oracle implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use fypmatch_core::defaults;
use fypmatch_core::{Profile, Result, ScoreMap, ScoringOracle};

use super::client::{ChatClient, Sampling};
use super::types::ChatMessage;
use crate::parse::parse_scores;
use crate::prompt::{build_user_prompt, SCORING_SYSTEM_PROMPT};

/// Configuration for the OpenAI-compatible scoring client.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Base URL for the API endpoint (without `/chat/completions`).
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
    pub top_p: f32,
    /// Scoring requests allowed per minute; 0 disables throttling.
    pub requests_per_minute: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::SCORING_BASE_URL.to_string(),
            api_key: None,
            model: defaults::SCORING_MODEL.to_string(),
            timeout_seconds: defaults::SCORING_TIMEOUT_SECS,
            temperature: 0.0,
            top_p: defaults::SCORING_TOP_P,
            requests_per_minute: defaults::SCORING_REQUESTS_PER_MINUTE,
        }
    }
}

impl ScoringConfig {
    /// Build from `SCORING_*` environment variables.
    ///
    /// `SCORING_API_KEY` falls back to `GROQ_API_KEY` so a plain Groq setup
    /// works without extra configuration.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            base_url: std::env::var("SCORING_BASE_URL").unwrap_or(d.base_url),
            api_key: std::env::var("SCORING_API_KEY")
                .or_else(|_| std::env::var("GROQ_API_KEY"))
                .ok()
                .filter(|k| !k.is_empty()),
            model: std::env::var("SCORING_MODEL").unwrap_or(d.model),
            timeout_seconds: std::env::var("SCORING_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(d.timeout_seconds),
            requests_per_minute: std::env::var("SCORING_REQUESTS_PER_MINUTE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(d.requests_per_minute),
            ..d
        }
    }
}

/// Scoring oracle backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAIScorer {
    chat: ChatClient,
    config: ScoringConfig,
}

impl OpenAIScorer {
    pub fn new(config: ScoringConfig) -> Result<Self> {
        let chat = ChatClient::new(
            &config.base_url,
            config.api_key.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?;

        info!(
            subsystem = "inference",
            component = "openai",
            model = %config.model,
            url = %config.base_url,
            authenticated = config.api_key.is_some(),
            "Initializing scoring client"
        );

        Ok(Self { chat, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ScoringConfig::from_env())
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    fn sampling(&self) -> Sampling<'_> {
        Sampling {
            model: &self.config.model,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        }
    }
}

#[async_trait]
impl ScoringOracle for OpenAIScorer {
    async fn score(&self, query: &Profile, batch: &[Profile]) -> Result<ScoreMap> {
        if batch.is_empty() {
            return Ok(ScoreMap::new());
        }

        let start = Instant::now();
        let user = build_user_prompt(query, batch)?;
        let messages = vec![
            ChatMessage::system(SCORING_SYSTEM_PROMPT),
            ChatMessage::user(user),
        ];

        let raw = self.chat.complete(self.sampling(), messages).await.inspect_err(|e| {
            warn!(
                subsystem = "inference",
                component = "openai",
                op = "score_batch",
                batch_size = batch.len(),
                transient = e.is_transient(),
                error = %e,
                "Scoring request failed"
            );
        })?;

        let ids: Vec<&str> = batch.iter().map(|p| p.id.as_str()).collect();
        let scores = parse_scores(&raw, &ids)?;

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "score_batch",
            model = %self.config.model,
            batch_size = batch.len(),
            scored_count = scores.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Scored batch"
        );
        Ok(scores)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
