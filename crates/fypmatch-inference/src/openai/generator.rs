//! OpenAI-compatible project and interest suggestions.

use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use fypmatch_core::defaults;
use fypmatch_core::{IdeaGenerator, ProjectIdea, Result};

use super::client::{ChatClient, Sampling};
use super::types::ChatMessage;
use crate::parse::{parse_interests, parse_projects};
use crate::prompt::{
    build_interest_prompt, build_project_prompt, INTEREST_SYSTEM_PROMPT, PROJECT_SYSTEM_PROMPT,
};
use crate::throttle::Pacer;

/// Configuration for the suggestion client.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Base URL for the API endpoint (without `/chat/completions`).
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub project_count: usize,
    pub interest_count: usize,
    /// Generation requests allowed per minute; 0 disables pacing.
    pub requests_per_minute: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::SCORING_BASE_URL.to_string(),
            api_key: None,
            model: defaults::GENERATION_MODEL.to_string(),
            timeout_seconds: defaults::SCORING_TIMEOUT_SECS,
            temperature: defaults::GENERATION_TEMPERATURE,
            top_p: defaults::GENERATION_TOP_P,
            project_count: defaults::GENERATION_PROJECT_COUNT,
            interest_count: defaults::GENERATION_INTEREST_COUNT,
            requests_per_minute: defaults::GENERATION_REQUESTS_PER_MINUTE,
        }
    }
}

impl GenerationConfig {
    /// Build from `GENERATION_*` environment variables.
    ///
    /// Endpoint and key fall back to the scoring settings, so one provider
    /// account serves both.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            base_url: std::env::var("GENERATION_BASE_URL")
                .or_else(|_| std::env::var("SCORING_BASE_URL"))
                .unwrap_or(d.base_url),
            api_key: std::env::var("GENERATION_API_KEY")
                .or_else(|_| std::env::var("SCORING_API_KEY"))
                .or_else(|_| std::env::var("GROQ_API_KEY"))
                .ok()
                .filter(|k| !k.is_empty()),
            model: std::env::var("GENERATION_MODEL").unwrap_or(d.model),
            timeout_seconds: env_parse("GENERATION_TIMEOUT").unwrap_or(d.timeout_seconds),
            temperature: env_parse("GENERATION_TEMPERATURE").unwrap_or(d.temperature),
            project_count: env_parse("GENERATION_PROJECT_COUNT")
                .unwrap_or(d.project_count)
                .max(1),
            interest_count: env_parse("GENERATION_INTEREST_COUNT")
                .unwrap_or(d.interest_count)
                .max(1),
            requests_per_minute: env_parse("GENERATION_REQUESTS_PER_MINUTE")
                .unwrap_or(d.requests_per_minute),
            ..d
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// [`IdeaGenerator`] backed by an OpenAI-compatible chat completions endpoint.
///
/// Holds its own token bucket, so suggestion traffic never delays scoring.
pub struct OpenAIGenerator {
    chat: ChatClient,
    config: GenerationConfig,
    pacer: Pacer,
}

impl OpenAIGenerator {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let chat = ChatClient::new(
            &config.base_url,
            config.api_key.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?;

        info!(
            subsystem = "inference",
            component = "generator",
            model = %config.model,
            url = %config.base_url,
            requests_per_minute = config.requests_per_minute,
            "Initializing suggestion client"
        );

        Ok(Self {
            chat,
            pacer: Pacer::per_minute(config.requests_per_minute),
            config,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GenerationConfig::from_env())
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    async fn ask(&self, op: &'static str, system: &str, user: String) -> Result<String> {
        self.pacer.wait("generator").await;
        let sampling = Sampling {
            model: &self.config.model,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };
        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        self.chat.complete(sampling, messages).await.inspect_err(|e| {
            warn!(
                subsystem = "inference",
                component = "generator",
                op = op,
                error = %e,
                "Suggestion request failed"
            );
        })
    }
}

#[async_trait]
impl IdeaGenerator for OpenAIGenerator {
    async fn generate_projects(&self, domain: &str) -> Result<Vec<ProjectIdea>> {
        let start = Instant::now();
        let prompt = build_project_prompt(domain, self.config.project_count);
        let raw = self
            .ask("generate_projects", PROJECT_SYSTEM_PROMPT, prompt)
            .await?;

        let mut projects = parse_projects(&raw)?;
        projects.truncate(self.config.project_count);

        debug!(
            subsystem = "inference",
            component = "generator",
            op = "generate_projects",
            model = %self.config.model,
            result_count = projects.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generated project ideas"
        );
        Ok(projects)
    }

    async fn suggest_interests(&self, current: &[String]) -> Result<Vec<String>> {
        let start = Instant::now();
        let prompt = build_interest_prompt(current, self.config.interest_count)?;
        let raw = self
            .ask("suggest_interests", INTEREST_SYSTEM_PROMPT, prompt)
            .await?;

        let mut interests = parse_interests(&raw, current)?;
        interests.truncate(self.config.interest_count);

        debug!(
            subsystem = "inference",
            component = "generator",
            op = "suggest_interests",
            model = %self.config.model,
            result_count = interests.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Suggested interests"
        );
        Ok(interests)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
