//! Centralized default constants for fypmatch.
//!
//! **This module is the single source of truth** for shared default values.
//! Component configs fall back to these when an environment variable is unset.

// =============================================================================
// MATCHING
// =============================================================================

/// Candidates fetched per page of the matching loop.
pub const MATCH_PAGE_SIZE: i64 = 20;

/// Number of matches returned to the caller.
pub const MATCH_TOP_K: usize = 5;

/// Upper bound on pages fetched by a single job.
///
/// The candidate store must eventually return an empty page; this bound turns
/// a store that never does into a job error instead of an endless loop.
pub const MATCH_MAX_PAGES: usize = 10_000;

/// Lowest score the rubric can produce.
pub const SCORE_MIN: f64 = 0.0;

/// Highest score the rubric can produce (five criteria, 0-1 each).
pub const SCORE_MAX: f64 = 5.0;

// =============================================================================
// JOB PROCESSING
// =============================================================================

/// Default maximum concurrent match jobs per process.
pub const JOB_MAX_CONCURRENT: usize = 4;

/// Default runner event broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Redis key prefix for job status blobs.
pub const JOB_KEY_PREFIX: &str = "fyp:job:";

/// Message stored on failed jobs. Provider errors are logged, never returned.
pub const JOB_FAILED_MESSAGE: &str = "Match finding failed. Please try again later.";

// =============================================================================
// SCORING
// =============================================================================

/// Default OpenAI-compatible scoring endpoint (Groq).
pub const SCORING_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default scoring model.
pub const SCORING_MODEL: &str = "llama-3.1-8b-instant";

/// Timeout for one scoring request in seconds.
pub const SCORING_TIMEOUT_SECS: u64 = 120;

/// Scoring requests allowed per minute.
///
/// Three per minute spaces batches roughly 20s apart, which keeps a free-tier
/// provider key under its token quota.
pub const SCORING_REQUESTS_PER_MINUTE: u32 = 3;

/// Nucleus sampling parameter sent with scoring requests.
pub const SCORING_TOP_P: f32 = 0.95;

// =============================================================================
// GENERATION
// =============================================================================

/// Default model for project and interest suggestions.
pub const GENERATION_MODEL: &str = "qwen/qwen3-32b";

/// Sampling temperature for suggestions; higher than scoring for variety.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Nucleus sampling parameter for suggestions.
pub const GENERATION_TOP_P: f32 = 0.9;

/// Project ideas requested per generation call.
pub const GENERATION_PROJECT_COUNT: usize = 3;

/// Interests requested per suggestion call.
pub const GENERATION_INTEREST_COUNT: usize = 5;

/// Generation requests allowed per minute, shared by both suggestion kinds.
pub const GENERATION_REQUESTS_PER_MINUTE: u32 = 2;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8000;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size in bytes.
pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024;

/// Profiles sampled by the matching statistics endpoint.
pub const STATS_SAMPLE_SIZE: i64 = 100;

/// Maximum example domains or departments listed by the statistics endpoint.
pub const STATS_SAMPLE_LIST_MAX: usize = 10;

// =============================================================================
// PROFILE VALIDATION
// =============================================================================

/// Maximum project title length.
pub const TITLE_MAX_LEN: usize = 200;

/// Allowed domain length range.
pub const DOMAIN_LEN: (usize, usize) = (3, 100);

/// Allowed idea length range (after trimming).
pub const IDEA_LEN: (usize, usize) = (50, 1000);

/// Maximum tech stack entries.
pub const TECH_STACK_MAX: usize = 25;

/// Allowed student id length range for interest suggestions.
pub const STUDENT_ID_LEN: (usize, usize) = (1, 100);

/// Maximum interest entries.
pub const INTERESTS_MAX: usize = 20;

/// Maximum skill entries.
pub const SKILLS_MAX: usize = 20;

/// Allowed department name length range.
pub const DEPARTMENT_LEN: (usize, usize) = (2, 100);

/// Allowed enrollment year range (two-digit year, e.g. 22 for 2022).
pub const YEAR_RANGE: (i32, i32) = (19, 25);

/// Allowed GPA range.
pub const GPA_RANGE: (f64, f64) = (2.0, 4.0);
