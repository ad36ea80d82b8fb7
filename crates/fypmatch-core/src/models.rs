//! Core data models for fypmatch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// PROFILE TYPES
// =============================================================================

/// Academic and contact details attached to a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub department: String,
    /// Two-digit enrollment year (e.g. 22 for 2022).
    pub year: i32,
    pub gpa: f64,
    pub gender: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub email: String,
}

/// A student's final-year-project profile.
///
/// Used both as a stored candidate and as the query of a match job. The
/// `score` field is scoring output; stored records carry a stale value that
/// the selector overwrites on returned copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub domain: String,
    pub idea: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub score: f64,
    pub metadata: Metadata,
}

impl Profile {
    /// Copy of this profile carrying the given score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

// =============================================================================
// SCORE MAP
// =============================================================================

/// Candidate id to compatibility score.
///
/// Entries are only ever added or overwritten (last write wins). Iteration is
/// ordered by id ascending, which makes score ties resolve deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMap(BTreeMap<String, f64>);

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score, replacing any previous score for the same id.
    pub fn insert(&mut self, id: impl Into<String>, score: f64) {
        self.0.insert(id.into(), score);
    }

    /// Merge another map into this one; entries from `other` win.
    pub fn merge(&mut self, other: ScoreMap) {
        self.0.extend(other.0);
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(id, score)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(id, score)| (id.as_str(), *score))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, f64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, f64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(id, s)| (id.to_string(), s)).collect())
    }
}

// =============================================================================
// JOB TYPES
// =============================================================================

/// Status and outcome of a match job, as stored for polling clients.
///
/// Serializes as `{"status":"processing"}`, `{"status":"done","result":[...]}`
/// or `{"status":"error","error":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Processing,
    Done { result: Vec<Profile> },
    Error { error: String },
}

impl JobState {
    /// Whether the job has reached `done` or `error`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Processing)
    }

    /// Status literal as it appears on the wire.
    pub fn status(&self) -> &'static str {
        match self {
            JobState::Processing => "processing",
            JobState::Done { .. } => "done",
            JobState::Error { .. } => "error",
        }
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// A project suggestion produced by an [`IdeaGenerator`](crate::IdeaGenerator).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectIdea {
    pub title: String,
    pub idea: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}
