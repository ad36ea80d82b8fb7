//! Request bodies for the match, ingestion and suggestion endpoints.

use serde::Deserialize;
use uuid::Uuid;

use fypmatch_core::{Metadata, Profile};

/// Unknown keys (including a legacy `metadata.id`) are ignored; the profile
/// carries the only id.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataRequest {
    pub department: String,
    pub year: i32,
    pub gpa: f64,
    pub gender: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub email: String,
}

/// Profile as submitted by a client, for matching or ingestion.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    pub domain: String,
    pub idea: String,
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Ignored; scores are only ever assigned by matching.
    #[serde(default)]
    pub score: Option<f64>,
    pub metadata: MetadataRequest,
}

/// Body of `POST /generate_project`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRequest {
    pub domain: String,
}

/// Body of `POST /generate_interests`.
#[derive(Debug, Clone, Deserialize)]
pub struct InterestRequest {
    pub student_id: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl ProfileRequest {
    /// Convert to a domain profile. A missing or blank id gets a fresh UUIDv7.
    pub fn into_profile(self) -> Profile {
        let id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        Profile {
            id,
            title: self.title,
            domain: self.domain,
            idea: self.idea,
            tech_stack: self.tech_stack,
            interests: self.interests,
            score: 0.0,
            metadata: Metadata {
                department: self.metadata.department,
                year: self.metadata.year,
                gpa: self.metadata.gpa,
                gender: self.metadata.gender,
                skills: self.metadata.skills,
                email: self.metadata.email,
            },
        }
    }
}
