//! Profile validation and normalization.
//!
//! Applied to match queries and ingested candidates before they reach the
//! store or the matching loop. Validation collects every field error rather
//! than stopping at the first, so clients can fix a form in one round trip.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::models::Profile;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("static email pattern"));

/// A single validation failure, reported as `{field, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Short description of a validated profile, returned by the validate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub domain: String,
    pub tech_stack_count: usize,
    pub interests_count: usize,
    pub idea_length: usize,
    pub department: String,
    pub year: i32,
}

impl From<&Profile> for ProfileSummary {
    fn from(p: &Profile) -> Self {
        Self {
            domain: p.domain.clone(),
            tech_stack_count: p.tech_stack.len(),
            interests_count: p.interests.len(),
            idea_length: p.idea.chars().count(),
            department: p.metadata.department.clone(),
            year: p.metadata.year,
        }
    }
}

/// Trim entries, drop empty ones and remove duplicates keeping first-seen order.
fn normalize_list(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let t = item.trim();
        if !t.is_empty() && !out.iter().any(|seen| seen == t) {
            out.push(t.to_string());
        }
    }
    out
}

fn check_len(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    (min, max): (usize, usize),
) {
    let n = value.chars().count();
    if n < min {
        errors.push(FieldError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    } else if n > max {
        errors.push(FieldError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
}

fn check_count(
    errors: &mut Vec<FieldError>,
    field: &str,
    items: &[String],
    (min, max): (usize, usize),
) {
    if items.len() < min {
        errors.push(FieldError::new(
            field,
            format!("at least {min} non-empty entry required"),
        ));
    } else if items.len() > max {
        errors.push(FieldError::new(
            field,
            format!("at most {max} entries allowed"),
        ));
    }
}

/// Validate a profile and return its normalized form.
///
/// Normalization trims `idea`, `domain`, `title` and metadata strings, and
/// trims and de-duplicates `tech_stack`, `interests` and `metadata.skills`.
/// Length rules apply to the normalized values.
pub fn validate_profile(mut profile: Profile) -> Result<Profile, Vec<FieldError>> {
    let mut errors = Vec::new();

    profile.title = profile.title.trim().to_string();
    profile.domain = profile.domain.trim().to_string();
    profile.idea = profile.idea.trim().to_string();
    profile.tech_stack = normalize_list(&profile.tech_stack);
    profile.interests = normalize_list(&profile.interests);

    let meta = &mut profile.metadata;
    meta.department = meta.department.trim().to_string();
    meta.gender = meta.gender.trim().to_string();
    meta.email = meta.email.trim().to_string();
    meta.skills = normalize_list(&meta.skills);

    check_len(&mut errors, "title", &profile.title, (0, defaults::TITLE_MAX_LEN));
    check_len(&mut errors, "domain", &profile.domain, defaults::DOMAIN_LEN);
    check_len(&mut errors, "idea", &profile.idea, defaults::IDEA_LEN);
    check_count(
        &mut errors,
        "tech_stack",
        &profile.tech_stack,
        (1, defaults::TECH_STACK_MAX),
    );
    check_count(
        &mut errors,
        "interests",
        &profile.interests,
        (0, defaults::INTERESTS_MAX),
    );

    let meta = &profile.metadata;
    check_len(
        &mut errors,
        "metadata.department",
        &meta.department,
        defaults::DEPARTMENT_LEN,
    );
    let (year_min, year_max) = defaults::YEAR_RANGE;
    if !(year_min..=year_max).contains(&meta.year) {
        errors.push(FieldError::new(
            "metadata.year",
            format!("must be between {year_min} and {year_max}"),
        ));
    }
    let (gpa_min, gpa_max) = defaults::GPA_RANGE;
    if !meta.gpa.is_finite() || meta.gpa < gpa_min || meta.gpa > gpa_max {
        errors.push(FieldError::new(
            "metadata.gpa",
            format!("must be between {gpa_min:.1} and {gpa_max:.1}"),
        ));
    }
    if meta.gender.is_empty() {
        errors.push(FieldError::new("metadata.gender", "is required"));
    }
    check_count(
        &mut errors,
        "metadata.skills",
        &meta.skills,
        (1, defaults::SKILLS_MAX),
    );
    if !EMAIL_SHAPE.is_match(&meta.email) {
        errors.push(FieldError::new(
            "metadata.email",
            "must be a valid email address",
        ));
    }

    if errors.is_empty() {
        Ok(profile)
    } else {
        Err(errors)
    }
}

/// Validate the domain of a project generation request; returns it trimmed.
pub fn validate_domain(domain: &str) -> Result<String, Vec<FieldError>> {
    let domain = domain.trim().to_string();
    let mut errors = Vec::new();
    check_len(&mut errors, "domain", &domain, defaults::DOMAIN_LEN);
    if errors.is_empty() {
        Ok(domain)
    } else {
        Err(errors)
    }
}

/// Validate an interest suggestion request.
///
/// Returns the trimmed student id and the normalized current interests.
pub fn validate_interest_request(
    student_id: &str,
    interests: &[String],
) -> Result<(String, Vec<String>), Vec<FieldError>> {
    let student_id = student_id.trim().to_string();
    let interests = normalize_list(interests);
    let mut errors = Vec::new();
    check_len(&mut errors, "student_id", &student_id, defaults::STUDENT_ID_LEN);
    check_count(
        &mut errors,
        "interests",
        &interests,
        (0, defaults::INTERESTS_MAX),
    );
    if errors.is_empty() {
        Ok((student_id, interests))
    } else {
        Err(errors)
    }
}
