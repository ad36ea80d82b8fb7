//! Scoring and suggestion prompt construction.
//!
//! The oracle only ever sees `id`, `idea`, `interests`, `tech_stack` and
//! `skills` of each profile. Contact details and grades never leave the
//! service. Suggestion prompts carry only the domain or the current interests.

use serde::Serialize;

use fypmatch_core::Profile;

/// System prompt carrying the five-criterion rubric.
pub const SCORING_SYSTEM_PROMPT: &str = "\
You are a student matching system that scores compatibility between student profiles \
for Final Year Projects (FYP).

TASK:
- Score every candidate profile against the query profile using 5 fixed criteria.
- Each criterion is scored between 0.0 and 1.0 with one decimal place.
- The final score is the sum of all 5 criteria (minimum 0.0, maximum 5.0).

SCORING CRITERIA:
1. IDEA_SIMILARITY: 0.0 = unrelated ideas, 1.0 = identical idea.
2. IDEA_INTEREST_MATCH: how well the candidate's interests align with the query's idea.
3. SHARED_INTERESTS: 0.0 = no shared interests, 1.0 = many shared interests.
4. SKILL_MATCH: how well the candidate's skills cover the query's tech stack.
5. OVERALL_COMPATIBILITY: 0.0 = poor fit, 1.0 = excellent fit.

MISSING DATA RULES:
- A criterion whose input field is empty or missing scores 0.0.
- All other criteria are still scored from the available fields.

OUTPUT:
Return a single JSON object with exactly two keys:
{\"id\": [<candidate ids exactly as given>], \"score\": [<final scores as numbers>]}
Both arrays have one entry per candidate, in the same order. No other text.";

/// Fields of a profile that are sent to the oracle.
#[derive(Debug, Serialize)]
pub struct ScoringInput<'a> {
    pub id: &'a str,
    pub idea: &'a str,
    pub interests: &'a [String],
    pub tech_stack: &'a [String],
    pub skills: &'a [String],
}

impl<'a> From<&'a Profile> for ScoringInput<'a> {
    fn from(p: &'a Profile) -> Self {
        Self {
            id: &p.id,
            idea: &p.idea,
            interests: &p.interests,
            tech_stack: &p.tech_stack,
            skills: &p.metadata.skills,
        }
    }
}

#[derive(Debug, Serialize)]
struct ScoringPayload<'a> {
    query: ScoringInput<'a>,
    candidates: Vec<ScoringInput<'a>>,
}

/// Build the user message for one batch.
pub fn build_user_prompt(query: &Profile, batch: &[Profile]) -> serde_json::Result<String> {
    let payload = ScoringPayload {
        query: ScoringInput::from(query),
        candidates: batch.iter().map(ScoringInput::from).collect(),
    };
    let data = serde_json::to_string_pretty(&payload)?;
    Ok(format!(
        "QUERY PROFILE is the student looking for collaborators. \
         Score each of the {} CANDIDATES against it.\n\nINPUT DATA:\n{}",
        batch.len(),
        data
    ))
}

/// System prompt for project idea suggestions.
pub const PROJECT_SYSTEM_PROMPT: &str = "\
You are an academic advisor helping undergraduate students choose a Final Year Project (FYP).

TASK:
- Propose distinct, realistic project ideas within the requested domain.
- Each idea must be achievable by a small student team within one academic year.
- Describe each idea in 2-4 sentences: the problem, the proposed solution, and who benefits.
- List the main technologies the team would use.

OUTPUT:
Return a single JSON object:
{\"projects\": [{\"title\": <short title>, \"idea\": <description>, \"tech_stack\": [<technologies>]}]}
No other text.";

/// System prompt for interest suggestions.
pub const INTEREST_SYSTEM_PROMPT: &str = "\
You help undergraduate students describe their academic interests for project team matching.

TASK:
- Suggest new interests related to the student's current interests.
- Each interest is a short topic name of 1-4 words.
- Never repeat an interest the student already has.
- If the student has no interests yet, suggest broadly popular computing topics.

OUTPUT:
Return a single JSON object:
{\"interests\": [<interest names>]}
No other text.";

/// Build the user message asking for `count` project ideas in `domain`.
pub fn build_project_prompt(domain: &str, count: usize) -> String {
    format!("Suggest {count} Final Year Project ideas in the domain: {domain}")
}

/// Build the user message asking for `count` interests to add to `current`.
pub fn build_interest_prompt(current: &[String], count: usize) -> serde_json::Result<String> {
    Ok(format!(
        "Suggest {count} new interests.\n\nCURRENT INTERESTS:\n{}",
        serde_json::to_string(current)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fypmatch_core::Metadata;

    fn profile(id: &str) -> Profile {
        Profile {
            id: id.to_string(),
            idea: format!("idea of {id}"),
            tech_stack: vec!["Rust".to_string()],
            interests: vec!["Systems".to_string()],
            metadata: Metadata {
                skills: vec!["C".to_string()],
                email: format!("{id}@private.example"),
                gpa: 3.9,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_prompt_contains_every_candidate_id() {
        let batch = vec![profile("c1"), profile("c2")];
        let prompt = build_user_prompt(&profile("q"), &batch).unwrap();
        assert!(prompt.contains("\"c1\""));
        assert!(prompt.contains("\"c2\""));
        assert!(prompt.contains("2 CANDIDATES"));
    }

    #[test]
    fn test_prompt_excludes_contact_and_grades() {
        let prompt = build_user_prompt(&profile("q"), &[profile("c1")]).unwrap();
        assert!(!prompt.contains("private.example"));
        assert!(!prompt.contains("3.9"));
    }

    #[test]
    fn test_scoring_input_takes_skills_from_metadata() {
        let p = profile("x");
        let input = ScoringInput::from(&p);
        assert_eq!(input.skills, ["C".to_string()]);
    }

    #[test]
    fn test_project_prompt_names_domain_and_count() {
        let prompt = build_project_prompt("Cyber Security", 3);
        assert!(prompt.contains("3 Final Year Project ideas"));
        assert!(prompt.ends_with("Cyber Security"));
    }

    #[test]
    fn test_interest_prompt_lists_current_as_json() {
        let current = vec!["Robotics".to_string(), "Computer \"Vision\"".to_string()];
        let prompt = build_interest_prompt(&current, 5).unwrap();
        assert!(prompt.starts_with("Suggest 5 new interests."));
        assert!(prompt.contains(r#"["Robotics","Computer \"Vision\""]"#));
    }
}
