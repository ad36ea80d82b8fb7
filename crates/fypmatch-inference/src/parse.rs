//! Parsing of model answers.
//!
//! Scoring answers become a [`ScoreMap`]. The expected answer is
//! `{"id": [...], "score": [...]}` with parallel arrays. A flat
//! `{"<id>": <score>}` object is also accepted since some models drift to it
//! despite the instructions.
//!
//! Suggestion answers are `{"projects": [...]}` or `{"interests": [...]}`; a
//! bare array is accepted for both.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use fypmatch_core::defaults::{SCORE_MAX, SCORE_MIN};
use fypmatch_core::{Error, ProjectIdea, Result, ScoreMap};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("static code fence pattern")
});

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    match CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

fn score_value(id: &str, v: &Value) -> Result<f64> {
    let score = v
        .as_f64()
        .ok_or_else(|| Error::MalformedScores(format!("score for {id} is not a number: {v}")))?;
    if !score.is_finite() {
        return Err(Error::MalformedScores(format!(
            "score for {id} is not finite"
        )));
    }
    Ok(score.clamp(SCORE_MIN, SCORE_MAX))
}

fn parallel_pairs(ids: &[Value], scores: &[Value]) -> Result<Vec<(String, f64)>> {
    if ids.len() != scores.len() {
        return Err(Error::MalformedScores(format!(
            "{} ids but {} scores",
            ids.len(),
            scores.len()
        )));
    }
    ids.iter()
        .zip(scores)
        .map(|(id, score)| {
            let id = id
                .as_str()
                .ok_or_else(|| Error::MalformedScores(format!("id is not a string: {id}")))?;
            Ok((id.to_string(), score_value(id, score)?))
        })
        .collect()
}

fn flat_pairs(obj: &Map<String, Value>) -> Result<Vec<(String, f64)>> {
    obj.iter()
        .map(|(id, v)| Ok((id.clone(), score_value(id, v)?)))
        .collect()
}

/// Parse a raw oracle answer for a batch with the given ids.
///
/// Scores are clamped to the rubric range. Ids that were not in the batch are
/// dropped with a warning. A count mismatch or a non-numeric score fails the
/// whole batch with [`Error::MalformedScores`].
pub fn parse_scores(raw: &str, batch_ids: &[&str]) -> Result<ScoreMap> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::MalformedScores(format!("answer is not JSON: {e}")))?;

    let obj = value
        .as_object()
        .ok_or_else(|| Error::MalformedScores("answer is not a JSON object".to_string()))?;

    let pairs = match (obj.get("id"), obj.get("score")) {
        (Some(Value::Array(ids)), Some(Value::Array(scores))) => parallel_pairs(ids, scores)?,
        (Some(_), _) | (_, Some(_)) => {
            return Err(Error::MalformedScores(
                "`id` and `score` must both be arrays".to_string(),
            ))
        }
        (None, None) => flat_pairs(obj)?,
    };

    let mut map = ScoreMap::new();
    for (id, score) in pairs {
        if batch_ids.contains(&id.as_str()) {
            map.insert(id, score);
        } else {
            warn!(
                subsystem = "inference",
                component = "parse",
                profile_id = %id,
                "Dropping score for id not in batch"
            );
        }
    }
    Ok(map)
}

/// Parse a suggestion answer down to the array under `key`.
fn suggestion_items(raw: &str, key: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| Error::Inference(format!("answer is not JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(Error::Inference(format!("answer has no `{key}` array"))),
        },
        _ => Err(Error::Inference("answer is not a JSON object".to_string())),
    }
}

/// Parse a project suggestion answer.
///
/// Entries without a title or idea are dropped; an answer with no usable
/// entry is an [`Error::Inference`].
pub fn parse_projects(raw: &str) -> Result<Vec<ProjectIdea>> {
    let mut projects = Vec::new();
    for item in suggestion_items(raw, "projects")? {
        let Ok(mut project) = serde_json::from_value::<ProjectIdea>(item) else {
            warn!(
                subsystem = "inference",
                component = "parse",
                "Dropping project suggestion with unexpected shape"
            );
            continue;
        };
        project.title = project.title.trim().to_string();
        project.idea = project.idea.trim().to_string();
        project.tech_stack = project
            .tech_stack
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if project.title.is_empty() || project.idea.is_empty() {
            continue;
        }
        projects.push(project);
    }

    if projects.is_empty() {
        return Err(Error::Inference("answer has no usable project".to_string()));
    }
    Ok(projects)
}

/// Parse an interest suggestion answer.
///
/// Suggestions are trimmed and de-duplicated case-insensitively, both among
/// themselves and against `current`. Non-string entries are dropped.
pub fn parse_interests(raw: &str, current: &[String]) -> Result<Vec<String>> {
    let mut seen: Vec<String> = current.iter().map(|i| i.trim().to_lowercase()).collect();
    let mut interests = Vec::new();
    for item in suggestion_items(raw, "interests")? {
        let Some(interest) = item.as_str().map(str::trim).filter(|i| !i.is_empty()) else {
            continue;
        };
        let key = interest.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            interests.push(interest.to_string());
        }
    }

    if interests.is_empty() {
        return Err(Error::Inference("answer has no new interest".to_string()));
    }
    Ok(interests)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &[&str] = &["a", "b", "c"];

    #[test]
    fn test_parallel_arrays() {
        let map = parse_scores(r#"{"id":["a","b"],"score":[3.5,1.0]}"#, BATCH).unwrap();
        assert_eq!(map.get("a"), Some(3.5));
        assert_eq!(map.get("b"), Some(1.0));
        assert!(!map.contains("c"));
    }

    #[test]
    fn test_flat_object() {
        let map = parse_scores(r#"{"a": 2.2, "c": 0.4}"#, BATCH).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("c"), Some(0.4));
    }

    #[test]
    fn test_code_fence_stripped() {
        let raw = "Here you go:\n```json\n{\"id\":[\"a\"],\"score\":[4]}\n```";
        let map = parse_scores(raw, BATCH).unwrap();
        assert_eq!(map.get("a"), Some(4.0));
    }

    #[test]
    fn test_count_mismatch_is_malformed() {
        let err = parse_scores(r#"{"id":["a","b"],"score":[1.0]}"#, BATCH).unwrap_err();
        assert!(matches!(err, Error::MalformedScores(_)));
        assert!(err.to_string().contains("2 ids but 1 scores"));
    }

    #[test]
    fn test_non_numeric_score_is_malformed() {
        let err = parse_scores(r#"{"id":["a"],"score":["high"]}"#, BATCH).unwrap_err();
        assert!(matches!(err, Error::MalformedScores(_)));
    }

    #[test]
    fn test_only_one_key_is_malformed() {
        let err = parse_scores(r#"{"id":["a"]}"#, BATCH).unwrap_err();
        assert!(matches!(err, Error::MalformedScores(_)));
    }

    #[test]
    fn test_unknown_ids_dropped() {
        let map = parse_scores(r#"{"id":["a","zz"],"score":[1.0,2.0]}"#, BATCH).unwrap();
        assert_eq!(map.len(), 1);
        assert!(!map.contains("zz"));
    }

    #[test]
    fn test_scores_clamped_to_rubric_range() {
        let map = parse_scores(r#"{"id":["a","b"],"score":[7.5,-1]}"#, BATCH).unwrap();
        assert_eq!(map.get("a"), Some(5.0));
        assert_eq!(map.get("b"), Some(0.0));
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = parse_scores("I cannot score these profiles.", BATCH).unwrap_err();
        assert!(matches!(err, Error::MalformedScores(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_array_answer_is_malformed() {
        let err = parse_scores(r#"[{"id":"a","score":1.0}]"#, BATCH).unwrap_err();
        assert!(matches!(err, Error::MalformedScores(_)));
    }

    #[test]
    fn test_empty_arrays_yield_empty_map() {
        let map = parse_scores(r#"{"id":[],"score":[]}"#, BATCH).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_projects_from_object_and_fence() {
        let raw = "```json\n{\"projects\": [\
            {\"title\": \" Smart Irrigation \", \"idea\": \"Soil sensors drive valves.\", \"tech_stack\": [\"ESP32\", \" \"]},\
            {\"title\": \"\", \"idea\": \"No title\"}\
        ]}\n```";
        let projects = parse_projects(raw).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].title, "Smart Irrigation");
        assert_eq!(projects[0].tech_stack, vec!["ESP32"]);
    }

    #[test]
    fn test_projects_bare_array_accepted() {
        let projects = parse_projects(r#"[{"title": "T", "idea": "I"}]"#).unwrap();
        assert_eq!(projects[0].title, "T");
    }

    #[test]
    fn test_projects_without_usable_entry_is_error() {
        let err = parse_projects(r#"{"projects": [{"name": "x"}]}"#).unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        let err = parse_projects(r#"{"ideas": []}"#).unwrap_err();
        assert!(err.to_string().contains("`projects`"));
    }

    #[test]
    fn test_interests_drop_current_and_duplicates() {
        let current = vec!["Robotics".to_string()];
        let raw = r#"{"interests": ["robotics", " Computer Vision ", "computer vision", 7, "Edge AI"]}"#;
        let interests = parse_interests(raw, &current).unwrap();
        assert_eq!(interests, vec!["Computer Vision", "Edge AI"]);
    }

    #[test]
    fn test_interests_all_known_is_error() {
        let current = vec!["Robotics".to_string()];
        let err = parse_interests(r#"["ROBOTICS"]"#, &current).unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }
}
