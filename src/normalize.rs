use serde::Serialize;
use serde_json::Value;

/// Canonical analysis result. Every field carries a documented default, so
/// normalization is total: whatever shape the backend answers with, the
/// dashboard has something to render.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub ats_score: u8,
    pub ats_tips: Vec<String>,
    pub technical_skills: TechnicalSkills,
    pub soft_skills: Vec<String>,
    pub missing_skills: Vec<SkillGap>,
    pub job_roles: Vec<JobRole>,
}

/// The `technical_skills` field has changed shape over backend revisions:
/// current payloads send a category → skills object, older ones a flat array,
/// the oldest a flat array under `skills`. Exactly one variant is populated.
#[derive(Debug, Clone, Serialize)]
pub enum TechnicalSkills {
    Categorized(Vec<SkillCategory>),
    Flat(Vec<String>),
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillCategory {
    /// Raw payload key, e.g. `Tools_and_Platforms`. Display labels are
    /// derived later; the canonical result keeps the key untouched.
    pub key: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillGap {
    pub skill: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRole {
    pub title: String,
    pub description: String,
}

/// Parse a raw analysis payload into the canonical result. Missing,
/// wrong-typed, or malformed fields degrade to their defaults; this is the
/// single place where legacy-shape compatibility lives.
pub fn normalize(raw: &Value) -> AnalysisResult {
    AnalysisResult {
        ats_score: normalize_score(raw.get("ats_score")),
        ats_tips: string_list(raw.get("ats_tips")),
        technical_skills: normalize_technical_skills(raw),
        soft_skills: string_list(raw.get("soft_skills")),
        missing_skills: normalize_missing_skills(raw.get("missing_skills")),
        job_roles: normalize_job_roles(raw.get("job_roles")),
    }
}

/// A truthy `error` field marks the whole payload as a rejected submission,
/// regardless of what else is present. String errors surface verbatim.
pub fn submission_error(raw: &Value) -> Option<String> {
    match raw.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("analysis failed".to_string()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn normalize_score(value: Option<&Value>) -> u8 {
    let coerced = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        _ => None,
    };
    coerced.map_or(0, |score| score.clamp(0, 100) as u8)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_technical_skills(raw: &Value) -> TechnicalSkills {
    match raw.get("technical_skills") {
        Some(Value::Object(categories)) => TechnicalSkills::Categorized(
            categories
                .iter()
                .map(|(key, skills)| SkillCategory {
                    key: key.clone(),
                    skills: string_list(Some(skills)),
                })
                .filter(|category| !category.skills.is_empty())
                .collect(),
        ),
        other => {
            // Flat list, with the legacy `skills` key as fallback when the
            // primary field is empty or absent.
            let primary = string_list(other);
            if primary.is_empty() {
                let legacy = string_list(raw.get("skills"));
                if !legacy.is_empty() {
                    return TechnicalSkills::Flat(legacy);
                }
            }
            TechnicalSkills::Flat(primary)
        }
    }
}

fn normalize_missing_skills(value: Option<&Value>) -> Vec<SkillGap> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(SkillGap {
                        skill: item.get("skill")?.as_str()?.to_string(),
                        recommendation: item
                            .get("recommendation")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_job_roles(value: Option<&Value>) -> Vec<JobRole> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(JobRole {
                        title: item.get("title")?.as_str()?.to_string(),
                        description: item
                            .get("description")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_score_defaults_to_zero() {
        let result = normalize(&json!({ "ats_tips": ["Add keywords"] }));
        assert_eq!(result.ats_score, 0);
        assert_eq!(result.ats_tips, vec!["Add keywords".to_string()]);
    }

    #[test]
    fn non_numeric_score_defaults_and_out_of_range_clamps() {
        assert_eq!(normalize(&json!({ "ats_score": "seventy" })).ats_score, 0);
        assert_eq!(normalize(&json!({ "ats_score": 250 })).ats_score, 100);
        assert_eq!(normalize(&json!({ "ats_score": -3 })).ats_score, 0);
        assert_eq!(normalize(&json!({ "ats_score": 71.6 })).ats_score, 72);
    }

    #[test]
    fn primary_flat_list_wins_over_legacy_skills() {
        let result = normalize(&json!({
            "technical_skills": ["A", "B"],
            "skills": ["C"]
        }));
        match result.technical_skills {
            TechnicalSkills::Flat(skills) => assert_eq!(skills, vec!["A", "B"]),
            other => panic!("expected flat variant, got {other:?}"),
        }
    }

    #[test]
    fn empty_primary_list_falls_back_to_legacy_skills() {
        let result = normalize(&json!({
            "technical_skills": [],
            "skills": ["C"]
        }));
        match result.technical_skills {
            TechnicalSkills::Flat(skills) => assert_eq!(skills, vec!["C"]),
            other => panic!("expected flat variant, got {other:?}"),
        }
    }

    #[test]
    fn categorized_object_preserves_key_order_and_drops_empty_categories() {
        let result = normalize(&json!({
            "technical_skills": {
                "Languages": ["Go", "Rust"],
                "Frameworks_and_Libraries": [],
                "Tools_and_Platforms": ["Docker"]
            }
        }));
        match result.technical_skills {
            TechnicalSkills::Categorized(categories) => {
                let keys: Vec<_> = categories.iter().map(|c| c.key.as_str()).collect();
                assert_eq!(keys, vec!["Languages", "Tools_and_Platforms"]);
                assert_eq!(categories[0].skills, vec!["Go", "Rust"]);
            }
            other => panic!("expected categorized variant, got {other:?}"),
        }
    }

    #[test]
    fn malformed_entries_degrade_instead_of_failing() {
        let result = normalize(&json!({
            "ats_tips": ["keep", 42, null],
            "missing_skills": [
                { "skill": "Kubernetes", "recommendation": "Deploy a cluster" },
                { "recommendation": "no skill name" },
                "not an object"
            ],
            "job_roles": [{ "title": "Backend Engineer" }, { "description": "orphan" }]
        }));
        assert_eq!(result.ats_tips, vec!["keep".to_string()]);
        assert_eq!(result.missing_skills.len(), 1);
        assert_eq!(result.missing_skills[0].skill, "Kubernetes");
        assert_eq!(result.job_roles.len(), 1);
        assert_eq!(result.job_roles[0].description, "");
    }

    #[test]
    fn entirely_malformed_payload_yields_defaults() {
        let result = normalize(&json!("not even an object"));
        assert_eq!(result.ats_score, 0);
        assert!(result.ats_tips.is_empty());
        assert!(matches!(result.technical_skills, TechnicalSkills::Flat(ref s) if s.is_empty()));
        assert!(result.missing_skills.is_empty());
        assert!(result.job_roles.is_empty());
    }

    #[test]
    fn truthy_error_fields_are_detected() {
        assert_eq!(
            submission_error(&json!({ "error": "Invalid file type" })).as_deref(),
            Some("Invalid file type")
        );
        assert!(submission_error(&json!({ "error": "" })).is_none());
        assert!(submission_error(&json!({ "error": false })).is_none());
        assert!(submission_error(&json!({ "error": 0 })).is_none());
        assert!(submission_error(&json!({ "error": null })).is_none());
        assert!(submission_error(&json!({ "ats_score": 72 })).is_none());
        assert!(submission_error(&json!({ "error": true })).is_some());
    }
}
