use reqwest::Url;
use serde::Serialize;

use crate::normalize::{AnalysisResult, TechnicalSkills};

const LINKEDIN_JOB_SEARCH: &str = "https://www.linkedin.com/jobs/search/";
const NAUKRI_JOB_SEARCH: &str = "https://www.naukri.com/jobs-in-india";
const INDEED_JOB_SEARCH: &str = "https://in.indeed.com/jobs";

pub const NO_GAPS_MESSAGE: &str = "Great job! No critical gaps found.";

/// Ordered, presentation-agnostic representation of the dashboard: the six
/// sections in fixed order plus the flattened skill list for combined-skills
/// consumers. Rebuilt from scratch on every successful analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub sections: Vec<Section>,
    /// All technical skills across categories, then the soft skills, in
    /// render order.
    pub combined_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub items: Vec<SectionItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    AtsScore,
    AtsTips,
    TechnicalSkills,
    SoftSkills,
    MissingSkills,
    JobRoles,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::AtsScore => "ATS Score",
            SectionKind::AtsTips => "Improvement Tips",
            SectionKind::TechnicalSkills => "Technical Skills",
            SectionKind::SoftSkills => "Soft Skills",
            SectionKind::MissingSkills => "Recommended Skills to Learn",
            SectionKind::JobRoles => "Recommended Roles",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum SectionItem {
    ScoreBadge {
        score: u8,
        /// Textual representation as displayed, e.g. `72%`. Export reuses
        /// this string rather than recomputing it.
        display: String,
    },
    Tip {
        text: String,
    },
    SkillGroup {
        /// Display label derived from the category key; `None` for the flat
        /// legacy shape, which renders as one unlabeled group.
        label: Option<String>,
        skills: Vec<String>,
    },
    SkillTag {
        name: String,
    },
    Gap {
        skill: String,
        recommendation: String,
    },
    GapPlaceholder {
        message: String,
    },
    RoleCard {
        title: String,
        description: String,
        search_links: Vec<SearchLink>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLink {
    pub site: String,
    pub url: String,
}

/// Map a canonical result to the render model. Deterministic and pure;
/// section order never depends on payload key order.
pub fn build(result: &AnalysisResult) -> RenderModel {
    let technical = technical_section(&result.technical_skills);
    let combined_skills = combined_skills(result);

    let sections = vec![
        Section {
            kind: SectionKind::AtsScore,
            title: SectionKind::AtsScore.title().to_string(),
            items: vec![SectionItem::ScoreBadge {
                score: result.ats_score,
                display: format!("{}%", result.ats_score),
            }],
        },
        Section {
            kind: SectionKind::AtsTips,
            title: SectionKind::AtsTips.title().to_string(),
            items: result
                .ats_tips
                .iter()
                .map(|tip| SectionItem::Tip { text: tip.clone() })
                .collect(),
        },
        technical,
        Section {
            kind: SectionKind::SoftSkills,
            title: SectionKind::SoftSkills.title().to_string(),
            items: result
                .soft_skills
                .iter()
                .map(|skill| SectionItem::SkillTag {
                    name: skill.clone(),
                })
                .collect(),
        },
        missing_skills_section(result),
        Section {
            kind: SectionKind::JobRoles,
            title: SectionKind::JobRoles.title().to_string(),
            items: result
                .job_roles
                .iter()
                .map(|role| SectionItem::RoleCard {
                    title: role.title.clone(),
                    description: role.description.clone(),
                    search_links: search_links(&role.title),
                })
                .collect(),
        },
    ];

    RenderModel {
        sections,
        combined_skills,
    }
}

/// `Tools_and_Platforms` → `Tools and Platforms`. A pure string rule over the
/// raw key, not locale-aware.
pub fn display_label(key: &str) -> String {
    key.replace('_', " ")
}

fn technical_section(skills: &TechnicalSkills) -> Section {
    let items = match skills {
        TechnicalSkills::Categorized(categories) => categories
            .iter()
            .map(|category| SectionItem::SkillGroup {
                label: Some(display_label(&category.key)),
                skills: category.skills.clone(),
            })
            .collect(),
        TechnicalSkills::Flat(flat) if flat.is_empty() => Vec::new(),
        TechnicalSkills::Flat(flat) => vec![SectionItem::SkillGroup {
            label: None,
            skills: flat.clone(),
        }],
    };
    Section {
        kind: SectionKind::TechnicalSkills,
        title: SectionKind::TechnicalSkills.title().to_string(),
        items,
    }
}

fn missing_skills_section(result: &AnalysisResult) -> Section {
    let items = if result.missing_skills.is_empty() {
        vec![SectionItem::GapPlaceholder {
            message: NO_GAPS_MESSAGE.to_string(),
        }]
    } else {
        result
            .missing_skills
            .iter()
            .map(|gap| SectionItem::Gap {
                skill: gap.skill.clone(),
                recommendation: gap.recommendation.clone(),
            })
            .collect()
    };
    Section {
        kind: SectionKind::MissingSkills,
        title: SectionKind::MissingSkills.title().to_string(),
        items,
    }
}

fn combined_skills(result: &AnalysisResult) -> Vec<String> {
    let mut combined = match &result.technical_skills {
        TechnicalSkills::Categorized(categories) => categories
            .iter()
            .flat_map(|category| category.skills.iter().cloned())
            .collect::<Vec<_>>(),
        TechnicalSkills::Flat(flat) => flat.clone(),
    };
    combined.extend(result.soft_skills.iter().cloned());
    combined
}

fn search_links(title: &str) -> Vec<SearchLink> {
    const BOARDS: [(&str, &str, &str); 3] = [
        ("LinkedIn", LINKEDIN_JOB_SEARCH, "keywords"),
        ("Naukri", NAUKRI_JOB_SEARCH, "k"),
        ("Indeed", INDEED_JOB_SEARCH, "q"),
    ];
    BOARDS
        .iter()
        .map(|&(site, base, param)| SearchLink {
            site: site.to_string(),
            url: Url::parse_with_params(base, &[(param, title)])
                .expect("job board base URLs are valid")
                .to_string(),
        })
        .collect()
}

impl RenderModel {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    /// The score string exactly as displayed, e.g. `72%`.
    pub fn score_display(&self) -> Option<&str> {
        self.section(SectionKind::AtsScore)
            .and_then(|section| section.items.first())
            .and_then(|item| match item {
                SectionItem::ScoreBadge { display, .. } => Some(display.as_str()),
                _ => None,
            })
    }

    pub fn ats_score(&self) -> u8 {
        self.section(SectionKind::AtsScore)
            .and_then(|section| section.items.first())
            .and_then(|item| match item {
                SectionItem::ScoreBadge { score, .. } => Some(*score),
                _ => None,
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::normalize::normalize;

    use super::*;

    #[test]
    fn sections_keep_fixed_order() {
        let model = build(&normalize(&json!({ "ats_score": 10 })));
        let kinds: Vec<_> = model.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::AtsScore,
                SectionKind::AtsTips,
                SectionKind::TechnicalSkills,
                SectionKind::SoftSkills,
                SectionKind::MissingSkills,
                SectionKind::JobRoles,
            ]
        );
    }

    #[test]
    fn category_keys_become_display_labels() {
        let model = build(&normalize(&json!({
            "technical_skills": {
                "Tools_and_Platforms": ["Docker"],
                "Languages": ["Rust"]
            }
        })));
        let section = model.section(SectionKind::TechnicalSkills).unwrap();
        let labels: Vec<_> = section
            .items
            .iter()
            .map(|item| match item {
                SectionItem::SkillGroup { label, .. } => label.clone().unwrap(),
                other => panic!("unexpected item {other:?}"),
            })
            .collect();
        assert_eq!(labels, vec!["Tools and Platforms", "Languages"]);
    }

    #[test]
    fn empty_category_produces_no_group() {
        let model = build(&normalize(&json!({
            "technical_skills": { "Languages": [], "Databases_and_Cloud": ["Postgres"] }
        })));
        let section = model.section(SectionKind::TechnicalSkills).unwrap();
        assert_eq!(section.items.len(), 1);
    }

    #[test]
    fn empty_gap_list_yields_single_placeholder() {
        let model = build(&normalize(&json!({ "missing_skills": [] })));
        let section = model.section(SectionKind::MissingSkills).unwrap();
        assert_eq!(section.items.len(), 1);
        assert!(matches!(
            &section.items[0],
            SectionItem::GapPlaceholder { message } if message == NO_GAPS_MESSAGE
        ));
    }

    #[test]
    fn combined_skills_flatten_categories_then_soft_skills() {
        let model = build(&normalize(&json!({
            "technical_skills": { "Languages": ["Go", "Rust"], "Tools_and_Platforms": ["Docker"] },
            "soft_skills": ["Communication"]
        })));
        assert_eq!(
            model.combined_skills,
            vec!["Go", "Rust", "Docker", "Communication"]
        );
    }

    #[test]
    fn role_cards_link_to_all_three_job_boards() {
        let model = build(&normalize(&json!({
            "job_roles": [{ "title": "Backend Engineer", "description": "Builds services" }]
        })));
        let section = model.section(SectionKind::JobRoles).unwrap();
        let SectionItem::RoleCard { search_links, .. } = &section.items[0] else {
            panic!("expected role card");
        };
        assert_eq!(search_links.len(), 3);
        let sites: Vec<_> = search_links.iter().map(|l| l.site.as_str()).collect();
        assert_eq!(sites, vec!["LinkedIn", "Naukri", "Indeed"]);
        for link in search_links {
            let url = Url::parse(&link.url).unwrap();
            let encoded_title = url
                .query_pairs()
                .find(|(key, _)| key == "keywords" || key == "k" || key == "q")
                .map(|(_, value)| value.into_owned())
                .unwrap();
            assert_eq!(encoded_title, "Backend Engineer");
        }
    }

    #[test]
    fn score_display_matches_badge() {
        let model = build(&normalize(&json!({ "ats_score": 72 })));
        assert_eq!(model.score_display(), Some("72%"));
    }
}
