use serde::Serialize;

use crate::render::{RenderModel, Section, SectionItem, SectionKind};

pub const REPORT_TITLE: &str = "AI Career Analysis Report";
pub const REPORT_FILE_NAME: &str = "Career_Analysis_Report.pdf";

const SCORE_ACCENT_COLOR: &str = "#4f46e5";

/// Fixed configuration handed to the document flattening service together
/// with the export tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub margin_inches: f64,
    pub file_name: String,
    pub image_type: String,
    pub image_quality: f64,
    pub raster_scale: u32,
    pub page_format: String,
    pub orientation: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            margin_inches: 0.4,
            file_name: REPORT_FILE_NAME.to_string(),
            image_type: "jpeg".to_string(),
            image_quality: 0.98,
            raster_scale: 2,
            page_format: "letter".to_string(),
            orientation: "portrait".to_string(),
        }
    }
}

/// Standalone styled document tree, decoupled from the live view: a title
/// block, a score block, then one block per non-empty section in render
/// order. Styling here is a function of item kind only, so the exported
/// report looks the same whatever the on-screen theme.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub title: TitleBlock,
    pub score: ScoreBlock,
    pub sections: Vec<SectionBlock>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleBlock {
    pub text: String,
    pub align: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBlock {
    pub heading: String,
    /// Score text exactly as currently displayed; never recomputed here.
    pub display: String,
    pub accent_color: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionBlock {
    pub kind: SectionKind,
    pub heading: String,
    pub entries: Vec<ExportEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum ExportEntry {
    Line {
        text: String,
    },
    PillRow {
        label: Option<String>,
        pills: Vec<Pill>,
    },
    Card {
        title: String,
        body: String,
        style: CardStyle,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pill {
    pub text: String,
    pub style: PillStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PillStyle {
    pub background: &'static str,
    pub border: &'static str,
    pub color: &'static str,
}

impl PillStyle {
    /// Neutral treatment for skill tags.
    pub const SKILL: Self = Self {
        background: "#f0f0f0",
        border: "#999",
        color: "#000",
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStyle {
    pub background: &'static str,
    pub border: &'static str,
    pub color: &'static str,
}

impl CardStyle {
    pub const ROLE: Self = Self {
        background: "#fff",
        border: "#ddd",
        color: "#000",
    };

    /// Gap entries get a distinct treatment from skill tags and role cards.
    pub const GAP: Self = Self {
        background: "#fdf2ff",
        border: "#dbafe5",
        color: "#7000ff",
    };
}

/// Rebuild the render model into an export-ready tree. Empty sections
/// contribute no block; the score section is rendered by the dedicated score
/// block rather than repeated as content.
pub fn build_export_document(model: &RenderModel, score_label: &str) -> ExportDocument {
    let sections = model
        .sections
        .iter()
        .filter(|section| section.kind != SectionKind::AtsScore)
        .filter_map(section_block)
        .collect();

    ExportDocument {
        title: TitleBlock {
            text: REPORT_TITLE.to_string(),
            align: "center".to_string(),
            color: "#111".to_string(),
        },
        score: ScoreBlock {
            heading: "ATS Score".to_string(),
            display: score_label.to_string(),
            accent_color: SCORE_ACCENT_COLOR.to_string(),
        },
        sections,
    }
}

fn section_block(section: &Section) -> Option<SectionBlock> {
    if section.items.is_empty() {
        return None;
    }
    let entries: Vec<ExportEntry> = section.items.iter().map(export_entry).collect();
    Some(SectionBlock {
        kind: section.kind,
        heading: section.title.clone(),
        entries,
    })
}

fn export_entry(item: &SectionItem) -> ExportEntry {
    match item {
        SectionItem::ScoreBadge { display, .. } => ExportEntry::Line {
            text: display.clone(),
        },
        SectionItem::Tip { text } => ExportEntry::Line { text: text.clone() },
        SectionItem::SkillGroup { label, skills } => ExportEntry::PillRow {
            label: label.clone(),
            pills: skills
                .iter()
                .map(|skill| Pill {
                    text: skill.clone(),
                    style: PillStyle::SKILL,
                })
                .collect(),
        },
        SectionItem::SkillTag { name } => ExportEntry::PillRow {
            label: None,
            pills: vec![Pill {
                text: name.clone(),
                style: PillStyle::SKILL,
            }],
        },
        SectionItem::Gap {
            skill,
            recommendation,
        } => ExportEntry::Card {
            title: skill.clone(),
            body: format!("Tip: {recommendation}"),
            style: CardStyle::GAP,
        },
        SectionItem::GapPlaceholder { message } => ExportEntry::Line {
            text: message.clone(),
        },
        SectionItem::RoleCard {
            title, description, ..
        } => ExportEntry::Card {
            title: title.clone(),
            body: description.clone(),
            style: CardStyle::ROLE,
        },
    }
}

impl ExportDocument {
    pub fn block_count(&self) -> usize {
        self.sections.len()
    }
}
