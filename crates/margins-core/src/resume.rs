//! Résumé normalization
//!
//! Résumé content arrives in one of two shapes:
//! - legacy: a flat list of block-shaped entries (`text`, `meta`, `children`)
//! - structured: `{ sections: [{ key, title, items?, groups? }] }`
//!
//! Both are resolved once, at load time, into the canonical [`Resume`] so
//! rendering never branches on the wire shape.

use serde::{Deserialize, Serialize};

use crate::models::{nullable, Block};

/// Résumé data as published
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResumeData {
    Legacy(Vec<Block>),
    Structured {
        #[serde(default, deserialize_with = "nullable")]
        sections: Vec<RawSection>,
    },
}

impl Default for ResumeData {
    fn default() -> Self {
        ResumeData::Legacy(Vec::new())
    }
}

/// One section of the structured form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSection {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<RawItem>,
    #[serde(default, deserialize_with = "nullable")]
    pub groups: Vec<RawGroup>,
}

/// A section item: either bare text or an entry record
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawItem {
    Text(String),
    Entry(RawEntry),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
    pub title: Option<String>,
    pub role: Option<String>,
    pub degree: Option<String>,
    pub org: Option<String>,
    pub school: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub bullets: Option<Vec<String>>,
    pub details: Option<Vec<String>>,
    pub coursework: Option<Vec<String>>,
}

/// A labelled skill group of the `skills` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGroup {
    pub label: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<String>,
}

/// Render-ready résumé
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resume {
    #[serde(default, deserialize_with = "nullable")]
    pub sections: Vec<ResumeSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResumeSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub rows: Vec<ResumeRow>,
    #[serde(default, deserialize_with = "nullable")]
    pub groups: Vec<SkillGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResumeRow {
    pub title: String,
    #[serde(default)]
    pub meta: String,
    #[serde(default, deserialize_with = "nullable")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillGroup {
    pub label: String,
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<String>,
}

impl Resume {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of rows across all sections
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }

    /// The first `n` rows, in section order (dashboard teaser)
    pub fn teaser(&self, n: usize) -> Vec<&ResumeRow> {
        self.sections.iter().flat_map(|s| &s.rows).take(n).collect()
    }
}

impl From<ResumeData> for Resume {
    fn from(data: ResumeData) -> Self {
        match data {
            ResumeData::Legacy(items) if items.is_empty() => Resume::default(),
            ResumeData::Legacy(items) => Resume {
                sections: vec![ResumeSection {
                    key: None,
                    title: "Resume".to_string(),
                    rows: items.into_iter().map(legacy_row).collect(),
                    groups: Vec::new(),
                }],
            },
            ResumeData::Structured { sections } => Resume {
                sections: sections.into_iter().map(structured_section).collect(),
            },
        }
    }
}

fn legacy_row(block: Block) -> ResumeRow {
    ResumeRow {
        title: block.text,
        meta: block.meta.unwrap_or_default(),
        bullets: block.children.into_iter().map(|c| c.text).collect(),
    }
}

fn structured_section(section: RawSection) -> ResumeSection {
    let title = section
        .title
        .or(section.name)
        .unwrap_or_else(|| "Section".to_string());

    let (rows, groups) = match section.key.as_deref() {
        Some("education") | Some("experience") => (
            section.items.into_iter().map(composed_row).collect(),
            Vec::new(),
        ),
        Some("skills") => (
            Vec::new(),
            section
                .groups
                .into_iter()
                .map(|g| SkillGroup {
                    label: g.label.or(g.title).unwrap_or_default(),
                    items: g.items,
                })
                .collect(),
        ),
        _ => (
            section.items.into_iter().map(simple_row).collect(),
            Vec::new(),
        ),
    };

    ResumeSection {
        key: section.key,
        title,
        rows,
        groups,
    }
}

/// Experience/education rows: "degree title — org"
fn composed_row(item: RawItem) -> ResumeRow {
    let entry = match item {
        RawItem::Text(text) => return text_row(text),
        RawItem::Entry(entry) => entry,
    };

    let mut parts = Vec::new();
    if let Some(degree) = &entry.degree {
        parts.push(degree.clone());
    }
    if let Some(title) = &entry.title {
        parts.push(title.clone());
    }
    if let Some(org) = entry.org.as_ref().or(entry.school.as_ref()) {
        parts.push(format!("— {}", org));
    }

    ResumeRow {
        title: parts.join(" "),
        meta: row_meta(&entry),
        bullets: entry
            .bullets
            .or(entry.details)
            .or(entry.coursework)
            .unwrap_or_default(),
    }
}

fn simple_row(item: RawItem) -> ResumeRow {
    let entry = match item {
        RawItem::Text(text) => return text_row(text),
        RawItem::Entry(entry) => entry,
    };

    let title = entry
        .title
        .clone()
        .or_else(|| entry.role.clone())
        .or_else(|| entry.degree.clone())
        .or_else(|| entry.org.clone())
        .unwrap_or_default();

    ResumeRow {
        title,
        meta: row_meta(&entry),
        bullets: entry.bullets.or(entry.details).unwrap_or_default(),
    }
}

fn text_row(text: String) -> ResumeRow {
    ResumeRow {
        title: text,
        ..ResumeRow::default()
    }
}

fn row_meta(entry: &RawEntry) -> String {
    [entry.date.as_deref(), entry.location.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" · ")
}
