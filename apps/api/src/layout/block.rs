//! Atomic layout units and the ordered block plan of a document.
//!
//! A block is measured once and placed whole. Items carry their index in the caller's
//! original list, so a `BlockKey` identifies the same item no matter how `order`
//! reshuffles the plan.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::models::{EducationItem, PersonalInfo, ResumeDocument, Skill, SkillCategory, WorkItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Work,
    Education,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::Work => "Work Experience",
            Section::Education => "Education",
        }
    }
}

pub const SKILLS_TITLE: &str = "Skills";

/// Block kind without payload. Drives fallback heights and text styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    PersonalInfo,
    SectionHeader,
    WorkItem,
    EducationItem,
    SkillsHeader,
    SkillsContent,
}

/// Typed block identity used for measurement caching and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKey {
    PersonalInfo,
    SectionHeader { section: Section },
    WorkItem { index: usize },
    EducationItem { index: usize },
    SkillsHeader,
    SkillsContent,
}

impl BlockKey {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockKey::PersonalInfo => BlockKind::PersonalInfo,
            BlockKey::SectionHeader { .. } => BlockKind::SectionHeader,
            BlockKey::WorkItem { .. } => BlockKind::WorkItem,
            BlockKey::EducationItem { .. } => BlockKind::EducationItem,
            BlockKey::SkillsHeader => BlockKind::SkillsHeader,
            BlockKey::SkillsContent => BlockKind::SkillsContent,
        }
    }
}

/// Skills of one category, in the order they were declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: SkillCategory,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    PersonalInfo {
        info: PersonalInfo,
    },
    SectionHeader {
        section: Section,
    },
    WorkItem {
        index: usize,
        item: WorkItem,
    },
    EducationItem {
        index: usize,
        item: EducationItem,
    },
    SkillsHeader,
    SkillsContent {
        groups: Vec<SkillGroup>,
    },
}

impl Block {
    pub fn key(&self) -> BlockKey {
        match self {
            Block::PersonalInfo { .. } => BlockKey::PersonalInfo,
            Block::SectionHeader { section } => BlockKey::SectionHeader { section: *section },
            Block::WorkItem { index, .. } => BlockKey::WorkItem { index: *index },
            Block::EducationItem { index, .. } => BlockKey::EducationItem { index: *index },
            Block::SkillsHeader => BlockKey::SkillsHeader,
            Block::SkillsContent { .. } => BlockKey::SkillsContent,
        }
    }

    /// Content hash used to invalidate cached measurements.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Groups skills by category, categories in order of first occurrence.
///
/// Skills are stably sorted by `order` first, so both the group order and the names
/// inside a group follow the declared order.
pub fn group_skills(skills: &[Skill]) -> Vec<SkillGroup> {
    let mut sorted: Vec<&Skill> = skills.iter().collect();
    sorted.sort_by_key(|s| s.order);

    let mut groups: Vec<SkillGroup> = Vec::new();
    for skill in sorted {
        match groups.iter_mut().find(|g| g.category == skill.category) {
            Some(group) => group.names.push(skill.name.clone()),
            None => groups.push(SkillGroup {
                category: skill.category,
                names: vec![skill.name.clone()],
            }),
        }
    }
    groups
}

/// Builds the ordered block sequence for a document.
///
/// Personal info, then work experience, education and skills. Empty sections produce
/// no blocks at all (no orphan headers). Items are stably sorted by `order`.
pub fn build_blocks(document: &ResumeDocument) -> Vec<Block> {
    let mut blocks = Vec::new();

    if let Some(info) = &document.personal_info {
        blocks.push(Block::PersonalInfo { info: info.clone() });
    }

    if !document.work_experience.is_empty() {
        blocks.push(Block::SectionHeader {
            section: Section::Work,
        });
        let mut items: Vec<(usize, &WorkItem)> =
            document.work_experience.iter().enumerate().collect();
        items.sort_by_key(|(_, item)| item.order);
        blocks.extend(items.into_iter().map(|(index, item)| Block::WorkItem {
            index,
            item: item.clone(),
        }));
    }

    if !document.education.is_empty() {
        blocks.push(Block::SectionHeader {
            section: Section::Education,
        });
        let mut items: Vec<(usize, &EducationItem)> =
            document.education.iter().enumerate().collect();
        items.sort_by_key(|(_, item)| item.order);
        blocks.extend(
            items
                .into_iter()
                .map(|(index, item)| Block::EducationItem {
                    index,
                    item: item.clone(),
                }),
        );
    }

    if !document.skills.is_empty() {
        blocks.push(Block::SkillsHeader);
        blocks.push(Block::SkillsContent {
            groups: group_skills(&document.skills),
        });
    }

    blocks
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::models::{EducationItem, PersonalInfo, Skill, SkillCategory, WorkItem};

    pub fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    pub fn personal() -> PersonalInfo {
        PersonalInfo {
            id: None,
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: Some("+44 20 7946 0000".to_string()),
            location: Some("London".to_string()),
            linkedin: None,
            website: None,
            summary: Some("Mathematician and first programmer.".to_string()),
        }
    }

    pub fn work(position: &str, order: i32) -> WorkItem {
        WorkItem {
            id: None,
            company_name: "Analytical Engines Ltd".to_string(),
            position: position.to_string(),
            start_date: date(2020, 1),
            end_date: Some(date(2022, 6)),
            current: false,
            description: "<ul><li>Wrote the first algorithm</li></ul>".to_string(),
            order,
        }
    }

    pub fn education(degree: &str, order: i32) -> EducationItem {
        EducationItem {
            id: None,
            institution: "University of London".to_string(),
            degree: degree.to_string(),
            field_of_study: Some("Mathematics".to_string()),
            start_date: date(2014, 9),
            end_date: Some(date(2018, 6)),
            current: false,
            description: None,
            order,
        }
    }

    pub fn skill(name: &str, category: SkillCategory, order: i32) -> Skill {
        Skill {
            id: None,
            name: name.to_string(),
            category,
            order,
        }
    }
}
