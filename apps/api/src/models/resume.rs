use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resume snapshot as submitted by the editor client.
///
/// Field names follow the client's camelCase JSON. Collections default to empty so a
/// partially filled document (e.g. only a title) still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default)]
    pub work_experience: Vec<WorkItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Free-text summary. May carry inline markup; measured as part of one opaque block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub company_name: String,
    pub position: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Open-ended position; suppresses the end date in favor of "Present".
    #[serde(default)]
    pub current: bool,
    /// Rich-text (HTML subset) description.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub institution: String,
    pub degree: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SkillCategory {
    #[default]
    Technical,
    #[serde(rename = "Soft Skills")]
    SoftSkills,
    Languages,
    Tools,
    Other,
}

impl SkillCategory {
    /// Label printed in front of the group's skill names.
    pub fn label(&self) -> &'static str {
        match self {
            SkillCategory::Technical => "Technical",
            SkillCategory::SoftSkills => "Soft Skills",
            SkillCategory::Languages => "Languages",
            SkillCategory::Tools => "Tools",
            SkillCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub category: SkillCategory,
    #[serde(default)]
    pub order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_client_payload() {
        let doc: ResumeDocument = serde_json::from_value(json!({
            "title": "Backend",
            "personalInfo": { "fullName": "Ada Lovelace", "email": "ada@example.com" },
            "workExperience": [{
                "companyName": "Analytical Engines",
                "position": "Engineer",
                "startDate": "2020-01-01",
                "current": true,
                "description": "<p>Built things</p>",
                "order": 2
            }],
            "education": [],
            "skills": [{ "name": "Rust", "category": "Soft Skills", "order": 0 }]
        }))
        .unwrap();

        assert_eq!(doc.title, "Backend");
        assert_eq!(doc.work_experience[0].order, 2);
        assert!(doc.work_experience[0].current);
        assert!(doc.work_experience[0].end_date.is_none());
        assert_eq!(doc.skills[0].category, SkillCategory::SoftSkills);
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let doc: ResumeDocument = serde_json::from_value(json!({ "title": "Blank" })).unwrap();
        assert!(doc.personal_info.is_none());
        assert!(doc.work_experience.is_empty());
        assert!(doc.education.is_empty());
        assert!(doc.skills.is_empty());
    }

    #[test]
    fn test_category_serializes_display_string() {
        let value = serde_json::to_value(SkillCategory::SoftSkills).unwrap();
        assert_eq!(value, json!("Soft Skills"));
        assert_eq!(SkillCategory::SoftSkills.label(), "Soft Skills");
    }
}
