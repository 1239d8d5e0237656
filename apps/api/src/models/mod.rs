pub mod resume;

pub use resume::{EducationItem, PersonalInfo, ResumeDocument, Skill, SkillCategory, WorkItem};
