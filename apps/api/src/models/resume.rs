use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

pub const PARSE_STATUS_PENDING: &str = "pending";
pub const PARSE_STATUS_COMPLETED: &str = "completed";

/// Where a resume's ATS score came from. A weaker estimate must never
/// silently overwrite a stronger one (ML beats the local fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AtsScoreSource {
    Resume,
    MlService,
    Fallback,
}

impl AtsScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtsScoreSource::Resume => "resume",
            AtsScoreSource::MlService => "ml-service",
            AtsScoreSource::Fallback => "fallback",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "resume" => Some(AtsScoreSource::Resume),
            "ml-service" => Some(AtsScoreSource::MlService),
            "fallback" => Some(AtsScoreSource::Fallback),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_name: String,
    /// Absent for resumes assembled in the builder rather than uploaded.
    pub file_path: Option<String>,
    pub built_resume_data: Option<Value>,
    pub parsed_data: Option<Value>,
    pub ats_score: Option<i32>,
    pub ats_score_source: Option<String>,
    pub parse_status: String,
    pub created_at: DateTime<Utc>,
}

impl ResumeRow {
    pub fn score_source(&self) -> Option<AtsScoreSource> {
        self.ats_score_source
            .as_deref()
            .and_then(AtsScoreSource::parse)
    }
}

/// Structured payload of a builder-assembled resume, stored as JSONB.
/// Field names follow the client payload (camelCase).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuiltResumeData {
    pub personal_info: PersonalInfo,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: SkillGroups,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<CertificationEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    /// ISO-ish date string ("2021-06-01", "2021-06" or "2021").
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: bool,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub degree: Option<String>,
    pub school: Option<String>,
    pub location: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroups {
    pub technical: Vec<String>,
    pub tools: Vec<String>,
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub name: Option<String>,
    pub description: Option<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationEntry {
    pub name: Option<String>,
    pub organization: Option<String>,
}

impl BuiltResumeData {
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn all_skills(&self) -> Vec<String> {
        self.skills
            .technical
            .iter()
            .chain(self.skills.tools.iter())
            .chain(self.skills.soft.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_built_resume_data_deserializes_camel_case() {
        let value = json!({
            "personalInfo": {"fullName": "Ada Lovelace", "summary": "Engineer"},
            "experience": [
                {"title": "Engineer", "startDate": "2020-01-01", "current": true}
            ],
            "skills": {"technical": ["Rust"], "tools": ["Git"], "soft": []}
        });
        let data = BuiltResumeData::from_value(&value).unwrap();
        assert_eq!(data.personal_info.full_name.as_deref(), Some("Ada Lovelace"));
        assert!(data.experience[0].current);
        assert_eq!(data.all_skills(), vec!["Rust", "Git"]);
    }

    #[test]
    fn test_ats_score_source_round_trip() {
        for source in [
            AtsScoreSource::Resume,
            AtsScoreSource::MlService,
            AtsScoreSource::Fallback,
        ] {
            assert_eq!(AtsScoreSource::parse(source.as_str()), Some(source));
        }
        assert_eq!(AtsScoreSource::parse("unknown"), None);
    }
}
