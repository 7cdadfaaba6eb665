//! Candidate profile derivation — rebuilt fresh from the resume row on
//! every request, never cached.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;

use crate::models::resume::{AtsScoreSource, BuiltResumeData, ResumeRow};

/// When nothing in the resume yields an experience figure, assume two
/// years. Documented policy inherited from the scoring design: it keeps
/// sparse resumes scoreable, at the cost of skewing entry-level candidates
/// toward mid-level experience.
const DEFAULT_EXPERIENCE_YEARS: i64 = 2;

static TEXT_YEARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)[\+\s]*(?:years?|yrs?)").expect("invalid resume years regex")
});

#[derive(Debug, Clone)]
pub struct CandidateProfile {
    /// Deduplicated case-insensitively; first-seen casing and order win.
    pub skills: Vec<String>,
    pub experience_years: Option<i64>,
    pub ats_score: Option<i32>,
    pub ats_score_source: Option<AtsScoreSource>,
}

/// Candidate-side summary text handed to the AI analysis prompt:
/// the parsed summary when one exists, else the builder headline summary.
pub fn profile_summary(resume: &ResumeRow) -> Option<String> {
    resume
        .parsed_data
        .as_ref()
        .and_then(|d| d.get("summary"))
        .and_then(|s| s.as_str())
        .map(str::to_string)
        .or_else(|| {
            resume
                .built_resume_data
                .as_ref()
                .and_then(BuiltResumeData::from_value)
                .and_then(|b| b.personal_info.summary)
        })
}

/// Derives the scoring profile for a resume.
pub fn derive_profile(resume: &ResumeRow) -> CandidateProfile {
    let built = resume
        .built_resume_data
        .as_ref()
        .and_then(BuiltResumeData::from_value);

    let raw_skills = parsed_skills(resume)
        .or_else(|| built.as_ref().map(BuiltResumeData::all_skills))
        .unwrap_or_default();

    CandidateProfile {
        skills: dedup_skills(raw_skills),
        experience_years: Some(derive_experience_years(resume, built.as_ref())),
        ats_score: resume.ats_score,
        ats_score_source: resume.score_source(),
    }
}

fn parsed_skills(resume: &ResumeRow) -> Option<Vec<String>> {
    let skills = resume
        .parsed_data
        .as_ref()?
        .get("extracted_skills")?
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect::<Vec<_>>();
    if skills.is_empty() {
        None
    } else {
        Some(skills)
    }
}

/// Case-insensitive dedup preserving original casing and first-seen order.
pub fn dedup_skills(raw: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut skills = Vec::new();
    for skill in raw {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            skills.push(trimmed.to_string());
        }
    }
    skills
}

/// Work-history date math first, then a text scan, then the default.
fn derive_experience_years(resume: &ResumeRow, built: Option<&BuiltResumeData>) -> i64 {
    if let Some(years) = built.and_then(|b| work_history_years(b, Utc::now().date_naive())) {
        return years;
    }

    // Text fallback: scan whatever textual material the row carries.
    let mut haystack = String::new();
    if let Some(parsed) = &resume.parsed_data {
        haystack.push_str(&parsed.to_string());
    }
    if let Some(built) = &resume.built_resume_data {
        haystack.push_str(&built.to_string());
    }
    TEXT_YEARS_RE
        .captures(&haystack)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_EXPERIENCE_YEARS)
}

/// Sums month spans across all dated work-history entries; `current`
/// entries run to `today`. Returns None when no entry has a start date.
pub fn work_history_years(data: &BuiltResumeData, today: NaiveDate) -> Option<i64> {
    let mut total_months = 0.0_f64;
    let mut any_dated = false;

    for entry in &data.experience {
        let Some(start) = entry.start_date.as_deref().and_then(parse_flexible_date) else {
            continue;
        };
        let end = if entry.current {
            today
        } else {
            entry
                .end_date
                .as_deref()
                .and_then(parse_flexible_date)
                .unwrap_or(today)
        };
        any_dated = true;
        total_months += months_between(start, end);
    }

    if any_dated {
        Some((total_months / 12.0).round() as i64)
    } else {
        None
    }
}

/// Accepts "2021-06-15", "2021-06", or "2021".
fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    NaiveDate::parse_from_str(&format!("{raw}-01-01"), "%Y-%m-%d").ok()
}

fn months_between(start: NaiveDate, end: NaiveDate) -> f64 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    let total = years * 12 + months;
    let day_frac = (end.day() as f64 - start.day() as f64) / 30.0;
    (total as f64 + day_frac).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn resume_with(parsed: Option<serde_json::Value>, built: Option<serde_json::Value>) -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            original_name: "resume.pdf".to_string(),
            file_path: Some("/tmp/resume.pdf".to_string()),
            built_resume_data: built,
            parsed_data: parsed,
            ats_score: None,
            ats_score_source: None,
            parse_status: "completed".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_skills_from_parsed_data_win_over_builder() {
        let resume = resume_with(
            Some(json!({"extracted_skills": ["Rust", "SQL"]})),
            Some(json!({"skills": {"technical": ["Go"], "tools": [], "soft": []}})),
        );
        let profile = derive_profile(&resume);
        assert_eq!(profile.skills, vec!["Rust", "SQL"]);
    }

    #[test]
    fn test_builder_skills_used_when_parsed_data_empty() {
        let resume = resume_with(
            None,
            Some(json!({"skills": {"technical": ["Go", "Rust"], "tools": ["Git"], "soft": ["Mentoring"]}})),
        );
        let profile = derive_profile(&resume);
        assert_eq!(profile.skills, vec!["Go", "Rust", "Git", "Mentoring"]);
    }

    #[test]
    fn test_dedup_preserves_first_casing_and_order() {
        let skills = dedup_skills(vec![
            "ReactJS".to_string(),
            "reactjs".to_string(),
            "SQL".to_string(),
            " sql ".to_string(),
            "Rust".to_string(),
        ]);
        assert_eq!(skills, vec!["ReactJS", "SQL", "Rust"]);
    }

    #[test]
    fn test_work_history_sums_month_spans() {
        let data: BuiltResumeData = serde_json::from_value(json!({
            "experience": [
                {"startDate": "2018-01-01", "endDate": "2020-01-01", "current": false},
                {"startDate": "2020-01-01", "endDate": "2021-07-01", "current": false}
            ]
        }))
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // 24 months + 18 months = 42 months -> 3.5 years -> rounds to 4
        assert_eq!(work_history_years(&data, today), Some(4));
    }

    #[test]
    fn test_current_entry_runs_to_today() {
        let data: BuiltResumeData = serde_json::from_value(json!({
            "experience": [
                {"startDate": "2021-01-01", "current": true}
            ]
        }))
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(work_history_years(&data, today), Some(3));
    }

    #[test]
    fn test_undated_history_returns_none() {
        let data: BuiltResumeData = serde_json::from_value(json!({
            "experience": [{"title": "Engineer", "current": false}]
        }))
        .unwrap();
        assert_eq!(work_history_years(&data, Utc::now().date_naive()), None);
    }

    #[test]
    fn test_experience_falls_back_to_text_scan() {
        let resume = resume_with(
            Some(json!({"summary": "Engineer with 7 years of backend work"})),
            None,
        );
        let profile = derive_profile(&resume);
        assert_eq!(profile.experience_years, Some(7));
    }

    #[test]
    fn test_experience_defaults_to_two_years() {
        let resume = resume_with(Some(json!({"summary": "Recent graduate"})), None);
        let profile = derive_profile(&resume);
        assert_eq!(profile.experience_years, Some(DEFAULT_EXPERIENCE_YEARS));
    }

    #[test]
    fn test_ats_score_source_carried_through() {
        let mut resume = resume_with(None, None);
        resume.ats_score = Some(74);
        resume.ats_score_source = Some("ml-service".to_string());
        let profile = derive_profile(&resume);
        assert_eq!(profile.ats_score, Some(74));
        assert_eq!(profile.ats_score_source, Some(AtsScoreSource::MlService));
    }

    #[test]
    fn test_parse_flexible_date_formats() {
        assert_eq!(
            parse_flexible_date("2021-06-15"),
            NaiveDate::from_ymd_opt(2021, 6, 15)
        );
        assert_eq!(
            parse_flexible_date("2021-06"),
            NaiveDate::from_ymd_opt(2021, 6, 1)
        );
        assert_eq!(
            parse_flexible_date("2021"),
            NaiveDate::from_ymd_opt(2021, 1, 1)
        );
        assert_eq!(parse_flexible_date("junk"), None);
    }
}
