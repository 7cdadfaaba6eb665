//! Local heuristic ATS scoring — the degradation path when the ML parsing
//! service is unavailable. The pure scorer lives here next to the one
//! side-effecting entry point that persists its result onto a resume row.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::anyhow;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::skills::extract_skills_from_text;
use crate::extract::text::extract_resume_text;
use crate::llm_client::LlmClient;
use crate::models::resume::{
    AtsScoreSource, BuiltResumeData, ResumeRow, PARSE_STATUS_COMPLETED,
};

const ACTION_VERBS: [&str; 17] = [
    "led",
    "built",
    "created",
    "implemented",
    "optimized",
    "designed",
    "developed",
    "managed",
    "improved",
    "reduced",
    "increased",
    "launched",
    "architected",
    "executed",
    "delivered",
    "automated",
    "deployed",
];

const TECH_KEYWORDS: [&str; 20] = [
    "javascript",
    "typescript",
    "python",
    "node",
    "react",
    "angular",
    "java",
    "aws",
    "azure",
    "gcp",
    "cloud",
    "api",
    "microservices",
    "docker",
    "kubernetes",
    "sql",
    "nosql",
    "ai",
    "ml",
    "data",
];

const SECTION_KEYWORDS: [&str; 9] = [
    "summary",
    "profile",
    "experience",
    "work history",
    "education",
    "skills",
    "projects",
    "certifications",
    "achievements",
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("invalid email regex")
});
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s().-]{8,}\d").expect("invalid phone regex"));
static PROFILE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(linkedin\.com|github\.com|portfolio|behance\.net|dribbble\.com)")
        .expect("invalid link regex")
});
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:•|-|\*)\s+[A-Za-z]").expect("invalid bullet regex"));
static QUANTIFIED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+%|\b\d+\s+(?:years|clients|users|projects)")
        .expect("invalid quantified regex")
});
static DEGREE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(bachelor|master|ph\.?d|b\.tech|m\.tech|mba|university|college)\b")
        .expect("invalid degree regex")
});

/// Per-dimension sub-scores, each already rounded to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackComponents {
    pub contact: i32,
    pub formatting: i32,
    pub skills: i32,
    pub experience: i32,
    pub education: i32,
    pub keywords: i32,
}

impl FallbackComponents {
    fn sum(&self) -> i32 {
        self.contact + self.formatting + self.skills + self.experience + self.education
            + self.keywords
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackAtsResult {
    pub components: FallbackComponents,
    pub total_score: i32,
    pub sections_detected: Vec<String>,
}

/// Computes the heuristic ATS score for already-extracted resume text.
/// Pure function; the [35, 100] clamp is deliberate policy — any resume
/// with extractable text is assumed minimally viable.
pub fn compute_fallback_ats(text: &str, skills: &[String]) -> FallbackAtsResult {
    let sections_detected = detect_sections(text);

    let components = FallbackComponents {
        contact: contact_score(text).round() as i32,
        formatting: formatting_score(text, sections_detected.len()).round() as i32,
        skills: skill_score(skills).round() as i32,
        experience: experience_score(text).round() as i32,
        education: education_score(text),
        keywords: keyword_score(text).round() as i32,
    };

    FallbackAtsResult {
        total_score: components.sum().clamp(35, 100),
        components,
        sections_detected,
    }
}

fn detect_sections(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    SECTION_KEYWORDS
        .iter()
        .filter(|section| lower.contains(*section))
        .map(|section| section.to_string())
        .collect()
}

/// Max 15: +7 email, +5 phone, +3 profile link.
fn contact_score(text: &str) -> f64 {
    let mut score: f64 = 0.0;
    if EMAIL_RE.is_match(text) {
        score += 7.0;
    }
    if PHONE_RE.is_match(text) {
        score += 5.0;
    }
    if PROFILE_LINK_RE.is_match(text) {
        score += 3.0;
    }
    score.min(15.0)
}

/// Max 20: section coverage plus up to 6 points of bullet density.
fn formatting_score(text: &str, sections_detected: usize) -> f64 {
    let section_coverage = sections_detected as f64 / SECTION_KEYWORDS.len() as f64 * 20.0;
    let bullet_count = BULLET_RE.find_iter(text).count() as f64;
    let bullet_bonus = (bullet_count * 1.2).min(6.0);
    (section_coverage + bullet_bonus).min(20.0)
}

/// Max 25; an empty skill list still earns a flat 5 so a resume whose
/// skills simply weren't extractable isn't over-penalized.
fn skill_score(skills: &[String]) -> f64 {
    if skills.is_empty() {
        return 5.0;
    }
    let unique: std::collections::HashSet<String> =
        skills.iter().map(|s| s.to_lowercase()).collect();
    (unique.len().min(15) as f64) / 15.0 * 25.0
}

/// Max 20, floor 8: action verbs and quantified achievements at 1.5x each,
/// plus raw bullet count.
fn experience_score(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let verb_matches = ACTION_VERBS.iter().filter(|v| lower.contains(*v)).count() as f64;
    let quant_matches = QUANTIFIED_RE.find_iter(text).count() as f64;
    let bullet_count = BULLET_RE.find_iter(text).count() as f64;

    (verb_matches * 1.5 + quant_matches * 1.5 + bullet_count)
        .min(20.0)
        .max(8.0)
}

/// 10 with a degree/institution mention, 6 without.
fn education_score(text: &str) -> i32 {
    if DEGREE_RE.is_match(text) {
        10
    } else {
        6
    }
}

/// Max 10, scaled over the tech keyword table.
fn keyword_score(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let hits = TECH_KEYWORDS.iter().filter(|k| lower.contains(*k)).count() as f64;
    (hits / TECH_KEYWORDS.len() as f64 * 12.0).min(10.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback parsed-data payload and the persisting entry point
// ────────────────────────────────────────────────────────────────────────────

/// The parsed-data shape written into `resumes.parsed_data` by fallback
/// parsing. Mirrors what the ML service would have produced, plus a
/// `fallback_generated` marker so dashboards can tell the two apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackParsedData {
    pub extracted_skills: Vec<String>,
    pub summary: String,
    pub total_words: usize,
    pub total_pages: usize,
    pub final_ats_score: i32,
    pub score_breakdown: FallbackComponents,
    pub sections_detected: Vec<String>,
    pub fallback_generated: bool,
    pub raw_text_preview: String,
}

struct TextMeta {
    pages: usize,
    word_count: usize,
}

async fn build_fallback_parsed_data(
    llm: &LlmClient,
    text: &str,
    meta: Option<TextMeta>,
) -> Result<FallbackParsedData, AppError> {
    let clean: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.is_empty() {
        return Err(AppError::Validation(
            "No textual content available for fallback parsing".to_string(),
        ));
    }

    // Skill extraction is best-effort here; scoring proceeds either way.
    let skills = extract_skills_from_text(llm, &clean).await;
    let breakdown = compute_fallback_ats(&clean, &skills);

    let (total_pages, total_words) = match meta {
        Some(m) => (m.pages, m.word_count),
        None => (1, clean.split_whitespace().count()),
    };

    Ok(FallbackParsedData {
        summary: build_summary(&clean),
        total_words,
        total_pages,
        final_ats_score: breakdown.total_score,
        score_breakdown: breakdown.components,
        sections_detected: breakdown.sections_detected,
        fallback_generated: true,
        raw_text_preview: clean.chars().take(2500).collect(),
        extracted_skills: skills,
    })
}

/// First three sentences, capped at 400 characters.
fn build_summary(text: &str) -> String {
    split_sentences(text)
        .into_iter()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(400)
        .collect()
}

/// Splits on sentence-ending punctuation followed by whitespace.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            chars.next();
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current);
    }
    sentences
}

/// Runs fallback parsing for a resume and persists the result: merges the
/// payload into `parsed_data`, marks the parse completed, and updates the
/// row-level ATS score — unless the existing score came from the ML service
/// and `force` was not requested.
pub async fn apply_fallback_parsing(
    pool: &PgPool,
    llm: &LlmClient,
    resume: &mut ResumeRow,
    force: bool,
) -> Result<FallbackParsedData, AppError> {
    let fallback = if let Some(file_path) = resume.file_path.clone() {
        let path = PathBuf::from(file_path);
        let extracted = tokio::task::spawn_blocking(move || extract_resume_text(&path))
            .await
            .map_err(|e| AppError::Internal(anyhow!("extraction task panicked: {e}")))??;
        build_fallback_parsed_data(
            llm,
            &extracted.text,
            Some(TextMeta {
                pages: extracted.pages,
                word_count: extracted.word_count,
            }),
        )
        .await?
    } else if let Some(built) = resume
        .built_resume_data
        .as_ref()
        .and_then(BuiltResumeData::from_value)
    {
        let text = built_resume_to_text(&built);
        build_fallback_parsed_data(llm, &text, None).await?
    } else {
        return Err(AppError::Validation(
            "Resume has no file path or builder data for fallback parsing".to_string(),
        ));
    };

    // Merge over any existing parsed_data rather than replacing it, so
    // fields a previous (partial) parse produced survive.
    let mut merged = match resume.parsed_data.take() {
        Some(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    if let Value::Object(payload) = serde_json::to_value(&fallback)
        .map_err(|e| AppError::Internal(anyhow!("serialize fallback payload: {e}")))?
    {
        merged.extend(payload);
    }

    let keep_existing_score =
        resume.score_source() == Some(AtsScoreSource::MlService) && !force;
    if keep_existing_score {
        info!(
            "Resume {} keeps ML-sourced ATS score {:?}; fallback computed {}",
            resume.id, resume.ats_score, fallback.final_ats_score
        );
    } else {
        resume.ats_score = Some(fallback.final_ats_score);
        resume.ats_score_source = Some(AtsScoreSource::Fallback.as_str().to_string());
    }

    resume.parsed_data = Some(Value::Object(merged));
    resume.parse_status = PARSE_STATUS_COMPLETED.to_string();

    sqlx::query(
        "UPDATE resumes SET parsed_data = $1, parse_status = $2, ats_score = $3, ats_score_source = $4 WHERE id = $5",
    )
    .bind(&resume.parsed_data)
    .bind(&resume.parse_status)
    .bind(resume.ats_score)
    .bind(&resume.ats_score_source)
    .bind(resume.id)
    .execute(pool)
    .await?;

    if fallback.extracted_skills.is_empty() {
        warn!("Fallback parsing for resume {} found no skills", resume.id);
    }

    Ok(fallback)
}

/// Flattens builder-assembled resume data into scoreable text.
pub fn built_resume_to_text(data: &BuiltResumeData) -> String {
    let mut sections: Vec<String> = Vec::new();

    let personal = &data.personal_info;
    let header: Vec<&str> = [
        personal.full_name.as_deref(),
        personal.headline.as_deref(),
        personal.summary.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !header.is_empty() {
        sections.push(header.join(" - "));
    }

    for exp in &data.experience {
        let line: Vec<String> = [
            exp.title.clone(),
            exp.company.clone(),
            exp.location.clone(),
            format_date_range(exp.start_date.as_deref(), exp.end_date.as_deref(), exp.current),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !line.is_empty() {
            sections.push(line.join(" | "));
        }
        if !exp.highlights.is_empty() {
            sections.push(exp.highlights.join(" "));
        }
    }

    for edu in &data.education {
        let line: Vec<&str> = [
            edu.degree.as_deref(),
            edu.school.as_deref(),
            edu.location.as_deref(),
            edu.grade.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !line.is_empty() {
            sections.push(line.join(" | "));
        }
    }

    let skills = data.all_skills();
    if !skills.is_empty() {
        sections.push(format!("Skills: {}", skills.join(", ")));
    }

    for project in &data.projects {
        let mut line: Vec<String> = [project.name.clone(), project.description.clone()]
            .into_iter()
            .flatten()
            .collect();
        if !project.technologies.is_empty() {
            line.push(project.technologies.join(", "));
        }
        if !line.is_empty() {
            sections.push(line.join(" - "));
        }
    }

    for cert in &data.certifications {
        let line: Vec<&str> = [cert.name.as_deref(), cert.organization.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !line.is_empty() {
            sections.push(line.join(" - "));
        }
    }

    sections.join("\n")
}

fn format_date_range(start: Option<&str>, end: Option<&str>, current: bool) -> Option<String> {
    let start = start?;
    if current {
        return Some(format!("{start} - Present"));
    }
    match end {
        Some(end) => Some(format!("{start} - {end}")),
        None => Some(start.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_computed_scenario() {
        // Email, phone, 3 section keywords, 2 action verbs, a bachelor
        // mention, 2 tech keywords, no bullets — component values are
        // computable by hand from the scoring formulas.
        let text = "Jane Doe jane@example.com +1 (555) 123-4567 \
                    Summary Experienced engineer. Experience led and built services. \
                    Skills listed below. Bachelor of Science. \
                    Worked with python and sql daily.";
        let skills: Vec<String> = (0..10).map(|i| format!("Skill{i}")).collect();

        let result = compute_fallback_ats(text, &skills);

        // contact: email 7 + phone 5 = 12
        assert_eq!(result.components.contact, 12);
        // sections: summary, experience, skills = 3 → 3/9*20 = 6.67 → 7
        assert_eq!(result.components.formatting, 7);
        assert_eq!(result.sections_detected.len(), 3);
        // skills: 10 unique → 10/15*25 = 16.67 → 17
        assert_eq!(result.components.skills, 17);
        // experience: verbs led+built = 2*1.5 = 3 → floored at 8
        assert_eq!(result.components.experience, 8);
        assert_eq!(result.components.education, 10);
        // keywords: python, sql → 2/20*12 = 1.2 → 1
        assert_eq!(result.components.keywords, 1);
        // total: 12+7+17+8+10+1 = 55
        assert_eq!(result.total_score, 55);
    }

    #[test]
    fn test_minimal_text_floors_at_35() {
        let result = compute_fallback_ats("nothing remarkable in this short blurb at all", &[]);
        assert!(result.total_score >= 35);
        assert_eq!(result.total_score, 35);
    }

    #[test]
    fn test_total_never_exceeds_100() {
        let mut text = String::from(
            "contact me at ace@example.com or +1 (555) 987-6543, see linkedin.com/in/ace \
             Summary Profile Experience Work History Education Skills Projects Certifications Achievements ",
        );
        for verb in ACTION_VERBS {
            text.push_str(&format!("• {verb} something measurable by 40% across 12 projects. "));
        }
        for kw in TECH_KEYWORDS {
            text.push_str(kw);
            text.push(' ');
        }
        text.push_str("Bachelor at University. ");
        let skills: Vec<String> = (0..30).map(|i| format!("Skill{i}")).collect();

        let result = compute_fallback_ats(&text, &skills);
        assert!(result.total_score <= 100);
        assert_eq!(result.components.contact, 15);
        assert_eq!(result.components.formatting, 20);
        assert_eq!(result.components.skills, 25);
        assert_eq!(result.components.experience, 20);
        assert_eq!(result.components.education, 10);
        assert_eq!(result.components.keywords, 10);
    }

    #[test]
    fn test_skill_score_empty_is_flat_five() {
        assert_eq!(skill_score(&[]), 5.0);
    }

    #[test]
    fn test_skill_score_dedupes_case_insensitively() {
        let skills = vec!["Rust".to_string(), "rust".to_string(), "SQL".to_string()];
        // 2 unique → 2/15*25
        assert!((skill_score(&skills) - 2.0 / 15.0 * 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_education_score_tiers() {
        assert_eq!(education_score("B.Tech from IIT"), 10);
        assert_eq!(education_score("self taught"), 6);
    }

    #[test]
    fn test_experience_floor_is_eight() {
        assert_eq!(experience_score("plain text with no signals"), 8.0);
    }

    #[test]
    fn test_build_summary_takes_three_sentences() {
        let text = "First sentence. Second one! Third here? Fourth ignored.";
        assert_eq!(build_summary(text), "First sentence. Second one! Third here?");
    }

    #[test]
    fn test_built_resume_to_text_includes_all_sections() {
        let data: BuiltResumeData = serde_json::from_value(serde_json::json!({
            "personalInfo": {"fullName": "Jane Doe", "headline": "Engineer"},
            "experience": [{
                "title": "Developer",
                "company": "Acme",
                "startDate": "2020-01-01",
                "current": true,
                "highlights": ["Built the billing system"]
            }],
            "education": [{"degree": "BSc", "school": "State University"}],
            "skills": {"technical": ["Rust"], "tools": ["Git"], "soft": ["Mentoring"]},
            "projects": [{"name": "Ledger", "description": "Accounting engine", "technologies": ["Postgres"]}],
            "certifications": [{"name": "CKA", "organization": "CNCF"}]
        }))
        .unwrap();

        let text = built_resume_to_text(&data);
        assert!(text.contains("Jane Doe - Engineer"));
        assert!(text.contains("Developer | Acme | 2020-01-01 - Present"));
        assert!(text.contains("Built the billing system"));
        assert!(text.contains("BSc | State University"));
        assert!(text.contains("Skills: Rust, Git, Mentoring"));
        assert!(text.contains("Ledger - Accounting engine - Postgres"));
        assert!(text.contains("CKA - CNCF"));
    }
}
