//! AI job-fit analysis: one LLM call that splits the posting into required
//! and preferred skills and maps them against the candidate.
//!
//! The model is a third-party dependency and therefore expected to fail
//! sometimes; every failure path lands on a fixed fallback analysis so the
//! request always proceeds to scoring.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::LlmClient;
use crate::scrape::JobPosting;

use super::prompts::{JOB_FIT_PROMPT_TEMPLATE, JOB_FIT_SYSTEM, NO_SKILLS_NOTE};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobFitAnalysis {
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub areas_to_improve: Vec<String>,
    pub recommendations: Vec<String>,
    pub summary: String,
}

/// Runs the fit analysis, degrading to `fallback_analysis` on any model or
/// parse failure. Never errors.
pub async fn analyze_job_fit(
    llm: &LlmClient,
    posting: &JobPosting,
    candidate_skills: &[String],
    candidate_summary: Option<&str>,
) -> JobFitAnalysis {
    let prompt = build_prompt(posting, candidate_skills, candidate_summary);

    match llm.call_json::<JobFitAnalysis>(&prompt, JOB_FIT_SYSTEM).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("AI job-fit analysis failed, using fallback: {e}");
            fallback_analysis(candidate_skills)
        }
    }
}

fn build_prompt(
    posting: &JobPosting,
    candidate_skills: &[String],
    candidate_summary: Option<&str>,
) -> String {
    let skills_text = if candidate_skills.is_empty() {
        "No skills data available - please analyze based on job requirements only".to_string()
    } else {
        candidate_skills.join(", ")
    };

    JOB_FIT_PROMPT_TEMPLATE
        .replace("{job_title}", &posting.job_title)
        .replace(
            "{company_name}",
            posting.company_name.as_deref().unwrap_or("Not specified"),
        )
        .replace(
            "{location}",
            posting.location.as_deref().unwrap_or("Not specified"),
        )
        .replace(
            "{experience}",
            posting.experience.as_deref().unwrap_or("Not specified"),
        )
        .replace("{job_description}", &posting.job_description)
        .replace("{candidate_skills}", &skills_text)
        .replace(
            "{candidate_summary}",
            candidate_summary.unwrap_or("Not available"),
        )
        .replace(
            "{no_skills_note}",
            if candidate_skills.is_empty() {
                NO_SKILLS_NOTE
            } else {
                ""
            },
        )
}

/// Fixed analysis used when the model is unavailable or unparseable:
/// assume roughly 60% of the candidate's skills apply and hand back
/// placeholder guidance rather than failing the request.
pub fn fallback_analysis(candidate_skills: &[String]) -> JobFitAnalysis {
    let matching_count = (candidate_skills.len() as f64 * 0.6).floor() as usize;

    JobFitAnalysis {
        required_skills: Vec::new(),
        preferred_skills: Vec::new(),
        matching_skills: candidate_skills[..matching_count].to_vec(),
        missing_skills: Vec::new(),
        strengths: vec!["Existing skill set".to_string()],
        areas_to_improve: vec!["Continue learning and growing".to_string()],
        recommendations: vec![
            "Review the job requirements carefully".to_string(),
            "Highlight relevant experience in your resume".to_string(),
        ],
        summary: "Basic analysis completed. For detailed insights, please try again.".to_string(),
    }
}
