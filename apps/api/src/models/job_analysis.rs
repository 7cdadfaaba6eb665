use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted job-matching analysis. Created once per request by the
/// orchestrator and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobAnalysisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub job_url: String,
    pub job_title: String,
    pub company_name: Option<String>,
    pub job_description: String,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub salary: Option<String>,
    /// None when the host didn't match a known job board.
    pub job_board: Option<String>,
    pub scrape_strategy: String,
    pub match_score: i32,
    pub match_grade: String,
    pub match_breakdown: Value,
    pub match_insights: Vec<String>,
    pub user_skills: Vec<String>,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,
    pub areas_to_improve: Vec<String>,
    pub ai_summary: String,
    /// Candidate ATS score at analysis time, with its provenance tag.
    pub ats_score_snapshot: Option<i32>,
    pub ats_score_source: Option<String>,
    pub created_at: DateTime<Utc>,
}
