//! The job-matching orchestrator: profile derivation, scrape, AI analysis,
//! scoring, and a single persisted `job_analyses` row per request.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job_analysis::JobAnalysisRow;
use crate::models::resume::ResumeRow;
use crate::state::AppState;

use super::ai_analysis::{analyze_job_fit, JobFitAnalysis};
use super::profile::{derive_profile, profile_summary};
use super::scorer::{calculate_match_score, JobRequirements, MatchResult};

/// Runs the full analysis pipeline for one resume and job URL.
///
/// Scrape failures surface to the caller (with the job-board hint); AI
/// failures do not — the fit analysis degrades internally and scoring is
/// pure, so past the scrape everything completes.
pub async fn run_job_analysis(
    state: &AppState,
    user_id: Uuid,
    resume: &ResumeRow,
    job_url: &str,
) -> Result<JobAnalysisRow, AppError> {
    let profile = derive_profile(resume);
    info!(
        "Analyzing job for resume {} ({} skills)",
        resume.id,
        profile.skills.len()
    );

    let posting = state.scraper.scrape(job_url).await?;
    info!("Job posting scraped: {}", posting.job_title);

    let summary = profile_summary(resume);
    let fit = analyze_job_fit(&state.llm, &posting, &profile.skills, summary.as_deref()).await;

    let job = JobRequirements {
        required_skills: fit.required_skills.clone(),
        preferred_skills: fit.preferred_skills.clone(),
        experience: posting.experience.clone(),
        job_description: posting.job_description.clone(),
    };
    let result = calculate_match_score(
        &profile.skills,
        &fit.matching_skills,
        &fit.missing_skills,
        &job,
        profile.experience_years,
        profile.ats_score,
    );
    info!(
        "Match score {} ({}) for resume {}",
        result.score,
        result.grade.label(),
        resume.id
    );

    let analysis = insert_analysis(
        &state.db,
        AnalysisRecord {
            user_id,
            resume_id: resume.id,
            job_url,
            posting: &posting,
            fit: &fit,
            result: &result,
            user_skills: &profile.skills,
            ats_score_snapshot: profile.ats_score,
            ats_score_source: profile.ats_score_source.map(|s| s.as_str().to_string()),
        },
    )
    .await?;

    Ok(analysis)
}

struct AnalysisRecord<'a> {
    user_id: Uuid,
    resume_id: Uuid,
    job_url: &'a str,
    posting: &'a crate::scrape::JobPosting,
    fit: &'a JobFitAnalysis,
    result: &'a MatchResult,
    user_skills: &'a [String],
    ats_score_snapshot: Option<i32>,
    ats_score_source: Option<String>,
}

async fn insert_analysis(
    pool: &PgPool,
    record: AnalysisRecord<'_>,
) -> Result<JobAnalysisRow, AppError> {
    let breakdown = serde_json::to_value(record.result.breakdown)
        .map_err(|e| AppError::Internal(e.into()))?;

    let analysis = sqlx::query_as::<_, JobAnalysisRow>(
        r#"
        INSERT INTO job_analyses (
            id, user_id, resume_id, job_url,
            job_title, company_name, job_description, location, experience, salary,
            job_board, scrape_strategy,
            match_score, match_grade, match_breakdown, match_insights,
            user_skills, matching_skills, missing_skills,
            required_skills, preferred_skills,
            recommendations, strengths, areas_to_improve, ai_summary,
            ats_score_snapshot, ats_score_source, created_at
        )
        VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
            $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, now()
        )
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(record.user_id)
    .bind(record.resume_id)
    .bind(record.job_url)
    .bind(&record.posting.job_title)
    .bind(&record.posting.company_name)
    .bind(&record.posting.job_description)
    .bind(&record.posting.location)
    .bind(&record.posting.experience)
    .bind(&record.posting.salary)
    .bind(record.posting.job_board.map(|b| b.as_str()))
    .bind(record.posting.scrape_strategy.as_str())
    .bind(record.result.score)
    .bind(record.result.grade.label())
    .bind(breakdown)
    .bind(&record.result.insights)
    .bind(record.user_skills)
    .bind(&record.fit.matching_skills)
    .bind(&record.fit.missing_skills)
    .bind(&record.fit.required_skills)
    .bind(&record.fit.preferred_skills)
    .bind(&record.fit.recommendations)
    .bind(&record.fit.strengths)
    .bind(&record.fit.areas_to_improve)
    .bind(&record.fit.summary)
    .bind(record.ats_score_snapshot)
    .bind(record.ats_score_source)
    .fetch_one(pool)
    .await?;

    Ok(analysis)
}
