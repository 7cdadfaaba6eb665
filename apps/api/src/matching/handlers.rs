//! Axum route handlers for the job-matching API.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analyzer::apply_fallback_parsing;
use crate::errors::AppError;
use crate::models::job_analysis::JobAnalysisRow;
use crate::models::resume::{AtsScoreSource, ResumeRow, PARSE_STATUS_COMPLETED, PARSE_STATUS_PENDING};
use crate::state::AppState;

use super::pipeline::run_job_analysis;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: Uuid,
    pub job_url: String,
    /// Defaults to the user's most recent resume when absent.
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: JobAnalysisRow,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeWithUploadResponse {
    pub analysis: JobAnalysisRow,
    pub resume_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub analyses: Vec<JobAnalysisRow>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/job-matching/analyze
///
/// Analyzes a job URL against an existing resume.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.job_url.trim().is_empty() {
        return Err(AppError::Validation("job_url is required".to_string()));
    }

    let resume = resolve_resume(&state, request.user_id, request.resume_id).await?;
    let analysis = run_job_analysis(&state, request.user_id, &resume, &request.job_url).await?;

    Ok(Json(AnalyzeResponse { analysis }))
}

/// POST /api/v1/job-matching/analyze-with-upload
///
/// Multipart upload: `user_id`, `job_url`, and a PDF/DOCX `file`. Creates a
/// resume row, parses it (ML service with local fallback), then runs the
/// same analysis pipeline. The resume row is rolled back if scraping fails
/// so a bad job URL doesn't leave orphans behind.
pub async fn handle_analyze_with_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeWithUploadResponse>, AppError> {
    let upload = read_upload(multipart).await?;

    let file_path = store_upload(&state, &upload).await?;
    let mut resume = insert_resume(&state, upload.user_id, &upload.file_name, &file_path).await?;
    info!("Resume {} stored at {file_path}", resume.id);

    // Primary parse via the ML service; local heuristics when it is down.
    match state
        .ml
        .parse_resume(std::path::Path::new(&file_path), &upload.file_name)
        .await
    {
        Ok(parsed) => {
            resume.ats_score = parsed.final_ats_score.map(|s| s.round() as i32);
            resume.ats_score_source = resume
                .ats_score
                .map(|_| AtsScoreSource::MlService.as_str().to_string());
            resume.parsed_data = Some(
                serde_json::to_value(&parsed).map_err(|e| AppError::Internal(e.into()))?,
            );
            resume.parse_status = PARSE_STATUS_COMPLETED.to_string();
            persist_parse_outcome(&state, &resume).await?;
            info!("Resume {} parsed by ML service", resume.id);
        }
        Err(e) => {
            warn!("ML parsing failed for resume {}: {e:#}", resume.id);
            if let Err(fallback_err) =
                apply_fallback_parsing(&state.db, &state.llm, &mut resume, false).await
            {
                // The document itself is unusable; roll the upload back.
                remove_resume(&state, &resume).await;
                return Err(fallback_err);
            }
            info!("Resume {} parsed by local fallback analyzer", resume.id);
        }
    }

    match run_job_analysis(&state, upload.user_id, &resume, &upload.job_url).await {
        Ok(analysis) => Ok(Json(AnalyzeWithUploadResponse {
            resume_id: resume.id,
            analysis,
        })),
        Err(e) => {
            // No orphaned uploads for unreachable job URLs.
            if matches!(e, AppError::Scrape(_)) {
                remove_resume(&state, &resume).await;
            }
            Err(e)
        }
    }
}

/// GET /api/v1/job-matching/history?user_id&limit&page
pub async fn handle_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let analyses = sqlx::query_as::<_, JobAnalysisRow>(
        "SELECT * FROM job_analyses WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(query.user_id)
    .bind(limit)
    .bind((page - 1) * limit)
    .fetch_all(&state.db)
    .await?;

    let total: i64 =
        sqlx::query_scalar("SELECT count(*) FROM job_analyses WHERE user_id = $1")
            .bind(query.user_id)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(HistoryResponse {
        analyses,
        total,
        page,
        total_pages: (total + limit - 1) / limit,
    }))
}

/// GET /api/v1/job-matching/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let analysis = sqlx::query_as::<_, JobAnalysisRow>("SELECT * FROM job_analyses WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job analysis {id} not found")))?;

    Ok(Json(AnalyzeResponse { analysis }))
}

/// DELETE /api/v1/job-matching/:id
pub async fn handle_delete_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    let result = sqlx::query("DELETE FROM job_analyses WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job analysis {id} not found")));
    }

    Ok(Json(DeleteResponse { deleted: true }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

struct Upload {
    user_id: Uuid,
    job_url: String,
    file_name: String,
    data: Bytes,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut user_id = None;
    let mut job_url = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid user_id field: {e}")))?;
                user_id = Some(
                    text.parse::<Uuid>()
                        .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?,
                );
            }
            Some("job_url") => {
                job_url = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Invalid job_url field: {e}"))
                })?);
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("resume.pdf")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read uploaded file: {e}"))
                })?;
                file = Some((file_name, data));
            }
            _ => {}
        }
    }

    let user_id =
        user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    let job_url = job_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_url is required".to_string()))?;
    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("Resume file is required".to_string()))?;

    Ok(Upload {
        user_id,
        job_url,
        file_name,
        data,
    })
}

/// Writes the upload under the configured upload dir with a fresh name;
/// the original extension survives so the extractor can dispatch on it.
async fn store_upload(state: &AppState, upload: &Upload) -> Result<String, AppError> {
    let extension = std::path::Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("pdf")
        .to_lowercase();

    let path = state
        .config
        .upload_dir
        .join(format!("{}.{extension}", Uuid::new_v4()));
    tokio::fs::write(&path, &upload.data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store upload: {e}")))?;

    Ok(path.to_string_lossy().into_owned())
}

async fn insert_resume(
    state: &AppState,
    user_id: Uuid,
    original_name: &str,
    file_path: &str,
) -> Result<ResumeRow, AppError> {
    let resume = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (id, user_id, original_name, file_path, parse_status, created_at)
        VALUES ($1, $2, $3, $4, $5, now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(original_name)
    .bind(file_path)
    .bind(PARSE_STATUS_PENDING)
    .fetch_one(&state.db)
    .await?;

    Ok(resume)
}

async fn persist_parse_outcome(state: &AppState, resume: &ResumeRow) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE resumes SET parsed_data = $1, parse_status = $2, ats_score = $3, ats_score_source = $4 WHERE id = $5",
    )
    .bind(&resume.parsed_data)
    .bind(&resume.parse_status)
    .bind(resume.ats_score)
    .bind(&resume.ats_score_source)
    .bind(resume.id)
    .execute(&state.db)
    .await?;
    Ok(())
}

/// Best-effort rollback of a freshly created resume row and its file.
async fn remove_resume(state: &AppState, resume: &ResumeRow) {
    if let Err(e) = sqlx::query("DELETE FROM resumes WHERE id = $1")
        .bind(resume.id)
        .execute(&state.db)
        .await
    {
        warn!("Failed to delete resume row {}: {e}", resume.id);
    }
    if let Some(path) = &resume.file_path {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!("Failed to delete uploaded file {path}: {e}");
        }
    }
}

async fn resolve_resume(
    state: &AppState,
    user_id: Uuid,
    resume_id: Option<Uuid>,
) -> Result<ResumeRow, AppError> {
    let resume = match resume_id {
        Some(id) => {
            sqlx::query_as::<_, ResumeRow>(
                "SELECT * FROM resumes WHERE id = $1 AND user_id = $2",
            )
            .bind(id)
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, ResumeRow>(
                "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?
        }
    };

    resume.ok_or_else(|| {
        AppError::NotFound(
            "No resume found. Please upload or create a resume first.".to_string(),
        )
    })
}
