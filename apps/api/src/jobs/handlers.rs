use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::jobs::search::{
    search_jobs, JobSearchPage, JobSearchParams, SortBy, DEFAULT_PAGE_SIZE,
};
use crate::models::job::JobRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobSearchQuery {
    pub query: Option<String>,
    pub location: Option<String>,
    /// Comma-separated skills.
    pub skills: Option<String>,
    pub stipend_min: Option<f64>,
    pub stipend_max: Option<f64>,
    pub job_type: Option<String>,
    pub is_remote: Option<bool>,
    pub sort_by: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/jobs/search
pub async fn handle_search(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<JobSearchQuery>,
) -> Result<Json<JobSearchPage>, AppError> {
    let skills = params.skills.map(|s| {
        s.split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
    });

    let page = search_jobs(
        &state.db,
        JobSearchParams {
            query: params.query,
            location: params.location,
            skills,
            stipend_min: params.stipend_min,
            stipend_max: params.stipend_max,
            job_type: params.job_type,
            is_remote: params.is_remote,
            sort_by: SortBy::parse(params.sort_by.as_deref().unwrap_or("created_at")),
            page: params.page.unwrap_or(1),
            page_size: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        },
    )
    .await?;

    Ok(Json(page))
}

#[derive(Debug, Serialize)]
pub struct JobDetailResponse {
    #[serde(flatten)]
    pub job: JobRow,
    pub company_name: Option<String>,
}

/// GET /api/jobs/:id
///
/// Open-job detail; each fetch counts as a view.
pub async fn handle_job_detail(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job: Option<JobRow> = sqlx::query_as(
        r#"
        UPDATE jobs SET views_count = views_count + 1
        WHERE id = $1 AND is_approved AND is_active
        RETURNING *
        "#,
    )
    .bind(job_id)
    .fetch_optional(&state.db)
    .await?;
    let job = job.ok_or_else(|| AppError::NotFound("Job not found or not active".to_string()))?;

    let company_name: Option<(String,)> =
        sqlx::query_as("SELECT company_name FROM recruiter_profiles WHERE id = $1")
            .bind(job.recruiter_id)
            .fetch_optional(&state.db)
            .await?;

    Ok(Json(JobDetailResponse {
        job,
        company_name: company_name.map(|(name,)| name),
    }))
}
