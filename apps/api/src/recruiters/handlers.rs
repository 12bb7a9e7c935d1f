//! Recruiter-facing endpoints: company profile, job postings, applicant
//! review, resume download, status changes, and the analytics dashboard.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json as SqlJson;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::analytics::{recruiter_analytics, RecruiterAnalytics};
use crate::applications::workflow::{change_status, ApplicationStatus};
use crate::auth::{CurrentUser, Role};
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::job::{JobRow, RecruiterProfileRow};
use crate::models::user::{EducationEntry, ExperienceEntry, ResumeRow};
use crate::notifications::service::{notify, Notify};
use crate::state::AppState;
use crate::storage::get_object;

/// Looks up the caller's recruiter profile; most recruiter endpoints hang
/// their ownership checks off this row.
pub async fn recruiter_profile_for(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<RecruiterProfileRow, AppError> {
    sqlx::query_as::<_, RecruiterProfileRow>(
        "SELECT * FROM recruiter_profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Recruiter profile not found".to_string()))
}

async fn owned_job(
    pool: &PgPool,
    recruiter_id: Uuid,
    job_id: Uuid,
) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1 AND recruiter_id = $2")
        .bind(job_id)
        .bind(recruiter_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

// ---------------------------------------------------------------------------
// Company profile
// ---------------------------------------------------------------------------

/// GET /api/recruiter/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<RecruiterProfileRow>, AppError> {
    user.ensure_role(Role::Recruiter)?;
    Ok(Json(recruiter_profile_for(&state.db, user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RecruiterProfileUpdate {
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub company_logo: Option<String>,
    pub headquarters: Option<String>,
}

/// PUT /api/recruiter/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<RecruiterProfileUpdate>,
) -> Result<Json<RecruiterProfileRow>, AppError> {
    user.ensure_role(Role::Recruiter)?;
    recruiter_profile_for(&state.db, user.id).await?;

    let profile: RecruiterProfileRow = sqlx::query_as(
        r#"
        UPDATE recruiter_profiles SET
            company_name = COALESCE($2, company_name),
            company_description = COALESCE($3, company_description),
            website = COALESCE($4, website),
            industry = COALESCE($5, industry),
            company_size = COALESCE($6, company_size),
            company_logo = COALESCE($7, company_logo),
            headquarters = COALESCE($8, headquarters)
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&req.company_name)
    .bind(&req.company_description)
    .bind(&req.website)
    .bind(&req.industry)
    .bind(&req.company_size)
    .bind(&req.company_logo)
    .bind(&req.headquarters)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(profile))
}

// ---------------------------------------------------------------------------
// Job postings
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JobCreateRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills_required: Vec<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_remote: bool,
    pub stipend_min: Option<f64>,
    pub stipend_max: Option<f64>,
    pub job_type: Option<String>,
    pub duration: Option<String>,
    pub openings: Option<i32>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    #[serde(flatten)]
    pub job: JobRow,
    pub company_name: String,
}

/// POST /api/recruiter/jobs
///
/// New postings start unapproved; they surface to applicants only after an
/// admin approves them.
pub async fn handle_create_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<JobCreateRequest>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    user.ensure_role(Role::Recruiter)?;
    let recruiter = recruiter_profile_for(&state.db, user.id).await?;

    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Job title is required".to_string()));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::Validation("Job description is required".to_string()));
    }

    let job: JobRow = sqlx::query_as(
        r#"
        INSERT INTO jobs
            (recruiter_id, title, description, requirements, skills_required, location,
             is_remote, stipend_min, stipend_max, job_type, duration, openings, deadline)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(recruiter.id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(&req.requirements)
    .bind(&req.skills_required)
    .bind(&req.location)
    .bind(req.is_remote)
    .bind(req.stipend_min)
    .bind(req.stipend_max)
    .bind(req.job_type.as_deref().unwrap_or("internship"))
    .bind(&req.duration)
    .bind(req.openings.unwrap_or(1))
    .bind(req.deadline)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(JobResponse {
            job,
            company_name: recruiter.company_name,
        }),
    ))
}

/// GET /api/recruiter/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<JobResponse>>, AppError> {
    user.ensure_role(Role::Recruiter)?;
    let recruiter = recruiter_profile_for(&state.db, user.id).await?;

    let jobs: Vec<JobRow> = sqlx::query_as(
        "SELECT * FROM jobs WHERE recruiter_id = $1 ORDER BY created_at DESC",
    )
    .bind(recruiter.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(
        jobs.into_iter()
            .map(|job| JobResponse {
                job,
                company_name: recruiter.company_name.clone(),
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct JobUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub skills_required: Option<Vec<String>>,
    pub location: Option<String>,
    pub is_remote: Option<bool>,
    pub stipend_min: Option<f64>,
    pub stipend_max: Option<f64>,
    pub job_type: Option<String>,
    pub duration: Option<String>,
    pub openings: Option<i32>,
    pub deadline: Option<DateTime<Utc>>,
    /// Recruiter-gated visibility flag. Admin approval is separate.
    pub is_active: Option<bool>,
}

/// PUT /api/recruiter/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(req): Json<JobUpdateRequest>,
) -> Result<Json<JobResponse>, AppError> {
    user.ensure_role(Role::Recruiter)?;
    let recruiter = recruiter_profile_for(&state.db, user.id).await?;
    owned_job(&state.db, recruiter.id, job_id).await?;

    let job: JobRow = sqlx::query_as(
        r#"
        UPDATE jobs SET
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            requirements = COALESCE($5, requirements),
            skills_required = COALESCE($6, skills_required),
            location = COALESCE($7, location),
            is_remote = COALESCE($8, is_remote),
            stipend_min = COALESCE($9, stipend_min),
            stipend_max = COALESCE($10, stipend_max),
            job_type = COALESCE($11, job_type),
            duration = COALESCE($12, duration),
            openings = COALESCE($13, openings),
            deadline = COALESCE($14, deadline),
            is_active = COALESCE($15, is_active),
            updated_at = NOW()
        WHERE id = $1 AND recruiter_id = $2
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(recruiter.id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.requirements)
    .bind(&req.skills_required)
    .bind(&req.location)
    .bind(req.is_remote)
    .bind(req.stipend_min)
    .bind(req.stipend_max)
    .bind(&req.job_type)
    .bind(&req.duration)
    .bind(req.openings)
    .bind(req.deadline)
    .bind(req.is_active)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(JobResponse {
        job,
        company_name: recruiter.company_name,
    }))
}

// ---------------------------------------------------------------------------
// Applicants
// ---------------------------------------------------------------------------

#[derive(Debug, FromRow)]
struct ApplicantRow {
    id: Uuid,
    user_id: Uuid,
    job_id: Uuid,
    resume_id: Option<Uuid>,
    cover_letter: Option<String>,
    status: String,
    matching_score: Option<f64>,
    applied_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    job_title: Option<String>,
    applicant_name: Option<String>,
    applicant_email: Option<String>,
    profile_skills: Option<Vec<String>>,
    resume_skills: Option<Vec<String>>,
    education: Option<SqlJson<Vec<EducationEntry>>>,
    experience: Option<SqlJson<Vec<ExperienceEntry>>>,
}

#[derive(Debug, Serialize)]
pub struct ApplicantResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub cover_letter: Option<String>,
    pub status: String,
    pub matching_score: Option<f64>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub job_title: Option<String>,
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    /// Union of profile skills and the application resume's parsed skills.
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
}

impl From<ApplicantRow> for ApplicantResponse {
    fn from(row: ApplicantRow) -> Self {
        let mut skills = row.profile_skills.unwrap_or_default();
        for skill in row.resume_skills.unwrap_or_default() {
            if !skills.iter().any(|s| s.eq_ignore_ascii_case(&skill)) {
                skills.push(skill);
            }
        }

        ApplicantResponse {
            id: row.id,
            user_id: row.user_id,
            job_id: row.job_id,
            resume_id: row.resume_id,
            cover_letter: row.cover_letter,
            status: row.status,
            matching_score: row.matching_score,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
            job_title: row.job_title,
            applicant_name: row.applicant_name,
            applicant_email: row.applicant_email,
            skills,
            education: row.education.map(|j| j.0).unwrap_or_default(),
            experience: row.experience.map(|j| j.0).unwrap_or_default(),
        }
    }
}

const APPLICANT_SELECT: &str = r#"
    SELECT a.id, a.user_id, a.job_id, a.resume_id, a.cover_letter, a.status,
           a.matching_score, a.applied_at, a.updated_at,
           j.title AS job_title,
           p.full_name AS applicant_name,
           u.email AS applicant_email,
           p.skills AS profile_skills,
           res.parsed_skills AS resume_skills,
           p.education, p.experience
    FROM applications a
    JOIN jobs j ON j.id = a.job_id
    JOIN users u ON u.id = a.user_id
    LEFT JOIN user_profiles p ON p.user_id = a.user_id
    LEFT JOIN resumes res ON res.id = a.resume_id
"#;

/// GET /api/recruiter/jobs/:id/applicants
///
/// Sorted best match first; unscored applications trail.
pub async fn handle_job_applicants(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicantResponse>>, AppError> {
    user.ensure_role(Role::Recruiter)?;
    let recruiter = recruiter_profile_for(&state.db, user.id).await?;
    owned_job(&state.db, recruiter.id, job_id).await?;

    let sql = format!(
        "{APPLICANT_SELECT} WHERE a.job_id = $1 ORDER BY a.matching_score DESC NULLS LAST"
    );
    let rows: Vec<ApplicantRow> = sqlx::query_as(&sql)
        .bind(job_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET /api/recruiter/applicants
pub async fn handle_all_applicants(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ApplicantResponse>>, AppError> {
    user.ensure_role(Role::Recruiter)?;
    let recruiter = recruiter_profile_for(&state.db, user.id).await?;

    let sql = format!(
        "{APPLICANT_SELECT} WHERE j.recruiter_id = $1 ORDER BY a.applied_at DESC"
    );
    let rows: Vec<ApplicantRow> = sqlx::query_as(&sql)
        .bind(recruiter.id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct SkillFilterQuery {
    /// Comma-separated skills; an applicant matches on any of them.
    pub skills: String,
}

/// GET /api/recruiter/jobs/:id/applicants/filter
pub async fn handle_filter_applicants(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
    Query(params): Query<SkillFilterQuery>,
) -> Result<Json<Vec<ApplicantResponse>>, AppError> {
    user.ensure_role(Role::Recruiter)?;
    let recruiter = recruiter_profile_for(&state.db, user.id).await?;
    owned_job(&state.db, recruiter.id, job_id).await?;

    let wanted: Vec<String> = params
        .skills
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if wanted.is_empty() {
        return Err(AppError::Validation(
            "At least one skill to filter by is required".to_string(),
        ));
    }

    let sql = format!("{APPLICANT_SELECT} WHERE a.job_id = $1 ORDER BY a.applied_at DESC");
    let rows: Vec<ApplicantRow> = sqlx::query_as(&sql)
        .bind(job_id)
        .fetch_all(&state.db)
        .await?;

    let filtered: Vec<ApplicantResponse> = rows
        .into_iter()
        .map(ApplicantResponse::from)
        .filter(|applicant| {
            applicant
                .skills
                .iter()
                .any(|s| wanted.contains(&s.to_lowercase()))
        })
        .collect();

    Ok(Json(filtered))
}

/// GET /api/recruiter/applicants/:application_id/resume/download
pub async fn handle_download_resume(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    user.ensure_role(Role::Recruiter)?;
    let recruiter = recruiter_profile_for(&state.db, user.id).await?;

    let application: Option<ApplicationRow> =
        sqlx::query_as("SELECT * FROM applications WHERE id = $1")
            .bind(application_id)
            .fetch_optional(&state.db)
            .await?;
    let application =
        application.ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    // The application must be for one of this recruiter's jobs.
    let owns: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM jobs WHERE id = $1 AND recruiter_id = $2")
            .bind(application.job_id)
            .bind(recruiter.id)
            .fetch_optional(&state.db)
            .await?;
    if owns.is_none() {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let resume_id = application.resume_id.ok_or_else(|| {
        AppError::NotFound("No resume attached to this application".to_string())
    })?;
    let resume: Option<ResumeRow> = sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
        .bind(resume_id)
        .fetch_optional(&state.db)
        .await?;
    let resume = resume.ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    let bytes = get_object(&state.s3, &state.config.s3_bucket, &resume.s3_key).await?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", resume.filename),
            ),
        ],
        bytes,
    ))
}

// ---------------------------------------------------------------------------
// Status changes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub job_title: String,
}

/// PUT /api/recruiter/applications/:id/status
///
/// Validates the status against the closed enum, records the transition in
/// history, and notifies the applicant. A value outside the enum is
/// rejected before anything is written.
pub async fn handle_change_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<StatusUpdateResponse>, AppError> {
    user.ensure_role(Role::Recruiter)?;

    let new_status = ApplicationStatus::parse(&req.status).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid status. Must be one of: {}",
            ApplicationStatus::valid_values()
        ))
    })?;

    let application: Option<ApplicationRow> =
        sqlx::query_as("SELECT * FROM applications WHERE id = $1")
            .bind(application_id)
            .fetch_optional(&state.db)
            .await?;
    let application =
        application.ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let recruiter = recruiter_profile_for(&state.db, user.id).await?;
    let job: Option<JobRow> =
        sqlx::query_as("SELECT * FROM jobs WHERE id = $1 AND recruiter_id = $2")
            .bind(application.job_id)
            .bind(recruiter.id)
            .fetch_optional(&state.db)
            .await?;
    let job = job.ok_or_else(|| AppError::Forbidden("Access denied".to_string()))?;

    change_status(
        &state.db,
        &application,
        new_status,
        user.id,
        req.notes.as_deref(),
    )
    .await?;

    notify(
        &state.db,
        &state.registry,
        Notify {
            user_id: application.user_id,
            kind: "application_update",
            title: "Application Status Updated",
            message: &format!(
                "Your application for '{}' has been updated to: {}",
                job.title,
                new_status.as_str()
            ),
            reference_id: Some(application.id),
            reference_type: Some("application"),
        },
    )
    .await?;

    Ok(Json(StatusUpdateResponse {
        id: application.id,
        job_id: application.job_id,
        user_id: application.user_id,
        status: new_status.as_str().to_string(),
        job_title: job.title,
    }))
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// GET /api/recruiter/analytics
pub async fn handle_analytics(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<RecruiterAnalytics>, AppError> {
    user.ensure_role(Role::Recruiter)?;
    let recruiter = recruiter_profile_for(&state.db, user.id).await?;
    Ok(Json(recruiter_analytics(&state.db, recruiter.id).await?))
}
