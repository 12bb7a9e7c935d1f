use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::{CurrentUser, Role};
use crate::errors::AppError;
use crate::matching::score::score_candidate_against_job;
use crate::models::application::{ApplicationRow, StatusHistoryRow};
use crate::models::interview::InterviewRow;
use crate::models::job::JobRow;
use crate::models::user::ResumeRow;
use crate::notifications::service::{notify, Notify};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub resume_id: Option<Uuid>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
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
    pub company_name: Option<String>,
}

impl ApplicationResponse {
    fn from_row(
        app: ApplicationRow,
        job_title: Option<String>,
        company_name: Option<String>,
    ) -> Self {
        ApplicationResponse {
            id: app.id,
            user_id: app.user_id,
            job_id: app.job_id,
            resume_id: app.resume_id,
            cover_letter: app.cover_letter,
            status: app.status,
            matching_score: app.matching_score,
            applied_at: app.applied_at,
            updated_at: app.updated_at,
            job_title,
            company_name,
        }
    }
}

/// POST /api/jobs/:job_id/apply
///
/// Applies the caller to an open job. Duplicate applications are a
/// Conflict; the store's (user_id, job_id) uniqueness backs the check. The
/// matching score is computed from the chosen (or primary) resume when it
/// has parsed skills, else left null.
pub async fn handle_apply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    user.ensure_role(Role::Applicant)?;

    let job: Option<JobRow> =
        sqlx::query_as("SELECT * FROM jobs WHERE id = $1 AND is_approved AND is_active")
            .bind(job_id)
            .fetch_optional(&state.db)
            .await?;
    let job = job.ok_or_else(|| AppError::NotFound("Job not found or not active".to_string()))?;

    let already_applied: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM applications WHERE user_id = $1 AND job_id = $2")
            .bind(user.id)
            .bind(job_id)
            .fetch_optional(&state.db)
            .await?;
    if already_applied.is_some() {
        return Err(AppError::Conflict(
            "You have already applied to this job".to_string(),
        ));
    }

    let resume: Option<ResumeRow> = match req.resume_id {
        Some(resume_id) => Some(
            sqlx::query_as::<_, ResumeRow>(
                "SELECT * FROM resumes WHERE id = $1 AND user_id = $2",
            )
            .bind(resume_id)
            .bind(user.id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?,
        ),
        None => {
            sqlx::query_as::<_, ResumeRow>(
                "SELECT * FROM resumes WHERE user_id = $1 AND is_primary",
            )
            .bind(user.id)
            .fetch_optional(&state.db)
            .await?
        }
    };

    let matching_score = resume
        .as_ref()
        .filter(|r| !r.parsed_skills.is_empty())
        .map(|r| {
            score_candidate_against_job(
                &r.parsed_skills,
                r.parsed_text.as_deref().unwrap_or(""),
                &job.skills_required,
                &job.description,
            )
            .overall_score
        });

    let mut tx = state.db.begin().await?;

    let application: ApplicationRow = sqlx::query_as(
        r#"
        INSERT INTO applications (user_id, job_id, resume_id, cover_letter, matching_score)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(job.id)
    .bind(resume.as_ref().map(|r| r.id))
    .bind(&req.cover_letter)
    .bind(matching_score)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::from(e).conflict_on_unique("You have already applied to this job"))?;

    // Initial history row: no old status, submitted by the applicant.
    sqlx::query(
        r#"
        INSERT INTO application_status_history
            (application_id, old_status, new_status, changed_by, notes)
        VALUES ($1, NULL, 'applied', $2, 'Application submitted')
        "#,
    )
    .bind(application.id)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let recruiter: Option<(Uuid, String)> =
        sqlx::query_as("SELECT user_id, company_name FROM recruiter_profiles WHERE id = $1")
            .bind(job.recruiter_id)
            .fetch_optional(&state.db)
            .await?;

    if let Some((recruiter_user_id, _)) = recruiter {
        notify(
            &state.db,
            &state.registry,
            Notify {
                user_id: recruiter_user_id,
                kind: "new_applicant",
                title: "New Application",
                message: &format!("New application received for '{}'", job.title),
                reference_id: Some(application.id),
                reference_type: Some("application"),
            },
        )
        .await?;
    }

    let company_name = recruiter.map(|(_, name)| name);
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from_row(
            application,
            Some(job.title),
            company_name,
        )),
    ))
}

/// Application joined with job title and company name for listings.
#[derive(Debug, FromRow)]
struct ApplicationListRow {
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
    pub company_name: Option<String>,
}

impl From<ApplicationListRow> for ApplicationResponse {
    fn from(row: ApplicationListRow) -> Self {
        ApplicationResponse {
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
            company_name: row.company_name,
        }
    }
}

/// GET /api/applications
pub async fn handle_my_applications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ApplicationResponse>>, AppError> {
    let rows: Vec<ApplicationListRow> = sqlx::query_as(
        r#"
        SELECT a.id, a.user_id, a.job_id, a.resume_id, a.cover_letter, a.status,
               a.matching_score, a.applied_at, a.updated_at,
               j.title AS job_title, r.company_name
        FROM applications a
        LEFT JOIN jobs j ON j.id = a.job_id
        LEFT JOIN recruiter_profiles r ON r.id = j.recruiter_id
        WHERE a.user_id = $1
        ORDER BY a.applied_at DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Serialize)]
pub struct ApplicationTrackingResponse {
    pub application: ApplicationResponse,
    pub status_history: Vec<StatusHistoryRow>,
    pub interviews: Vec<InterviewRow>,
}

/// GET /api/applications/:id/track
///
/// Full tracking view: the application, its ordered status history, and
/// any interviews. Ownership-checked.
pub async fn handle_track_application(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ApplicationTrackingResponse>, AppError> {
    let application: Option<ApplicationListRow> = sqlx::query_as(
        r#"
        SELECT a.id, a.user_id, a.job_id, a.resume_id, a.cover_letter, a.status,
               a.matching_score, a.applied_at, a.updated_at,
               j.title AS job_title, r.company_name
        FROM applications a
        LEFT JOIN jobs j ON j.id = a.job_id
        LEFT JOIN recruiter_profiles r ON r.id = j.recruiter_id
        WHERE a.id = $1 AND a.user_id = $2
        "#,
    )
    .bind(application_id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?;
    let application =
        application.ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let status_history: Vec<StatusHistoryRow> = sqlx::query_as(
        r#"
        SELECT * FROM application_status_history
        WHERE application_id = $1
        ORDER BY changed_at ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(&state.db)
    .await?;

    let interviews: Vec<InterviewRow> = sqlx::query_as(
        "SELECT * FROM interviews WHERE application_id = $1 ORDER BY scheduled_at ASC",
    )
    .bind(application_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApplicationTrackingResponse {
        application: application.into(),
        status_history,
        interviews,
    }))
}
