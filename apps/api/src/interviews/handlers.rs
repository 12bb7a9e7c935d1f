//! Interview scheduling and the meeting-room descriptor endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::applications::workflow::{change_status, ApplicationStatus};
use crate::auth::{CurrentUser, Role};
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::job::JobRow;
use crate::notifications::service::{notify, Notify};
use crate::state::AppState;

const MEETING_URL_BASE: &str = "https://meet.internlink.com/room";
const DEFAULT_DURATION_MINUTES: i32 = 30;
/// Room credentials stay valid this long past the scheduled start.
const ROOM_VALIDITY_HOURS: i64 = 2;

const INTERVIEW_STATUSES: &[&str] = &["scheduled", "in_progress", "completed", "cancelled"];

/// Interview joined with applicant name and job title for responses.
#[derive(Debug, Serialize, FromRow)]
pub struct InterviewDetail {
    pub id: Uuid,
    pub application_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub meeting_url: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub applicant_name: Option<String>,
    pub job_title: Option<String>,
}

const INTERVIEW_DETAIL_SELECT: &str = r#"
    SELECT i.id, i.application_id, i.scheduled_at, i.duration_minutes,
           i.meeting_url, i.status, i.notes, i.feedback, i.created_at,
           p.full_name AS applicant_name, j.title AS job_title
    FROM interviews i
    JOIN applications a ON a.id = i.application_id
    JOIN jobs j ON j.id = a.job_id
    LEFT JOIN user_profiles p ON p.user_id = a.user_id
"#;

async fn fetch_detail(pool: &PgPool, interview_id: Uuid) -> Result<InterviewDetail, AppError> {
    let sql = format!("{INTERVIEW_DETAIL_SELECT} WHERE i.id = $1");
    sqlx::query_as::<_, InterviewDetail>(&sql)
        .bind(interview_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Interview not found".to_string()))
}

/// The applicant on the application, the recruiter owning the job, and
/// admins may see an interview; everyone else is rejected.
async fn ensure_interview_access(
    pool: &PgPool,
    user: &CurrentUser,
    application_id: Uuid,
) -> Result<(), AppError> {
    if user.role == Role::Admin {
        return Ok(());
    }

    let access: Option<(Uuid, Uuid)> = sqlx::query_as(
        r#"
        SELECT a.user_id, r.user_id
        FROM applications a
        JOIN jobs j ON j.id = a.job_id
        JOIN recruiter_profiles r ON r.id = j.recruiter_id
        WHERE a.id = $1
        "#,
    )
    .bind(application_id)
    .fetch_optional(pool)
    .await?;

    match access {
        Some((applicant_id, recruiter_user_id))
            if applicant_id == user.id || recruiter_user_id == user.id =>
        {
            Ok(())
        }
        Some(_) => Err(AppError::Forbidden("Access denied".to_string())),
        None => Err(AppError::NotFound("Application not found".to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct InterviewScheduleRequest {
    pub application_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

/// POST /api/interviews/schedule
///
/// Creates the interview with a generated room id and access token, moves
/// the application to interview_scheduled (with its history row), and
/// notifies the applicant.
pub async fn handle_schedule(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<InterviewScheduleRequest>,
) -> Result<(StatusCode, Json<InterviewDetail>), AppError> {
    user.ensure_role(Role::Recruiter)?;

    let application: Option<ApplicationRow> =
        sqlx::query_as("SELECT * FROM applications WHERE id = $1")
            .bind(req.application_id)
            .fetch_optional(&state.db)
            .await?;
    let application =
        application.ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let job: Option<JobRow> = sqlx::query_as(
        r#"
        SELECT j.* FROM jobs j
        JOIN recruiter_profiles r ON r.id = j.recruiter_id
        WHERE j.id = $1 AND r.user_id = $2
        "#,
    )
    .bind(application.job_id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?;
    let job = job.ok_or_else(|| AppError::Forbidden("Access denied".to_string()))?;

    let room_id = new_room_id();
    let meeting_url = format!("{MEETING_URL_BASE}/{room_id}");
    let meeting_token = Uuid::new_v4().simple().to_string();

    let interview_id: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO interviews
            (application_id, scheduled_at, duration_minutes, meeting_url, meeting_token, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(application.id)
    .bind(req.scheduled_at)
    .bind(req.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES))
    .bind(&meeting_url)
    .bind(&meeting_token)
    .bind(&req.notes)
    .fetch_one(&state.db)
    .await?;

    // Same transition helper as the explicit status-change endpoint, so
    // scheduling shows up in the audit history too.
    change_status(
        &state.db,
        &application,
        ApplicationStatus::InterviewScheduled,
        user.id,
        Some("Interview scheduled"),
    )
    .await?;

    notify(
        &state.db,
        &state.registry,
        Notify {
            user_id: application.user_id,
            kind: "interview_scheduled",
            title: "Interview Scheduled",
            message: &format!(
                "Interview scheduled for '{}' on {}",
                job.title,
                req.scheduled_at.format("%Y-%m-%d %H:%M")
            ),
            reference_id: Some(interview_id.0),
            reference_type: Some("interview"),
        },
    )
    .await?;

    let detail = fetch_detail(&state.db, interview_id.0).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/interviews/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(interview_id): Path<Uuid>,
) -> Result<Json<InterviewDetail>, AppError> {
    let detail = fetch_detail(&state.db, interview_id).await?;
    ensure_interview_access(&state.db, &user, detail.application_id).await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct InterviewUpdateRequest {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub feedback: Option<String>,
}

/// PUT /api/interviews/:id
pub async fn handle_update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(interview_id): Path<Uuid>,
    Json(req): Json<InterviewUpdateRequest>,
) -> Result<Json<InterviewDetail>, AppError> {
    user.ensure_role(Role::Recruiter)?;

    if let Some(status) = req.status.as_deref() {
        if !INTERVIEW_STATUSES.contains(&status) {
            return Err(AppError::Validation(format!(
                "Invalid status. Must be one of: {}",
                INTERVIEW_STATUSES.join(", ")
            )));
        }
    }

    let detail = fetch_detail(&state.db, interview_id).await?;
    ensure_interview_access(&state.db, &user, detail.application_id).await?;

    sqlx::query(
        r#"
        UPDATE interviews SET
            scheduled_at = COALESCE($2, scheduled_at),
            duration_minutes = COALESCE($3, duration_minutes),
            status = COALESCE($4, status),
            notes = COALESCE($5, notes),
            feedback = COALESCE($6, feedback)
        WHERE id = $1
        "#,
    )
    .bind(interview_id)
    .bind(req.scheduled_at)
    .bind(req.duration_minutes)
    .bind(&req.status)
    .bind(&req.notes)
    .bind(&req.feedback)
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_detail(&state.db, interview_id).await?))
}

#[derive(Debug, Serialize)]
pub struct VideoRoomResponse {
    pub room_id: String,
    pub meeting_url: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// POST /api/interviews/:id/room
///
/// Returns the meeting-room descriptor for an interview, minting room
/// credentials if the row predates them.
pub async fn handle_room(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(interview_id): Path<Uuid>,
) -> Result<Json<VideoRoomResponse>, AppError> {
    let interview: Option<(Uuid, DateTime<Utc>, Option<String>, Option<String>)> =
        sqlx::query_as(
            "SELECT application_id, scheduled_at, meeting_url, meeting_token FROM interviews WHERE id = $1",
        )
        .bind(interview_id)
        .fetch_optional(&state.db)
        .await?;
    let (application_id, scheduled_at, meeting_url, meeting_token) =
        interview.ok_or_else(|| AppError::NotFound("Interview not found".to_string()))?;

    ensure_interview_access(&state.db, &user, application_id).await?;

    let token = meeting_token.unwrap_or_else(|| Uuid::new_v4().simple().to_string());
    let room_id = token.chars().take(12).collect::<String>();
    let meeting_url =
        meeting_url.unwrap_or_else(|| format!("{MEETING_URL_BASE}/{room_id}"));

    Ok(Json(VideoRoomResponse {
        room_id,
        meeting_url,
        token,
        expires_at: scheduled_at + Duration::hours(ROOM_VALIDITY_HOURS),
    }))
}

/// GET /api/interviews/upcoming/list
///
/// Upcoming scheduled interviews for the caller — the recruiter sees their
/// jobs' interviews, an applicant their own.
pub async fn handle_upcoming(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<InterviewDetail>>, AppError> {
    let rows: Vec<InterviewDetail> = if user.role == Role::Recruiter {
        let sql = format!(
            r#"{INTERVIEW_DETAIL_SELECT}
            JOIN recruiter_profiles r ON r.id = j.recruiter_id
            WHERE r.user_id = $1 AND i.scheduled_at >= NOW() AND i.status = 'scheduled'
            ORDER BY i.scheduled_at ASC"#
        );
        sqlx::query_as(&sql).bind(user.id).fetch_all(&state.db).await?
    } else {
        let sql = format!(
            r#"{INTERVIEW_DETAIL_SELECT}
            WHERE a.user_id = $1 AND i.scheduled_at >= NOW() AND i.status = 'scheduled'
            ORDER BY i.scheduled_at ASC"#
        );
        sqlx::query_as(&sql).bind(user.id).fetch_all(&state.db).await?
    };

    Ok(Json(rows))
}

fn new_room_id() -> String {
    Uuid::new_v4().simple().to_string().chars().take(12).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_is_twelve_hex_chars() {
        let room = new_room_id();
        assert_eq!(room.len(), 12);
        assert!(room.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_room_ids_are_unique() {
        assert_ne!(new_room_id(), new_room_id());
    }

    #[test]
    fn test_interview_status_list() {
        assert!(INTERVIEW_STATUSES.contains(&"scheduled"));
        assert!(INTERVIEW_STATUSES.contains(&"cancelled"));
        assert!(!INTERVIEW_STATUSES.contains(&"done"));
    }
}
