//! Admin endpoints: user and recruiter management, the job approval queue,
//! disputes, and platform analytics. Dispute filing is the one route here
//! open to any authenticated user.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::analytics::{platform_analytics, PlatformAnalytics};
use crate::auth::{CurrentUser, Role};
use crate::errors::AppError;
use crate::models::dispute::{DisputeRow, DISPUTE_STATUSES};
use crate::models::job::JobRow;
use crate::models::user::UserRow;
use crate::notifications::service::{notify, Notify};
use crate::recruiters::handlers::JobResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/admin/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<UserListQuery>,
) -> Result<Json<Vec<UserRow>>, AppError> {
    user.ensure_role(Role::Admin)?;

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).clamp(1, 100);

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM users WHERE TRUE");
    if let Some(role) = params.role.as_deref().filter(|r| !r.is_empty()) {
        qb.push(" AND role = ").push_bind(role.to_string());
    }
    if let Some(is_active) = params.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
    qb.push(" ORDER BY created_at DESC OFFSET ")
        .push_bind((page - 1) * page_size)
        .push(" LIMIT ")
        .push_bind(page_size);

    let users: Vec<UserRow> = qb.build_query_as().fetch_all(&state.db).await?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct AdminUserUpdate {
    pub is_active: Option<bool>,
    pub role: Option<String>,
}

/// PUT /api/admin/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AdminUserUpdate>,
) -> Result<Json<Value>, AppError> {
    user.ensure_role(Role::Admin)?;

    if let Some(role) = req.role.as_deref() {
        if Role::parse(role).is_none() {
            return Err(AppError::Validation(format!("Unknown role '{role}'")));
        }
    }

    let result = sqlx::query(
        r#"
        UPDATE users SET
            is_active = COALESCE($2, is_active),
            role = COALESCE($3, role),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(req.is_active)
    .bind(&req.role)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(Json(json!({
        "message": "User updated successfully",
        "user_id": user_id,
    })))
}

/// DELETE /api/admin/users/:id
///
/// Deactivation, not deletion — the account and its data stay.
pub async fn handle_deactivate_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    user.ensure_role(Role::Admin)?;

    let result = sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(Json(json!({ "message": "User deactivated successfully" })))
}

// ---------------------------------------------------------------------------
// Recruiter management
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, FromRow)]
pub struct RecruiterSummary {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
}

/// GET /api/admin/recruiters
pub async fn handle_list_recruiters(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<RecruiterSummary>>, AppError> {
    user.ensure_role(Role::Admin)?;

    let recruiters: Vec<RecruiterSummary> = sqlx::query_as(
        r#"
        SELECT u.id, u.email, u.is_active, u.created_at,
               r.company_name, r.industry
        FROM users u
        LEFT JOIN recruiter_profiles r ON r.user_id = u.id
        WHERE u.role = 'recruiter'
        ORDER BY u.created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(recruiters))
}

/// PUT /api/admin/recruiters/:id
pub async fn handle_update_recruiter(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AdminUserUpdate>,
) -> Result<Json<Value>, AppError> {
    user.ensure_role(Role::Admin)?;

    let result = sqlx::query(
        r#"
        UPDATE users SET is_active = COALESCE($2, is_active), updated_at = NOW()
        WHERE id = $1 AND role = 'recruiter'
        "#,
    )
    .bind(user_id)
    .bind(req.is_active)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Recruiter not found".to_string()));
    }
    Ok(Json(json!({ "message": "Recruiter updated successfully" })))
}

// ---------------------------------------------------------------------------
// Job approval
// ---------------------------------------------------------------------------

/// GET /api/admin/jobs/pending
pub async fn handle_pending_jobs(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<JobResponse>>, AppError> {
    user.ensure_role(Role::Admin)?;

    #[derive(FromRow)]
    struct PendingRow {
        #[sqlx(flatten)]
        job: JobRow,
        company_name: String,
    }

    let rows: Vec<PendingRow> = sqlx::query_as(
        r#"
        SELECT j.*, r.company_name
        FROM jobs j
        JOIN recruiter_profiles r ON r.id = j.recruiter_id
        WHERE NOT j.is_approved
        ORDER BY j.created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|row| JobResponse {
                job: row.job,
                company_name: row.company_name,
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct JobApprovalRequest {
    pub is_approved: bool,
    pub notes: Option<String>,
}

/// PUT /api/admin/jobs/:id/approve
pub async fn handle_approve_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(req): Json<JobApprovalRequest>,
) -> Result<Json<Value>, AppError> {
    user.ensure_role(Role::Admin)?;

    let job: Option<JobRow> = sqlx::query_as(
        "UPDATE jobs SET is_approved = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(job_id)
    .bind(req.is_approved)
    .fetch_optional(&state.db)
    .await?;
    let job = job.ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    let recruiter: Option<(Uuid,)> =
        sqlx::query_as("SELECT user_id FROM recruiter_profiles WHERE id = $1")
            .bind(job.recruiter_id)
            .fetch_optional(&state.db)
            .await?;

    if let Some((recruiter_user_id,)) = recruiter {
        let verdict = if req.is_approved { "approved" } else { "rejected" };
        let mut message = format!("Your job posting '{}' has been {verdict}.", job.title);
        if let Some(notes) = req.notes.as_deref().filter(|n| !n.is_empty()) {
            message.push_str(&format!(" Notes: {notes}"));
        }
        notify(
            &state.db,
            &state.registry,
            Notify {
                user_id: recruiter_user_id,
                kind: "job_approved",
                title: if req.is_approved {
                    "Job Approved"
                } else {
                    "Job Rejected"
                },
                message: &message,
                reference_id: Some(job.id),
                reference_type: Some("job"),
            },
        )
        .await?;
    }

    Ok(Json(json!({
        "message": format!(
            "Job {} successfully",
            if req.is_approved { "approved" } else { "rejected" }
        ),
        "job_id": job_id,
    })))
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// GET /api/admin/analytics
pub async fn handle_platform_analytics(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<PlatformAnalytics>, AppError> {
    user.ensure_role(Role::Admin)?;
    Ok(Json(platform_analytics(&state.db).await?))
}

// ---------------------------------------------------------------------------
// Disputes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DisputeCreateRequest {
    pub against_user: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
}

/// POST /api/disputes — open to any authenticated user.
pub async fn handle_file_dispute(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<DisputeCreateRequest>,
) -> Result<(StatusCode, Json<DisputeRow>), AppError> {
    if req.subject.trim().is_empty() || req.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Subject and description are required".to_string(),
        ));
    }

    let dispute: DisputeRow = sqlx::query_as(
        r#"
        INSERT INTO disputes (filed_by, against_user, job_id, subject, description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(req.against_user)
    .bind(req.job_id)
    .bind(req.subject.trim())
    .bind(&req.description)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(dispute)))
}

#[derive(Debug, Deserialize)]
pub struct DisputeListQuery {
    pub status: Option<String>,
}

/// GET /api/admin/disputes
pub async fn handle_list_disputes(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<DisputeListQuery>,
) -> Result<Json<Vec<DisputeRow>>, AppError> {
    user.ensure_role(Role::Admin)?;

    let disputes: Vec<DisputeRow> = match params.status.as_deref().filter(|s| !s.is_empty()) {
        Some(status) => {
            sqlx::query_as(
                "SELECT * FROM disputes WHERE status = $1 ORDER BY created_at DESC",
            )
            .bind(status)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM disputes ORDER BY created_at DESC")
                .fetch_all(&state.db)
                .await?
        }
    };

    Ok(Json(disputes))
}

#[derive(Debug, Deserialize)]
pub struct DisputeUpdateRequest {
    pub status: String,
    pub admin_notes: Option<String>,
    pub resolution: Option<String>,
}

/// PUT /api/admin/disputes/:id
///
/// Moving to resolved/dismissed stamps resolved_at; the filer is notified
/// of every status change.
pub async fn handle_update_dispute(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(dispute_id): Path<Uuid>,
    Json(req): Json<DisputeUpdateRequest>,
) -> Result<Json<DisputeRow>, AppError> {
    user.ensure_role(Role::Admin)?;

    if !DISPUTE_STATUSES.contains(&req.status.as_str()) {
        return Err(AppError::Validation(format!(
            "Invalid status. Must be one of: {}",
            DISPUTE_STATUSES.join(", ")
        )));
    }
    let closes = matches!(req.status.as_str(), "resolved" | "dismissed");

    let dispute: Option<DisputeRow> = sqlx::query_as(
        r#"
        UPDATE disputes SET
            status = $2,
            admin_notes = COALESCE($3, admin_notes),
            resolution = COALESCE($4, resolution),
            resolved_at = CASE WHEN $5 THEN NOW() ELSE resolved_at END
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(dispute_id)
    .bind(&req.status)
    .bind(&req.admin_notes)
    .bind(&req.resolution)
    .bind(closes)
    .fetch_optional(&state.db)
    .await?;
    let dispute = dispute.ok_or_else(|| AppError::NotFound("Dispute not found".to_string()))?;

    notify(
        &state.db,
        &state.registry,
        Notify {
            user_id: dispute.filed_by,
            kind: "dispute_update",
            title: "Dispute Updated",
            message: &format!("Your dispute '{}' status: {}", dispute.subject, dispute.status),
            reference_id: Some(dispute.id),
            reference_type: Some("dispute"),
        },
    )
    .await?;

    Ok(Json(dispute))
}
