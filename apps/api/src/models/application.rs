use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One user's application to one job. The (user_id, job_id) pair is unique
/// at the store level.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub cover_letter: Option<String>,
    pub status: String,
    pub matching_score: Option<f64>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit entry for a status transition. Never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatusHistoryRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub old_status: Option<String>,
    pub new_status: String,
    pub changed_by: Uuid,
    pub notes: Option<String>,
    pub changed_at: DateTime<Utc>,
}
