use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Free-form complaint record. Status: open, under_review, resolved, dismissed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DisputeRow {
    pub id: Uuid,
    pub filed_by: Uuid,
    pub against_user: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub admin_notes: Option<String>,
    pub resolution: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

pub const DISPUTE_STATUSES: &[&str] = &["open", "under_review", "resolved", "dismissed"];
