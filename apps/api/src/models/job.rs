use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job/internship posting. Visible to applicants only when both
/// `is_approved` (admin-gated) and `is_active` (recruiter-gated) are true.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub skills_required: Vec<String>,
    pub location: Option<String>,
    pub is_remote: bool,
    pub stipend_min: Option<f64>,
    pub stipend_max: Option<f64>,
    pub job_type: String,
    pub duration: Option<String>,
    pub openings: i32,
    pub is_approved: bool,
    pub is_active: bool,
    pub deadline: Option<DateTime<Utc>>,
    pub views_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecruiterProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub company_description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub company_logo: Option<String>,
    pub headquarters: Option<String>,
}
