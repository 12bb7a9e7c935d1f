#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub meeting_url: Option<String>,
    pub meeting_token: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A canned interview-prep question with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepQuestion {
    pub question: String,
    pub category: String,
    pub difficulty: String,
    pub sample_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewPrepRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub questions: Json<Vec<PrepQuestion>>,
    pub tips: Json<Vec<String>>,
    pub focus_areas: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}
