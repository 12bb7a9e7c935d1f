//! Axum route handlers for the AI feature endpoints.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::matching::interview_prep::{build_prep_kit, chat_reply};
use crate::matching::recommend::{recommend_jobs, JobRecommendation, DEFAULT_LIMIT};
use crate::matching::score::{score_candidate_against_job, MatchReport};
use crate::matching::skill_gap::{analyze_skill_gap, SkillGapReport};
use crate::models::interview::PrepQuestion;
use crate::models::job::JobRow;
use crate::models::user::{ResumeRow, UserProfileRow};
use crate::state::AppState;

/// Candidate skills are the union of the profile skill list and the primary
/// resume's parsed skills (first-seen casing wins); candidate text is the
/// primary resume's parsed text.
pub async fn candidate_skills(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<(Vec<String>, String), AppError> {
    let profile: Option<UserProfileRow> =
        sqlx::query_as("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    let resume: Option<ResumeRow> =
        sqlx::query_as("SELECT * FROM resumes WHERE user_id = $1 AND is_primary")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    let mut skills: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let profile_skills = profile.map(|p| p.skills).unwrap_or_default();
    let resume_skills = resume
        .as_ref()
        .map(|r| r.parsed_skills.clone())
        .unwrap_or_default();
    for skill in profile_skills.into_iter().chain(resume_skills) {
        if seen.insert(skill.to_lowercase()) {
            skills.push(skill);
        }
    }

    let resume_text = resume.and_then(|r| r.parsed_text).unwrap_or_default();
    Ok((skills, resume_text))
}

async fn fetch_job(pool: &PgPool, job_id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

#[derive(Debug, Serialize)]
pub struct ResumeMatchResponse {
    pub job_id: Uuid,
    pub job_title: String,
    #[serde(flatten)]
    pub report: MatchReport,
}

/// GET /api/ai/resume-match/:job_id
pub async fn handle_resume_match(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ResumeMatchResponse>, AppError> {
    let job = fetch_job(&state.db, job_id).await?;
    let (skills, resume_text) = candidate_skills(&state.db, user.id).await?;

    let report = score_candidate_against_job(
        &skills,
        &resume_text,
        &job.skills_required,
        &job.description,
    );

    Ok(Json(ResumeMatchResponse {
        job_id: job.id,
        job_title: job.title,
        report,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
}

/// GET /api/ai/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<RecommendationQuery>,
) -> Result<Json<Vec<JobRecommendation>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 50);
    let (skills, _) = candidate_skills(&state.db, user.id).await?;
    let recommendations = recommend_jobs(&state.db, user.id, &skills, limit).await?;
    Ok(Json(recommendations))
}

#[derive(Debug, Serialize)]
pub struct SkillGapResponse {
    pub job_id: Uuid,
    pub job_title: String,
    #[serde(flatten)]
    pub report: SkillGapReport,
}

/// GET /api/ai/skill-gap/:job_id
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<SkillGapResponse>, AppError> {
    let job = fetch_job(&state.db, job_id).await?;
    let (skills, _) = candidate_skills(&state.db, user.id).await?;
    let report = analyze_skill_gap(&skills, &job.skills_required);

    Ok(Json(SkillGapResponse {
        job_id: job.id,
        job_title: job.title,
        report,
    }))
}

#[derive(Debug, Serialize)]
pub struct InterviewPrepResponse {
    pub job_id: Uuid,
    pub job_title: String,
    pub questions: Vec<PrepQuestion>,
    pub tips: Vec<String>,
    pub focus_areas: Vec<String>,
    pub company_research_points: Vec<String>,
}

/// GET /api/ai/interview-prep/:job_id
///
/// Builds the prep kit and persists it for the user before responding.
pub async fn handle_interview_prep(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<InterviewPrepResponse>, AppError> {
    let job = fetch_job(&state.db, job_id).await?;
    let kit = build_prep_kit(&job.title, &job.skills_required);

    sqlx::query(
        r#"
        INSERT INTO interview_preps (user_id, job_id, questions, tips, focus_areas)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user.id)
    .bind(job.id)
    .bind(sqlx::types::Json(&kit.questions))
    .bind(sqlx::types::Json(&kit.tips))
    .bind(sqlx::types::Json(&kit.focus_areas))
    .execute(&state.db)
    .await?;

    Ok(Json(InterviewPrepResponse {
        job_id: job.id,
        job_title: job.title,
        questions: kit.questions,
        tips: kit.tips,
        focus_areas: kit.focus_areas,
        company_research_points: kit.company_research_points,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /api/ai/interview-chat/:job_id
pub async fn handle_interview_chat(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    fetch_job(&state.db, job_id).await?;
    Ok(Json(json!({ "response": chat_reply(&req.message) })))
}
