//! Personalized job recommendations: skills-only overlap ranking over all
//! open jobs the candidate has not applied to. Read-only; ranking compares
//! skills, not description text (direct match scoring does both — see
//! DESIGN.md for why this asymmetry is intentional).

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::title_case;

pub const DEFAULT_LIMIT: usize = 10;

const PROFILE_FALLBACK_REASON: &str =
    "New job posting - complete your profile skills for better matches";

/// An open (approved + active) job joined with its company name, the unit
/// the ranker scores.
#[derive(Debug, Clone, FromRow)]
pub struct OpenJobRow {
    pub id: Uuid,
    pub title: String,
    pub location: Option<String>,
    pub stipend_min: Option<f64>,
    pub stipend_max: Option<f64>,
    pub skills_required: Vec<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecommendation {
    pub job_id: Uuid,
    pub title: String,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub stipend_min: Option<f64>,
    pub stipend_max: Option<f64>,
    pub match_score: f64,
    pub matched_skills: Vec<String>,
    pub reason: String,
}

/// Returns up to `limit` recommendations for a candidate.
///
/// With no skills this is a fallback, not a ranking: the newest open jobs,
/// each tagged score 0 with a complete-your-profile reason. Otherwise open
/// jobs the user has not applied to are scored on skill overlap alone;
/// unscorable (no required skills) and zero-scoring jobs are dropped.
pub async fn recommend_jobs(
    pool: &PgPool,
    user_id: Uuid,
    candidate_skills: &[String],
    limit: usize,
) -> Result<Vec<JobRecommendation>, AppError> {
    if candidate_skills.is_empty() {
        let recent = fetch_recent_open_jobs(pool, limit).await?;
        return Ok(recent
            .into_iter()
            .map(|job| JobRecommendation {
                job_id: job.id,
                title: job.title,
                company_name: job.company_name,
                location: job.location,
                stipend_min: job.stipend_min,
                stipend_max: job.stipend_max,
                match_score: 0.0,
                matched_skills: vec![],
                reason: PROFILE_FALLBACK_REASON.to_string(),
            })
            .collect());
    }

    let jobs = fetch_open_jobs_excluding_applied(pool, user_id).await?;
    Ok(rank_open_jobs(candidate_skills, jobs, limit))
}

/// Pure ranking core, split out from the queries for testability.
pub fn rank_open_jobs(
    candidate_skills: &[String],
    jobs: Vec<OpenJobRow>,
    limit: usize,
) -> Vec<JobRecommendation> {
    let candidate: HashSet<String> = candidate_skills.iter().map(|s| s.to_lowercase()).collect();

    let mut scored: Vec<JobRecommendation> = jobs
        .into_iter()
        .filter_map(|job| {
            let (score, matched) = skill_overlap(&candidate, &job.skills_required)?;
            if score == 0.0 {
                return None;
            }
            let reason = matched_reason(&matched);
            Some(JobRecommendation {
                job_id: job.id,
                title: job.title,
                company_name: job.company_name,
                location: job.location,
                stipend_min: job.stipend_min,
                stipend_max: job.stipend_max,
                match_score: score,
                matched_skills: matched,
                reason,
            })
        })
        .collect();

    // Stable sort: ties keep encounter order.
    scored.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}

/// Skills-only overlap percentage. None when the job has no required
/// skills — such jobs cannot be scored and are excluded entirely.
fn skill_overlap(
    candidate: &HashSet<String>,
    job_skills: &[String],
) -> Option<(f64, Vec<String>)> {
    let job_set: BTreeSet<String> = job_skills.iter().map(|s| s.to_lowercase()).collect();
    if job_set.is_empty() {
        return None;
    }

    let matched: Vec<String> = job_set
        .iter()
        .filter(|s| candidate.contains(*s))
        .map(|s| title_case(s))
        .collect();

    let score = matched.len() as f64 / job_set.len() as f64 * 100.0;
    Some(((score * 10.0).round() / 10.0, matched))
}

fn matched_reason(matched: &[String]) -> String {
    let preview: Vec<&str> = matched.iter().take(3).map(String::as_str).collect();
    format!(
        "Matches {} of your skills: {}",
        matched.len(),
        preview.join(", ")
    )
}

async fn fetch_recent_open_jobs(pool: &PgPool, limit: usize) -> Result<Vec<OpenJobRow>, AppError> {
    Ok(sqlx::query_as::<_, OpenJobRow>(
        r#"
        SELECT j.id, j.title, j.location, j.stipend_min, j.stipend_max,
               j.skills_required, r.company_name
        FROM jobs j
        LEFT JOIN recruiter_profiles r ON r.id = j.recruiter_id
        WHERE j.is_approved AND j.is_active
        ORDER BY j.created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await?)
}

async fn fetch_open_jobs_excluding_applied(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<OpenJobRow>, AppError> {
    Ok(sqlx::query_as::<_, OpenJobRow>(
        r#"
        SELECT j.id, j.title, j.location, j.stipend_min, j.stipend_max,
               j.skills_required, r.company_name
        FROM jobs j
        LEFT JOIN recruiter_profiles r ON r.id = j.recruiter_id
        WHERE j.is_approved AND j.is_active
          AND NOT EXISTS (
              SELECT 1 FROM applications a
              WHERE a.job_id = j.id AND a.user_id = $1
          )
        ORDER BY j.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, skills: &[&str]) -> OpenJobRow {
        OpenJobRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            location: None,
            stipend_min: None,
            stipend_max: None,
            skills_required: skills.iter().map(|s| s.to_string()).collect(),
            company_name: Some("Globex".to_string()),
        }
    }

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ranked_descending_by_overlap() {
        let jobs = vec![
            job("half", &["python", "sql"]),
            job("full", &["python"]),
        ];
        let ranked = rank_open_jobs(&skills(&["Python"]), jobs, 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].title, "full");
        assert_eq!(ranked[0].match_score, 100.0);
        assert_eq!(ranked[1].title, "half");
        assert_eq!(ranked[1].match_score, 50.0);
    }

    #[test]
    fn test_jobs_without_required_skills_excluded() {
        let jobs = vec![job("unscorable", &[]), job("scorable", &["python"])];
        let ranked = rank_open_jobs(&skills(&["python"]), jobs, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "scorable");
    }

    #[test]
    fn test_zero_scoring_jobs_excluded() {
        let jobs = vec![job("miss", &["golang", "scala"])];
        assert!(rank_open_jobs(&skills(&["python"]), jobs, 10).is_empty());
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let jobs = vec![
            job("first", &["python"]),
            job("second", &["python"]),
            job("third", &["python"]),
        ];
        let ranked = rank_open_jobs(&skills(&["python"]), jobs, 10);
        let titles: Vec<&str> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_truncated_to_limit() {
        let jobs = (0..5).map(|i| job(&format!("job{i}"), &["python"])).collect();
        assert_eq!(rank_open_jobs(&skills(&["python"]), jobs, 3).len(), 3);
    }

    #[test]
    fn test_reason_lists_up_to_three_matches() {
        let jobs = vec![job("big", &["python", "sql", "docker", "react"])];
        let ranked = rank_open_jobs(
            &skills(&["python", "sql", "docker", "react"]),
            jobs,
            10,
        );
        assert_eq!(
            ranked[0].reason,
            "Matches 4 of your skills: Docker, Python, React"
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let jobs = vec![job("job", &["PYTHON"])];
        let ranked = rank_open_jobs(&skills(&["python"]), jobs, 10);
        assert_eq!(ranked[0].match_score, 100.0);
        assert_eq!(ranked[0].matched_skills, vec!["Python"]);
    }
}
