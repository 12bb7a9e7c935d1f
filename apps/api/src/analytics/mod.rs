//! Dashboard analytics: per-recruiter rollups and platform-wide totals.
//! Read-only aggregation queries; month windows are computed in SQL via
//! date_trunc so the database clock is authoritative.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::title_case;

#[derive(Debug, Serialize)]
pub struct JobAnalytics {
    pub job_id: Uuid,
    pub title: String,
    pub applications: i64,
    pub views: i32,
    pub conversion_rate: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RecruiterAnalytics {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_applications: i64,
    pub total_views: i64,
    pub avg_applications_per_job: f64,
    pub status_breakdown: BTreeMap<String, i64>,
    pub jobs_analytics: Vec<JobAnalytics>,
}

pub async fn recruiter_analytics(
    pool: &PgPool,
    recruiter_id: Uuid,
) -> Result<RecruiterAnalytics, AppError> {
    #[derive(sqlx::FromRow)]
    struct JobStatRow {
        id: Uuid,
        title: String,
        views_count: i32,
        is_active: bool,
        created_at: DateTime<Utc>,
        applications: i64,
    }

    let jobs: Vec<JobStatRow> = sqlx::query_as(
        r#"
        SELECT j.id, j.title, j.views_count, j.is_active, j.created_at,
               COUNT(a.id) AS applications
        FROM jobs j
        LEFT JOIN applications a ON a.job_id = j.id
        WHERE j.recruiter_id = $1
        GROUP BY j.id
        ORDER BY j.created_at DESC
        "#,
    )
    .bind(recruiter_id)
    .fetch_all(pool)
    .await?;

    if jobs.is_empty() {
        return Ok(RecruiterAnalytics {
            total_jobs: 0,
            active_jobs: 0,
            total_applications: 0,
            total_views: 0,
            avg_applications_per_job: 0.0,
            status_breakdown: BTreeMap::new(),
            jobs_analytics: vec![],
        });
    }

    let status_breakdown: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT a.status, COUNT(*) FROM applications a
        JOIN jobs j ON j.id = a.job_id
        WHERE j.recruiter_id = $1
        GROUP BY a.status
        "#,
    )
    .bind(recruiter_id)
    .fetch_all(pool)
    .await?;

    let total_jobs = jobs.len() as i64;
    let active_jobs = jobs.iter().filter(|j| j.is_active).count() as i64;
    let total_applications: i64 = jobs.iter().map(|j| j.applications).sum();
    let total_views: i64 = jobs.iter().map(|j| j.views_count as i64).sum();

    let jobs_analytics = jobs
        .into_iter()
        .map(|job| JobAnalytics {
            conversion_rate: conversion_rate(job.applications, job.views_count as i64),
            job_id: job.id,
            title: job.title,
            applications: job.applications,
            views: job.views_count,
            is_active: job.is_active,
            created_at: job.created_at,
        })
        .collect();

    Ok(RecruiterAnalytics {
        total_jobs,
        active_jobs,
        total_applications,
        total_views,
        avg_applications_per_job: round1(total_applications as f64 / total_jobs as f64),
        status_breakdown: status_breakdown.into_iter().collect(),
        jobs_analytics,
    })
}

#[derive(Debug, Serialize)]
pub struct TopSkill {
    pub skill: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct PlatformAnalytics {
    pub total_users: i64,
    pub total_recruiters: i64,
    pub total_jobs: i64,
    pub total_applications: i64,
    pub active_jobs: i64,
    pub pending_approvals: i64,
    pub total_disputes: i64,
    pub open_disputes: i64,
    pub users_this_month: i64,
    pub jobs_this_month: i64,
    pub applications_this_month: i64,
    pub top_skills: Vec<TopSkill>,
    pub application_status_breakdown: BTreeMap<String, i64>,
}

pub async fn platform_analytics(pool: &PgPool) -> Result<PlatformAnalytics, AppError> {
    let (
        total_users,
        total_recruiters,
        total_jobs,
        total_applications,
        active_jobs,
        pending_approvals,
        total_disputes,
        open_disputes,
    ): (i64, i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users WHERE role = 'applicant'),
            (SELECT COUNT(*) FROM users WHERE role = 'recruiter'),
            (SELECT COUNT(*) FROM jobs),
            (SELECT COUNT(*) FROM applications),
            (SELECT COUNT(*) FROM jobs WHERE is_approved AND is_active),
            (SELECT COUNT(*) FROM jobs WHERE NOT is_approved),
            (SELECT COUNT(*) FROM disputes),
            (SELECT COUNT(*) FROM disputes WHERE status IN ('open', 'under_review'))
        "#,
    )
    .fetch_one(pool)
    .await?;

    let (users_this_month, jobs_this_month, applications_this_month): (i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users
                 WHERE role = 'applicant' AND created_at >= date_trunc('month', NOW())),
                (SELECT COUNT(*) FROM jobs
                 WHERE created_at >= date_trunc('month', NOW())),
                (SELECT COUNT(*) FROM applications
                 WHERE applied_at >= date_trunc('month', NOW()))
            "#,
        )
        .fetch_one(pool)
        .await?;

    let skill_lists: Vec<(Vec<String>,)> =
        sqlx::query_as("SELECT skills_required FROM jobs WHERE is_approved")
            .fetch_all(pool)
            .await?;
    let skill_lists: Vec<Vec<String>> = skill_lists.into_iter().map(|(s,)| s).collect();

    let status_breakdown: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM applications GROUP BY status")
            .fetch_all(pool)
            .await?;

    Ok(PlatformAnalytics {
        total_users,
        total_recruiters,
        total_jobs,
        total_applications,
        active_jobs,
        pending_approvals,
        total_disputes,
        open_disputes,
        users_this_month,
        jobs_this_month,
        applications_this_month,
        top_skills: top_skills(&skill_lists, 10),
        application_status_breakdown: status_breakdown.into_iter().collect(),
    })
}

/// Most-demanded skills across approved postings, case-folded, ties broken
/// alphabetically for stable output.
pub fn top_skills(job_skill_lists: &[Vec<String>], limit: usize) -> Vec<TopSkill> {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for list in job_skill_lists {
        for skill in list {
            *counts.entry(skill.to_lowercase()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, i64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(skill, count)| TopSkill {
            skill: title_case(&skill),
            count,
        })
        .collect()
}

fn conversion_rate(applications: i64, views: i64) -> f64 {
    if views > 0 {
        round1(applications as f64 / views as f64 * 100.0)
    } else {
        0.0
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_top_skills_counts_case_folded() {
        let lists = vec![
            skills(&["Python", "SQL"]),
            skills(&["python", "Docker"]),
            skills(&["PYTHON"]),
        ];
        let top = top_skills(&lists, 10);
        assert_eq!(top[0].skill, "Python");
        assert_eq!(top[0].count, 3);
    }

    #[test]
    fn test_top_skills_truncates_and_orders() {
        let lists = vec![
            skills(&["a", "b", "c"]),
            skills(&["a", "b"]),
            skills(&["a"]),
        ];
        let top = top_skills(&lists, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].skill, "A");
        assert_eq!(top[1].skill, "B");
    }

    #[test]
    fn test_top_skills_ties_break_alphabetically() {
        let lists = vec![skills(&["zig", "ada"])];
        let top = top_skills(&lists, 10);
        assert_eq!(top[0].skill, "Ada");
        assert_eq!(top[1].skill, "Zig");
    }

    #[test]
    fn test_conversion_rate_guards_zero_views() {
        assert_eq!(conversion_rate(5, 0), 0.0);
        assert_eq!(conversion_rate(5, 100), 5.0);
        assert_eq!(conversion_rate(1, 3), 33.3);
    }
}
