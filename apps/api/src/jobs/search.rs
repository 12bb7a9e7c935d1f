//! Job search over open postings: free-text, location, skills, stipend
//! range, type, and remote filters; three sort modes; offset/limit
//! pagination with total counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Recency,
    Stipend,
    Views,
}

impl SortBy {
    /// Accepts the wire names; anything unknown falls back to recency.
    pub fn parse(s: &str) -> SortBy {
        match s {
            "stipend" => SortBy::Stipend,
            "views" => SortBy::Views,
            _ => SortBy::Recency,
        }
    }

    fn order_clause(&self) -> &'static str {
        match self {
            SortBy::Recency => " ORDER BY j.created_at DESC",
            SortBy::Stipend => " ORDER BY j.stipend_max DESC NULLS LAST",
            SortBy::Views => " ORDER BY j.views_count DESC",
        }
    }
}

#[derive(Debug, Default)]
pub struct JobSearchParams {
    pub query: Option<String>,
    pub location: Option<String>,
    pub skills: Option<Vec<String>>,
    pub stipend_min: Option<f64>,
    pub stipend_max: Option<f64>,
    pub job_type: Option<String>,
    pub is_remote: Option<bool>,
    pub sort_by: SortBy,
    pub page: i64,
    pub page_size: i64,
}

/// One search hit: the job plus its company name. `total_count` rides along
/// on every row via a window function.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSearchRow {
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
    pub deadline: Option<DateTime<Utc>>,
    pub views_count: i32,
    pub created_at: DateTime<Utc>,
    pub company_name: Option<String>,
    #[serde(skip)]
    pub total_count: i64,
}

#[derive(Debug, Serialize)]
pub struct JobSearchPage {
    pub jobs: Vec<JobSearchRow>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

pub async fn search_jobs(
    pool: &PgPool,
    params: JobSearchParams,
) -> Result<JobSearchPage, AppError> {
    let page = params.page.max(1);
    let page_size = params.page_size.clamp(1, MAX_PAGE_SIZE);

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        r#"
        SELECT j.id, j.recruiter_id, j.title, j.description, j.requirements,
               j.skills_required, j.location, j.is_remote, j.stipend_min,
               j.stipend_max, j.job_type, j.duration, j.openings, j.deadline,
               j.views_count, j.created_at, r.company_name,
               COUNT(*) OVER() AS total_count
        FROM jobs j
        LEFT JOIN recruiter_profiles r ON r.id = j.recruiter_id
        WHERE j.is_approved AND j.is_active
        "#,
    );

    if let Some(query) = params.query.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = format!("%{}%", query.trim());
        qb.push(" AND (j.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(location) = params.location.as_deref().filter(|l| !l.trim().is_empty()) {
        qb.push(" AND j.location ILIKE ")
            .push_bind(format!("%{}%", location.trim()));
    }

    // Any-skill match, case-insensitive against the required-skill array.
    if let Some(skills) = params.skills.as_ref().filter(|s| !s.is_empty()) {
        let lowered: Vec<String> = skills.iter().map(|s| s.trim().to_lowercase()).collect();
        qb.push(
            " AND EXISTS (SELECT 1 FROM unnest(j.skills_required) AS s WHERE lower(s) = ANY(",
        )
        .push_bind(lowered)
        .push("))");
    }

    // Range filters tolerate open-ended postings (NULL bounds pass).
    if let Some(stipend_min) = params.stipend_min {
        qb.push(" AND (j.stipend_max >= ")
            .push_bind(stipend_min)
            .push(" OR j.stipend_max IS NULL)");
    }
    if let Some(stipend_max) = params.stipend_max {
        qb.push(" AND (j.stipend_min <= ")
            .push_bind(stipend_max)
            .push(" OR j.stipend_min IS NULL)");
    }

    if let Some(job_type) = params.job_type.as_deref().filter(|t| !t.is_empty()) {
        qb.push(" AND j.job_type = ").push_bind(job_type.to_string());
    }

    if let Some(is_remote) = params.is_remote {
        qb.push(" AND j.is_remote = ").push_bind(is_remote);
    }

    qb.push(params.sort_by.order_clause());
    qb.push(" OFFSET ")
        .push_bind((page - 1) * page_size)
        .push(" LIMIT ")
        .push_bind(page_size);

    let jobs: Vec<JobSearchRow> = qb.build_query_as().fetch_all(pool).await?;
    let total_count = jobs.first().map(|j| j.total_count).unwrap_or(0);

    Ok(JobSearchPage {
        total_pages: total_pages(total_count, page_size),
        total_count,
        page,
        page_size,
        jobs,
    })
}

fn total_pages(total_count: i64, page_size: i64) -> i64 {
    (total_count + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_parse() {
        assert_eq!(SortBy::parse("stipend"), SortBy::Stipend);
        assert_eq!(SortBy::parse("views"), SortBy::Views);
        assert_eq!(SortBy::parse("created_at"), SortBy::Recency);
        assert_eq!(SortBy::parse("anything-else"), SortBy::Recency);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(41, 20), 3);
    }
}
