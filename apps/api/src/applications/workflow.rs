//! Application status workflow. The enum is closed; any transition between
//! valid statuses is accepted (terminality is not structurally enforced —
//! see DESIGN.md). Every transition appends exactly one immutable history
//! row in the same transaction as the status update.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, StatusHistoryRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Rejected,
    InterviewScheduled,
    Selected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::Selected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Selected => "selected",
        }
    }

    /// Strict parse; anything outside the closed enum is rejected.
    pub fn parse(s: &str) -> Option<ApplicationStatus> {
        Self::ALL.iter().copied().find(|status| status.as_str() == s)
    }

    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Moves an application to `new_status`, recording the old->new transition
/// with the acting user and optional notes. Status update and history
/// append commit together, before any notification fires.
pub async fn change_status(
    pool: &PgPool,
    application: &ApplicationRow,
    new_status: ApplicationStatus,
    changed_by: Uuid,
    notes: Option<&str>,
) -> Result<StatusHistoryRow, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE applications SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(new_status.as_str())
        .bind(application.id)
        .execute(&mut *tx)
        .await?;

    let history: StatusHistoryRow = sqlx::query_as(
        r#"
        INSERT INTO application_status_history
            (application_id, old_status, new_status, changed_by, notes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(application.id)
    .bind(&application.status)
    .bind(new_status.as_str())
    .bind(changed_by)
    .bind(notes)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_every_status() {
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_parse_rejects_values_outside_enum() {
        assert_eq!(ApplicationStatus::parse("hired"), None);
        assert_eq!(ApplicationStatus::parse("APPLIED"), None);
        assert_eq!(ApplicationStatus::parse(""), None);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ApplicationStatus::InterviewScheduled).unwrap();
        assert_eq!(json, "\"interview_scheduled\"");
        let parsed: ApplicationStatus = serde_json::from_str("\"shortlisted\"").unwrap();
        assert_eq!(parsed, ApplicationStatus::Shortlisted);
    }

    #[test]
    fn test_valid_values_lists_all_five() {
        let listed = ApplicationStatus::valid_values();
        assert_eq!(listed.split(", ").count(), 5);
        assert!(listed.contains("interview_scheduled"));
    }
}
