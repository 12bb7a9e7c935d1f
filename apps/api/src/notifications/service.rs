//! Notification creation and read-state operations.
//!
//! `notify` always persists the row first — that write is the source of
//! truth and participates in the caller's error handling. The live push
//! happens afterwards on a detached task and can never fail the operation.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::notification::NotificationRow;
use crate::notifications::registry::ConnectionRegistry;

/// Parameters for creating one notification.
pub struct Notify<'a> {
    pub user_id: Uuid,
    pub kind: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<&'a str>,
}

/// Persists a notification, then pushes it to any live connections of the
/// recipient from a spawned task (fire-and-forget).
pub async fn notify(
    pool: &PgPool,
    registry: &Arc<ConnectionRegistry>,
    params: Notify<'_>,
) -> Result<NotificationRow, AppError> {
    let row: NotificationRow = sqlx::query_as(
        r#"
        INSERT INTO notifications (user_id, kind, title, message, reference_id, reference_type)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(params.user_id)
    .bind(params.kind)
    .bind(params.title)
    .bind(params.message)
    .bind(params.reference_id)
    .bind(params.reference_type)
    .fetch_one(pool)
    .await?;

    let payload = push_payload(&row);
    let registry = Arc::clone(registry);
    let user_id = row.user_id;
    tokio::spawn(async move {
        let delivered = registry.push_to(user_id, &payload).await;
        tracing::debug!("Pushed notification to {delivered} live connection(s) of {user_id}");
    });

    Ok(row)
}

/// JSON payload sent over the live channel. Identical to the REST shape of
/// a notification row.
pub fn push_payload(row: &NotificationRow) -> String {
    serde_json::to_string(row).unwrap_or_default()
}

pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Marks one notification read, ownership-checked. Returns false when the
/// row does not exist or belongs to someone else. Idempotent.
pub async fn mark_as_read(
    pool: &PgPool,
    notification_id: Uuid,
    user_id: Uuid,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2",
    )
    .bind(notification_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Marks every unread notification of a user read; returns how many flipped.
pub async fn mark_all_as_read(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_push_payload_shape() {
        let row = NotificationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: "application_update".to_string(),
            title: "Application Status Updated".to_string(),
            message: "Your application moved forward".to_string(),
            is_read: false,
            reference_id: None,
            reference_type: Some("application".to_string()),
            created_at: Utc::now(),
        };

        let payload = push_payload(&row);
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        // The kind column serializes under the wire name "type".
        assert_eq!(value["type"], "application_update");
        assert_eq!(value["title"], "Application Status Updated");
        assert_eq!(value["is_read"], false);
        assert!(value.get("kind").is_none());
    }
}
