use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::notification::NotificationRow;
use crate::notifications::service::{mark_all_as_read, mark_as_read, unread_count};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    pub is_read: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/notifications
pub async fn handle_list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<NotificationListQuery>,
) -> Result<Json<Vec<NotificationRow>>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).clamp(1, 50);
    let offset = (page - 1) * page_size;

    let rows: Vec<NotificationRow> = match params.is_read {
        Some(is_read) => {
            sqlx::query_as(
                r#"
                SELECT * FROM notifications
                WHERE user_id = $1 AND is_read = $2
                ORDER BY created_at DESC
                OFFSET $3 LIMIT $4
                "#,
            )
            .bind(user.id)
            .bind(is_read)
            .bind(offset)
            .bind(page_size)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT * FROM notifications
                WHERE user_id = $1
                ORDER BY created_at DESC
                OFFSET $2 LIMIT $3
                "#,
            )
            .bind(user.id)
            .bind(offset)
            .bind(page_size)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(rows))
}

/// GET /api/notifications/unread-count
pub async fn handle_unread_count(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Value>, AppError> {
    let count = unread_count(&state.db, user.id).await?;
    Ok(Json(json!({ "unread_count": count })))
}

/// PUT /api/notifications/:id/read
pub async fn handle_mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !mark_as_read(&state.db, notification_id, user.id).await? {
        return Err(AppError::NotFound(format!(
            "Notification {notification_id} not found"
        )));
    }
    Ok(Json(json!({ "message": "Marked as read" })))
}

/// PUT /api/notifications/read-all
pub async fn handle_mark_all_read(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Value>, AppError> {
    let count = mark_all_as_read(&state.db, user.id).await?;
    Ok(Json(json!({
        "message": format!("Marked {count} notifications as read"),
        "marked_count": count,
    })))
}
