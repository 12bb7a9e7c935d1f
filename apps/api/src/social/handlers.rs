//! Social feed: posts, comments, likes, shares, and the follow graph.
//! Like and follow rows are unique per natural pair at the store level;
//! the toggle endpoints lean on delete-or-insert.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::social::{CommentRow, PostRow};
use crate::notifications::service::{notify, Notify};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

fn page_bounds(params: &PageQuery) -> (i64, i64) {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).clamp(1, 50);
    ((page - 1) * page_size, page_size)
}

/// Display name: profile full name, else account email.
async fn author_name(pool: &PgPool, user_id: Uuid) -> Result<String, AppError> {
    let row: Option<(Option<String>, String)> = sqlx::query_as(
        r#"
        SELECT p.full_name, u.email
        FROM users u
        LEFT JOIN user_profiles p ON p.user_id = u.id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(match row {
        Some((Some(name), _)) if !name.is_empty() => name,
        Some((_, email)) => email,
        None => "Unknown".to_string(),
    })
}

#[derive(Debug, Serialize, FromRow)]
pub struct PostResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
    pub likes_count: i64,
    pub comments_count: i64,
    pub shares_count: i64,
    pub is_liked: bool,
}

const POST_SELECT: &str = r#"
    SELECT po.id, po.user_id, po.content, po.media_url, po.created_at,
           COALESCE(NULLIF(p.full_name, ''), u.email) AS author_name,
           (SELECT COUNT(*) FROM likes l WHERE l.post_id = po.id) AS likes_count,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = po.id) AS comments_count,
           (SELECT COUNT(*) FROM shares s WHERE s.post_id = po.id) AS shares_count,
           EXISTS (SELECT 1 FROM likes l WHERE l.post_id = po.id AND l.user_id = $1) AS is_liked
    FROM posts po
    JOIN users u ON u.id = po.user_id
    LEFT JOIN user_profiles p ON p.user_id = po.user_id
"#;

#[derive(Debug, Deserialize)]
pub struct PostCreateRequest {
    pub content: String,
    pub media_url: Option<String>,
}

/// POST /api/social/posts
pub async fn handle_create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<PostCreateRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("Post content is required".to_string()));
    }

    let post: PostRow = sqlx::query_as(
        "INSERT INTO posts (user_id, content, media_url) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user.id)
    .bind(&req.content)
    .bind(&req.media_url)
    .fetch_one(&state.db)
    .await?;

    let sql = format!("{POST_SELECT} WHERE po.id = $2");
    let response: PostResponse = sqlx::query_as(&sql)
        .bind(user.id)
        .bind(post.id)
        .fetch_one(&state.db)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/social/posts
///
/// Feed: posts from followed users plus the caller's own, newest first.
pub async fn handle_feed(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PageQuery>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let (offset, limit) = page_bounds(&params);

    let sql = format!(
        r#"{POST_SELECT}
        WHERE po.user_id = $1
           OR po.user_id IN (SELECT following_id FROM follows WHERE follower_id = $1)
        ORDER BY po.created_at DESC
        OFFSET $2 LIMIT $3"#
    );
    let posts: Vec<PostResponse> = sqlx::query_as(&sql)
        .bind(user.id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(posts))
}

/// GET /api/social/posts/explore
pub async fn handle_explore(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PageQuery>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let (offset, limit) = page_bounds(&params);

    let sql = format!("{POST_SELECT} ORDER BY po.created_at DESC OFFSET $2 LIMIT $3");
    let posts: Vec<PostResponse> = sqlx::query_as(&sql)
        .bind(user.id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(posts))
}

async fn fetch_post(pool: &PgPool, post_id: Uuid) -> Result<PostRow, AppError> {
    sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct CommentCreateRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
}

/// POST /api/social/posts/:id/comment
pub async fn handle_add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<Uuid>,
    Json(req): Json<CommentCreateRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("Comment content is required".to_string()));
    }
    let post = fetch_post(&state.db, post_id).await?;

    let comment: CommentRow = sqlx::query_as(
        "INSERT INTO comments (post_id, user_id, content) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(post_id)
    .bind(user.id)
    .bind(&req.content)
    .fetch_one(&state.db)
    .await?;

    let name = author_name(&state.db, user.id).await?;
    if post.user_id != user.id {
        notify(
            &state.db,
            &state.registry,
            Notify {
                user_id: post.user_id,
                kind: "new_comment",
                title: "New Comment",
                message: &format!("{name} commented on your post"),
                reference_id: Some(post_id),
                reference_type: Some("post"),
            },
        )
        .await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: comment.created_at,
            author_name: name,
        }),
    ))
}

/// GET /api/social/posts/:id/comments
pub async fn handle_list_comments(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    #[derive(FromRow)]
    struct CommentWithAuthor {
        id: Uuid,
        post_id: Uuid,
        user_id: Uuid,
        content: String,
        created_at: DateTime<Utc>,
        author_name: String,
    }

    let comments: Vec<CommentWithAuthor> = sqlx::query_as(
        r#"
        SELECT c.id, c.post_id, c.user_id, c.content, c.created_at,
               COALESCE(NULLIF(p.full_name, ''), u.email) AS author_name
        FROM comments c
        JOIN users u ON u.id = c.user_id
        LEFT JOIN user_profiles p ON p.user_id = c.user_id
        WHERE c.post_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(
        comments
            .into_iter()
            .map(|c| CommentResponse {
                id: c.id,
                post_id: c.post_id,
                user_id: c.user_id,
                content: c.content,
                created_at: c.created_at,
                author_name: c.author_name,
            })
            .collect(),
    ))
}

/// POST /api/social/posts/:id/like
///
/// Toggle: likes once, unlikes on repeat.
pub async fn handle_toggle_like(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let post = fetch_post(&state.db, post_id).await?;

    let removed = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user.id)
        .execute(&state.db)
        .await?;
    if removed.rows_affected() > 0 {
        return Ok(Json(json!({ "message": "Post unliked", "liked": false })));
    }

    sqlx::query("INSERT INTO likes (post_id, user_id) VALUES ($1, $2)")
        .bind(post_id)
        .bind(user.id)
        .execute(&state.db)
        .await
        .map_err(|e| AppError::from(e).conflict_on_unique("Post already liked"))?;

    if post.user_id != user.id {
        let name = author_name(&state.db, user.id).await?;
        notify(
            &state.db,
            &state.registry,
            Notify {
                user_id: post.user_id,
                kind: "new_like",
                title: "New Like",
                message: &format!("{name} liked your post"),
                reference_id: Some(post_id),
                reference_type: Some("post"),
            },
        )
        .await?;
    }

    Ok(Json(json!({ "message": "Post liked", "liked": true })))
}

/// POST /api/social/posts/:id/share
pub async fn handle_share_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let post = fetch_post(&state.db, post_id).await?;

    sqlx::query("INSERT INTO shares (post_id, user_id) VALUES ($1, $2)")
        .bind(post_id)
        .bind(user.id)
        .execute(&state.db)
        .await?;

    if post.user_id != user.id {
        let name = author_name(&state.db, user.id).await?;
        notify(
            &state.db,
            &state.registry,
            Notify {
                user_id: post.user_id,
                kind: "new_share",
                title: "Post Shared",
                message: &format!("{name} shared your post"),
                reference_id: Some(post_id),
                reference_type: Some("post"),
            },
        )
        .await?;
    }

    Ok(Json(json!({ "message": "Post shared successfully" })))
}

/// POST /api/social/users/:id/follow
///
/// Toggle: follows once, unfollows on repeat. Self-follow is rejected.
pub async fn handle_toggle_follow(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(target_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if target_id == user.id {
        return Err(AppError::Validation("Cannot follow yourself".to_string()));
    }

    let target: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(target_id)
        .fetch_optional(&state.db)
        .await?;
    if target.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let removed =
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
            .bind(user.id)
            .bind(target_id)
            .execute(&state.db)
            .await?;
    if removed.rows_affected() > 0 {
        return Ok(Json(json!({ "message": "Unfollowed", "following": false })));
    }

    sqlx::query("INSERT INTO follows (follower_id, following_id) VALUES ($1, $2)")
        .bind(user.id)
        .bind(target_id)
        .execute(&state.db)
        .await
        .map_err(|e| AppError::from(e).conflict_on_unique("Already following"))?;

    let name = author_name(&state.db, user.id).await?;
    notify(
        &state.db,
        &state.registry,
        Notify {
            user_id: target_id,
            kind: "new_follower",
            title: "New Follower",
            message: &format!("{name} started following you"),
            reference_id: Some(user.id),
            reference_type: Some("user"),
        },
    )
    .await?;

    Ok(Json(json!({ "message": "Following", "following": true })))
}

#[derive(Debug, Serialize, FromRow)]
pub struct FollowEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
}

/// GET /api/social/users/:id/followers
pub async fn handle_followers(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<FollowEntry>>, AppError> {
    let followers: Vec<FollowEntry> = sqlx::query_as(
        r#"
        SELECT f.id, u.id AS user_id, p.full_name, u.email
        FROM follows f
        JOIN users u ON u.id = f.follower_id
        LEFT JOIN user_profiles p ON p.user_id = u.id
        WHERE f.following_id = $1
        ORDER BY f.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(followers))
}

/// GET /api/social/users/:id/following
pub async fn handle_following(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<FollowEntry>>, AppError> {
    let following: Vec<FollowEntry> = sqlx::query_as(
        r#"
        SELECT f.id, u.id AS user_id, p.full_name, u.email
        FROM follows f
        JOIN users u ON u.id = f.following_id
        LEFT JOIN user_profiles p ON p.user_id = u.id
        WHERE f.follower_id = $1
        ORDER BY f.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(following))
}

/// GET /api/social/users/:id/follow-stats
pub async fn handle_follow_stats(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let (followers_count, following_count, is_following): (i64, i64, bool) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM follows WHERE following_id = $1),
            (SELECT COUNT(*) FROM follows WHERE follower_id = $1),
            EXISTS (SELECT 1 FROM follows WHERE follower_id = $2 AND following_id = $1)
        "#,
    )
    .bind(user_id)
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(json!({
        "followers_count": followers_count,
        "following_count": following_count,
        "is_following": is_following,
    })))
}
