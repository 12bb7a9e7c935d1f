use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{hash_password, issue_token, verify_password, Role};
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

/// Hard cap on admin accounts; registration beyond this is rejected.
const MAX_ADMIN_ACCOUNTS: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: Uuid,
    pub role: Role,
}

/// POST /api/auth/register
///
/// Registers a new account, side-creating an empty profile (and a default
/// recruiter profile for recruiters), and returns a bearer token.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let role = Role::parse(&req.role).ok_or_else(|| {
        AppError::Validation("Role must be 'applicant', 'recruiter', or 'admin'".to_string())
    })?;

    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if role == Role::Admin {
        let (admin_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .fetch_one(&state.db)
                .await?;
        if admin_count >= MAX_ADMIN_ACCOUNTS {
            return Err(AppError::Validation(format!(
                "Maximum limit of {MAX_ADMIN_ACCOUNTS} admin accounts reached"
            )));
        }
    }

    let password_hash = hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;

    let user: UserRow = sqlx::query_as(
        "INSERT INTO users (email, password_hash, role) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(req.email.trim().to_lowercase())
    .bind(&password_hash)
    .bind(role.as_str())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::from(e).conflict_on_unique("Email already registered"))?;

    sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1)")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    if role == Role::Recruiter {
        sqlx::query("INSERT INTO recruiter_profiles (user_id, company_name) VALUES ($1, $2)")
            .bind(user.id)
            .bind("My Company") // default, to be updated
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let token = issue_token(
        &state.config.jwt_secret,
        user.id,
        role,
        state.config.token_ttl_hours,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            user_id: user.id,
            role,
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(req.email.trim().to_lowercase())
        .fetch_optional(&state.db)
        .await?;

    let user = match user {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        _ => return Err(AppError::Unauthorized("Invalid email or password".to_string())),
    };

    if !user.is_active {
        return Err(AppError::Forbidden(
            "Account is deactivated. Contact admin.".to_string(),
        ));
    }

    let role = Role::parse(&user.role)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Corrupt role on user {}", user.id)))?;

    let token = issue_token(
        &state.config.jwt_secret,
        user.id,
        role,
        state.config.token_ttl_hours,
    )?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user_id: user.id,
        role,
    }))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; logout is a client-side token drop.
pub async fn handle_logout() -> Json<Value> {
    Json(json!({
        "message": "Logged out successfully. Please remove the token from the client."
    }))
}
