//! Bearer-token authentication: HS256 JWTs embedding user id and role,
//! Argon2 password hashing, and the `CurrentUser` extractor used by every
//! authenticated handler.

pub mod handlers;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Account role. The string forms are what the `users.role` column stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Applicant,
    Recruiter,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "applicant" => Some(Role::Applicant),
            "recruiter" => Some(Role::Recruiter),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Claims carried in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub role: Role,
    pub exp: usize,
}

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    role: Role,
    ttl_hours: i64,
) -> Result<String, AppError> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = Claims {
        user_id,
        role,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {e}")))
}

/// Decodes and validates a token (signature + expiry). Returns None for
/// anything malformed, tampered with, or expired.
pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// The authenticated caller, extracted from the `Authorization: Bearer`
/// header. Confirms the account still exists and is active before the
/// handler runs, so a deactivated user cannot ride out their token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    pub fn ensure_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "This action requires the {} role",
                role.as_str()
            )))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let claims = decode_token(&state.config.jwt_secret, token)
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        let is_active: Option<(bool,)> =
            sqlx::query_as("SELECT is_active FROM users WHERE id = $1")
                .bind(claims.user_id)
                .fetch_optional(&state.db)
                .await?;

        match is_active {
            Some((true,)) => Ok(CurrentUser {
                id: claims.user_id,
                role: claims.role,
            }),
            Some((false,)) => Err(AppError::Forbidden(
                "Account is deactivated. Contact admin.".to_string(),
            )),
            None => Err(AppError::Unauthorized("Unknown account".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = issue_token("secret", user_id, Role::Recruiter, 1).unwrap();
        let claims = decode_token("secret", &token).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.role, Role::Recruiter);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = issue_token("secret-a", Uuid::new_v4(), Role::Applicant, 1).unwrap();
        assert!(decode_token("secret-b", &token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Sign a token that expired an hour ago, bypassing issue_token.
        let claims = Claims {
            user_id: Uuid::new_v4(),
            role: Role::Applicant,
            exp: (Utc::now() - Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(decode_token("secret", &token).is_none());
    }

    #[test]
    fn test_role_parse_matches_as_str() {
        for role in [Role::Applicant, Role::Recruiter, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }
}
