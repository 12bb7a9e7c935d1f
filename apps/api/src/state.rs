use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::notifications::registry::ConnectionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Live notification channel registry. Process-wide, keyed by user id;
    /// the persisted notification row stays authoritative regardless of
    /// what happens on these connections.
    pub registry: Arc<ConnectionRegistry>,
}
