//! Application state

use std::time::Duration;

use sqlx::PgPool;

use crate::auth::{RateLimiter, TenantCache};
use crate::config::Config;
use crate::error::BoxError;
use crate::media::ImageStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT secret for admin / super admin tokens
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    /// Content-addressed image files
    pub images: ImageStore,
    /// Host → café memo for the storefront
    pub tenant_cache: TenantCache,
    /// Rate limiter for credential routes
    pub rate_limiter: RateLimiter,
    pub max_upload_bytes: usize,
    /// Prefix for image URLs (empty = same origin)
    pub public_base_url: String,
    pub trust_forwarded_for: bool,
}

impl AppState {
    /// Connect, migrate, seed the super admin if configured.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        if let (Some(email), Some(password)) = (&config.superadmin_email, &config.superadmin_password)
        {
            bootstrap_super_admin(&pool, email, password).await?;
        }

        Self::with_pool(pool, config)
    }

    /// Build state around an existing pool (no migrations, no seeding)
    pub fn with_pool(pool: PgPool, config: &Config) -> Result<Self, BoxError> {
        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiry_hours: config.jwt_expiry_hours,
            images: ImageStore::new(&config.media_dir)?,
            tenant_cache: TenantCache::new(Duration::from_secs(config.tenant_cache_ttl_secs)),
            rate_limiter: RateLimiter::new(),
            max_upload_bytes: config.max_upload_bytes,
            public_base_url: config.public_base_url.clone(),
            trust_forwarded_for: config.trust_forwarded_for,
        })
    }

    /// Client URL of a stored image
    pub fn image_url(&self, hash: &str) -> String {
        format!("{}/media/{hash}", self.public_base_url)
    }
}

async fn bootstrap_super_admin(pool: &PgPool, email: &str, password: &str) -> Result<(), BoxError> {
    let email = shared::models::validate::email(email).map_err(|e| e.message)?;
    shared::models::validate::password(password).map_err(|e| e.message)?;
    let hash = crate::util::hash_password(password).map_err(|e| e.to_string())?;

    let created = crate::db::super_admins::ensure_bootstrap(pool, &email, &hash)
        .await
        .map_err(|e| match e {
            crate::error::ServiceError::Db(e) => e,
            crate::error::ServiceError::App(e) => e.message.into(),
        })?;
    if created {
        tracing::info!(email = %email, "Super admin created from SUPERADMIN_EMAIL");
    }
    Ok(())
}
