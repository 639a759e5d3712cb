//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for admin / super admin tokens
    pub jwt_secret: String,
    /// Token lifetime
    pub jwt_expiry_hours: i64,
    /// Directory holding uploaded images (`{hash}.jpg`)
    pub media_dir: String,
    /// Prefix for image URLs handed to clients (empty = same origin)
    pub public_base_url: String,
    /// Upload size cap in bytes
    pub max_upload_bytes: usize,
    /// Seeded super admin credentials (only used while no super admin exists)
    pub superadmin_email: Option<String>,
    pub superadmin_password: Option<String>,
    /// Host → café lookup memo lifetime
    pub tenant_cache_ttl_secs: u64,
    /// How often unreferenced image files are swept
    pub orphan_sweep_interval_secs: u64,
    /// Unreferenced files younger than this are kept
    pub orphan_grace_secs: u64,
    /// Key the rate limiter on X-Forwarded-For (only behind a reverse proxy)
    pub trust_forwarded_for: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn optional(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|s| !s.trim().is_empty())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::parsed("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiry_hours: Self::parsed("JWT_EXPIRY_HOURS", 24),
            media_dir: std::env::var("MEDIA_DIR").unwrap_or_else(|_| "media".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            max_upload_bytes: Self::parsed("MAX_UPLOAD_BYTES", 5 * 1024 * 1024),
            superadmin_email: Self::optional("SUPERADMIN_EMAIL"),
            superadmin_password: Self::optional("SUPERADMIN_PASSWORD"),
            tenant_cache_ttl_secs: Self::parsed("TENANT_CACHE_TTL_SECS", 60),
            orphan_sweep_interval_secs: Self::parsed("ORPHAN_SWEEP_INTERVAL_SECS", 3600),
            orphan_grace_secs: Self::parsed("ORPHAN_GRACE_SECS", 3600),
            trust_forwarded_for: Self::parsed("TRUST_FORWARDED_FOR", false),
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_dev_fallback() {
        let val = Config::require_secret("MENU_CLOUD_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(val, "dev-MENU_CLOUD_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn test_require_secret_production_missing() {
        let err = Config::require_secret("MENU_CLOUD_TEST_UNSET_SECRET", "production").unwrap_err();
        assert!(err.to_string().contains("must be set in production"));
    }

    #[test]
    fn test_parsed_falls_back_on_garbage() {
        assert_eq!(Config::parsed("MENU_CLOUD_TEST_UNSET_PORT", 8080u16), 8080);
    }
}
