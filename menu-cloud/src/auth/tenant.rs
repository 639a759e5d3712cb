//! Host-based tenant resolution for the public storefront
//!
//! `X-Forwarded-Host` (first value) or `Host` → normalized domain → active
//! café. Lookups are memoized for a short TTL; every café write calls
//! [`TenantCache::invalidate_all`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::HeaderMap;
use shared::error::{AppError, ErrorCode};
use shared::models::normalize_host;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::db;
use crate::state::AppState;

/// Café resolved from the request host
#[derive(Debug, Clone, Copy)]
pub struct TenantCafe {
    pub cafe_id: i64,
}

struct CacheEntry {
    /// `None` caches a miss (unknown or inactive domain)
    cafe_id: Option<i64>,
    expires_at: Instant,
}

/// Host → café id memo shared across requests
#[derive(Clone)]
pub struct TenantCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl TenantCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// `Some(..)` on a fresh hit, `None` when the host must be looked up.
    pub async fn get(&self, host: &str) -> Option<Option<i64>> {
        let entries = self.entries.read().await;
        entries
            .get(host)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.cafe_id)
    }

    pub async fn put(&self, host: String, cafe_id: Option<i64>) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            host,
            CacheEntry {
                cafe_id,
                expires_at: now + self.ttl,
            },
        );
    }

    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }
}

/// Normalized request host, preferring the proxy's `X-Forwarded-Host`.
pub fn request_host(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get("x-forwarded-host")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get(http::header::HOST)
                .and_then(|v| v.to_str().ok())
        })?;
    normalize_host(raw)
}

/// Middleware: resolve the café for a storefront request
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let host = request_host(request.headers())
        .ok_or_else(|| AppError::with_message(ErrorCode::InvalidRequest, "Missing or invalid host"))?;

    let cafe_id = match state.tenant_cache.get(&host).await {
        Some(cached) => cached,
        None => {
            let found = db::cafes::find_active_by_domain(&state.pool, &host)
                .await
                .map_err(crate::error::internal)?;
            state.tenant_cache.put(host.clone(), found).await;
            found
        }
    };

    let Some(cafe_id) = cafe_id else {
        tracing::debug!(host = %host, "No café for host");
        return Err(AppError::new(ErrorCode::TenantNotFound).with_detail("host", host));
    };

    request.extensions_mut().insert(TenantCafe { cafe_id });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_request_host_prefers_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::HOST, HeaderValue::from_static("internal:8080"));
        assert_eq!(request_host(&headers).as_deref(), Some("internal"));

        headers.insert(
            "x-forwarded-host",
            HeaderValue::from_static("WWW.Corner.Example:443, proxy.local"),
        );
        assert_eq!(request_host(&headers).as_deref(), Some("corner.example"));
    }

    #[test]
    fn test_request_host_missing() {
        assert_eq!(request_host(&HeaderMap::new()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expiry_and_invalidation() {
        let cache = TenantCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("a.example").await, None);

        cache.put("a.example".into(), Some(7)).await;
        cache.put("b.example".into(), None).await;
        assert_eq!(cache.get("a.example").await, Some(Some(7)));
        assert_eq!(cache.get("b.example").await, Some(None));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("a.example").await, None);

        cache.put("a.example".into(), Some(7)).await;
        cache.invalidate_all().await;
        assert_eq!(cache.get("a.example").await, None);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let cache = TenantCache::new(Duration::ZERO);
        cache.put("a.example".into(), Some(1)).await;
        assert_eq!(cache.get("a.example").await, None);
    }
}
