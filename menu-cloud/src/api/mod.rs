//! HTTP API
//!
//! - `/health`, `/media/{hash}`: public
//! - `/api/menu`: storefront, café resolved from the host
//! - `/api/auth/login`, `/api/account/password`: credentials
//! - `/api/admin/*`: café admin, scoped to the token's café
//! - `/api/super-admin/*`: platform administration

pub mod admin;
pub mod auth;
pub mod health;
pub mod image;
pub mod public;
pub mod super_admin;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Router, middleware};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{rate_limit, tenant, token};
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes + MULTIPART_OVERHEAD);

    let login = auth::login_router().layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit::login_rate_limit,
    ));

    // Rate limit runs before authentication (outer layer)
    let account = auth::account_router()
        .layer(middleware::from_fn_with_state(state.clone(), token::require_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::password_rate_limit,
        ));

    let storefront = public::router().layer(middleware::from_fn_with_state(
        state.clone(),
        tenant::resolve_tenant,
    ));

    let admin = admin::router()
        .layer(body_limit.clone())
        .layer(middleware::from_fn_with_state(state.clone(), token::require_admin));

    let super_admin = super_admin::router()
        .layer(body_limit)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            token::require_super_admin,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/media/{hash}", get(image::get_media))
        .merge(login)
        .merge(account)
        .merge(storefront)
        .nest("/api/admin", admin)
        .nest("/api/super-admin", super_admin)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

