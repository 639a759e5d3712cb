//! Authentication endpoints: login, password change

use axum::routing::{post, put};
use axum::{Extension, Json, Router, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{CLAIM_CAFE_ID, CLAIM_ROLE, EntityStatus, PasswordChange, Role, validate};

use super::ApiResult;
use crate::auth::Identity;
use crate::db;
use crate::error::internal;
use crate::state::AppState;
use crate::util::{hash_password, verify_dummy_password, verify_password};

pub fn login_router() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

pub fn account_router() -> Router<AppState> {
    Router::new().route("/api/account/password", put(change_password))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cafe_id: Option<i64>,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::field("email", "Email is required"));
    }
    if req.password.is_empty() {
        return Err(AppError::field("password", "Password is required"));
    }

    let Some(user) = db::users::find_by_email(&state.pool, &email)
        .await
        .map_err(internal)?
    else {
        verify_dummy_password(&req.password);
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(&req.password, &user.password_hash) {
        return Err(AppError::invalid_credentials());
    }
    if !user.is_enabled {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let claims = db::users::claims(&state.pool, user.id)
        .await
        .map_err(internal)?;
    let claim = |name: &str| {
        claims
            .iter()
            .find(|(claim_type, _)| claim_type == name)
            .map(|(_, value)| value.as_str())
    };

    let role = claim(CLAIM_ROLE)
        .and_then(Role::from_db)
        .ok_or_else(|| AppError::forbidden("Account has no role"))?;

    let cafe_id = match role {
        Role::Admin => {
            let cafe_id: i64 = claim(CLAIM_CAFE_ID)
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| AppError::forbidden("Admin is not assigned to a café"))?;
            let admin = db::admins::find_by_user(&state.pool, user.id)
                .await
                .map_err(internal)?
                .ok_or_else(|| AppError::new(ErrorCode::AccountDisabled))?;
            if admin.status != EntityStatus::Active {
                return Err(AppError::new(ErrorCode::AccountDisabled));
            }
            let cafe_status = db::cafes::status(&state.pool, cafe_id)
                .await
                .map_err(internal)?;
            if cafe_status != Some(EntityStatus::Active) {
                return Err(AppError::new(ErrorCode::CafeInactive));
            }
            Some(cafe_id)
        }
        Role::SuperAdmin => {
            let sa = db::super_admins::find_by_user(&state.pool, user.id)
                .await
                .map_err(internal)?
                .ok_or_else(|| AppError::new(ErrorCode::AccountDisabled))?;
            if sa.status != EntityStatus::Active {
                return Err(AppError::new(ErrorCode::AccountDisabled));
            }
            None
        }
    };

    let identity = Identity {
        user_id: user.id,
        email: user.email,
        role,
        cafe_id,
    };
    let token = crate::auth::token::create_token(&identity, &state.jwt_secret, state.jwt_expiry_hours)
        .map_err(|e| {
            tracing::error!("JWT creation failed: {e}");
            AppError::new(ErrorCode::InternalError)
        })?;

    tracing::info!(user_id = identity.user_id, role = role.as_db(), "Login");

    Ok(Json(LoginResponse {
        token,
        role,
        cafe_id,
        expires_in: state.jwt_expiry_hours * 3600,
    }))
}

/// PUT /api/account/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<PasswordChange>,
) -> ApiResult<serde_json::Value> {
    validate::password(&req.new_password)?;

    let user = db::users::find_by_id(&state.pool, identity.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(AppError::unauthorized)?;

    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(AppError::invalid_credentials());
    }

    let hashed = hash_password(&req.new_password).map_err(internal)?;
    db::users::update_password(&state.pool, user.id, &hashed, shared::util::now_millis())
        .await
        .map_err(internal)?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}
