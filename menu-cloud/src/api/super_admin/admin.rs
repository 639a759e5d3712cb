//! Café admin accounts

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Admin, AdminCreate, AdminUpdate, PasswordReset, validate};

use crate::api::ApiResult;
use crate::auth::Identity;
use crate::db;
use crate::error::internal;
use crate::state::AppState;
use crate::util::hash_password;

#[derive(Debug, Deserialize)]
pub struct AdminFilter {
    pub cafe_id: Option<i64>,
}

/// GET /api/super-admin/admins?cafe_id=
pub async fn list_admins(
    State(state): State<AppState>,
    Query(filter): Query<AdminFilter>,
) -> ApiResult<Vec<Admin>> {
    let admins = db::admins::list(&state.pool, filter.cafe_id)
        .await
        .map_err(internal)?;
    Ok(Json(admins))
}

/// GET /api/super-admin/admins/{id}
pub async fn get_admin(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Admin> {
    let admin = db::admins::find(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::AdminNotFound))?;
    Ok(Json(admin))
}

/// POST /api/super-admin/admins
pub async fn create_admin(
    State(state): State<AppState>,
    Json(req): Json<AdminCreate>,
) -> ApiResult<Admin> {
    let req = req.normalize()?;
    let hashed = hash_password(&req.password).map_err(internal)?;
    let admin = db::admins::create(&state.pool, &req, &hashed).await?;
    Ok(Json(admin))
}

/// PUT /api/super-admin/admins/{id}
pub async fn update_admin(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AdminUpdate>,
) -> ApiResult<Admin> {
    let req = req.normalize()?;
    let admin = db::admins::update(&state.pool, id, &req).await?;

    tracing::info!(admin_id = id, "Admin updated");
    Ok(Json(admin))
}

/// DELETE /api/super-admin/admins/{id}
///
/// The login user is disabled and loses its claims; the email becomes
/// available again.
pub async fn delete_admin(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::admins::delete(&state.pool, id, identity.user_id).await?;
    Ok(Json(serde_json::json!({ "message": "Admin deleted" })))
}

/// PUT /api/super-admin/admins/{id}/password
pub async fn reset_password(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<PasswordReset>,
) -> ApiResult<serde_json::Value> {
    validate::password(&req.new_password)?;

    let admin = db::admins::find(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::AdminNotFound))?;

    let hashed = hash_password(&req.new_password).map_err(internal)?;
    let updated =
        db::users::update_password(&state.pool, admin.user_id, &hashed, shared::util::now_millis())
            .await
            .map_err(internal)?;
    if !updated {
        return Err(AppError::new(ErrorCode::AdminNotFound));
    }

    tracing::info!(admin_id = id, "Admin password reset");
    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}
