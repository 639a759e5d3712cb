//! Admin own profile

use axum::{Extension, Json, extract::Multipart, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::{Admin, ProfileUpdate};

use crate::api::ApiResult;
use crate::api::image::{self, ImageUploadResponse};
use crate::auth::AdminScope;
use crate::db::{self, images::ImageOwner};
use crate::error::internal;
use crate::state::AppState;

async fn current_admin(state: &AppState, scope: &AdminScope) -> Result<Admin, AppError> {
    db::admins::find_by_user(&state.pool, scope.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::AdminNotFound))
}

/// GET /api/admin/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
) -> ApiResult<Admin> {
    let admin = current_admin(&state, &scope).await?;
    Ok(Json(admin))
}

/// PUT /api/admin/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Json(req): Json<ProfileUpdate>,
) -> ApiResult<Admin> {
    let req = req.normalize()?;
    let admin = db::admins::update_profile(&state.pool, scope.user_id, &req).await?;
    Ok(Json(admin))
}

/// PUT /api/admin/profile/image
pub async fn upload_profile_image(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    let admin = current_admin(&state, &scope).await?;
    image::attach(
        &state,
        ImageOwner::Admin { admin_id: admin.id },
        scope.user_id,
        multipart,
    )
    .await
}

/// DELETE /api/admin/profile/image
pub async fn delete_profile_image(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
) -> ApiResult<serde_json::Value> {
    let admin = current_admin(&state, &scope).await?;
    image::detach(&state, ImageOwner::Admin { admin_id: admin.id }, scope.user_id).await
}
