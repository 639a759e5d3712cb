//! Super admin own profile

use axum::{Extension, Json, extract::Multipart, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::{ProfileUpdate, SuperAdmin};

use crate::api::ApiResult;
use crate::api::image::{self, ImageUploadResponse};
use crate::auth::Identity;
use crate::db::{self, images::ImageOwner};
use crate::error::internal;
use crate::state::AppState;

async fn current_super_admin(state: &AppState, identity: &Identity) -> Result<SuperAdmin, AppError> {
    db::super_admins::find_by_user(&state.pool, identity.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::SuperAdminNotFound))
}

/// GET /api/super-admin/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<SuperAdmin> {
    Ok(Json(current_super_admin(&state, &identity).await?))
}

/// PUT /api/super-admin/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<ProfileUpdate>,
) -> ApiResult<SuperAdmin> {
    let req = req.normalize()?;
    let sa = db::super_admins::update_profile(&state.pool, identity.user_id, &req).await?;
    Ok(Json(sa))
}

/// PUT /api/super-admin/profile/image
pub async fn upload_profile_image(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    let sa = current_super_admin(&state, &identity).await?;
    let owner = ImageOwner::SuperAdmin {
        super_admin_id: sa.id,
    };
    image::attach(&state, owner, identity.user_id, multipart).await
}

/// DELETE /api/super-admin/profile/image
pub async fn delete_profile_image(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<serde_json::Value> {
    let sa = current_super_admin(&state, &identity).await?;
    let owner = ImageOwner::SuperAdmin {
        super_admin_id: sa.id,
    };
    image::detach(&state, owner, identity.user_id).await
}
