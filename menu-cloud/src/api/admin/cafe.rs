//! The admin's own café (profile fields only; domain and status belong to
//! the super admin)

use axum::{Extension, Json, extract::Multipart, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::{Cafe, CafeProfileUpdate, CafeUpdate};

use crate::api::ApiResult;
use crate::api::image::{self, ImageUploadResponse};
use crate::auth::AdminScope;
use crate::db::{self, images::ImageOwner};
use crate::error::internal;
use crate::state::AppState;

/// GET /api/admin/cafe
pub async fn get_cafe(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
) -> ApiResult<Cafe> {
    let cafe = db::cafes::find(&state.pool, scope.cafe_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::CafeNotFound))?;
    Ok(Json(cafe))
}

/// PUT /api/admin/cafe
pub async fn update_cafe(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Json(req): Json<CafeProfileUpdate>,
) -> ApiResult<Cafe> {
    let req: CafeUpdate = req.normalize()?.into();
    let cafe = db::cafes::update(&state.pool, scope.cafe_id, &req).await?;
    state.tenant_cache.invalidate_all().await;

    tracing::info!(cafe_id = scope.cafe_id, "Café profile updated by admin");
    Ok(Json(cafe))
}

/// PUT /api/admin/cafe/image
pub async fn upload_cafe_image(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    image::attach(
        &state,
        ImageOwner::Cafe {
            cafe_id: scope.cafe_id,
        },
        scope.user_id,
        multipart,
    )
    .await
}

/// DELETE /api/admin/cafe/image
pub async fn delete_cafe_image(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
) -> ApiResult<serde_json::Value> {
    image::detach(
        &state,
        ImageOwner::Cafe {
            cafe_id: scope.cafe_id,
        },
        scope.user_id,
    )
    .await
}
