//! Café management
//!
//! Every write drops the tenant cache so a domain or status change is
//! visible to the storefront on the next request.

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Cafe, CafeCreate, CafeUpdate};

use crate::api::ApiResult;
use crate::api::image::{self, ImageUploadResponse};
use crate::auth::Identity;
use crate::db::{self, images::ImageOwner};
use crate::error::internal;
use crate::state::AppState;

/// GET /api/super-admin/cafes
pub async fn list_cafes(State(state): State<AppState>) -> ApiResult<Vec<Cafe>> {
    let cafes = db::cafes::list(&state.pool).await.map_err(internal)?;
    Ok(Json(cafes))
}

/// GET /api/super-admin/cafes/{id}
pub async fn get_cafe(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Cafe> {
    let cafe = db::cafes::find(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::CafeNotFound))?;
    Ok(Json(cafe))
}

/// POST /api/super-admin/cafes
pub async fn create_cafe(
    State(state): State<AppState>,
    Json(req): Json<CafeCreate>,
) -> ApiResult<Cafe> {
    let req = req.normalize()?;
    let cafe = db::cafes::create(&state.pool, &req).await?;
    state.tenant_cache.invalidate_all().await;

    tracing::info!(cafe_id = cafe.id, domain = %cafe.domain, "Café created");
    Ok(Json(cafe))
}

/// PUT /api/super-admin/cafes/{id}
pub async fn update_cafe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CafeUpdate>,
) -> ApiResult<Cafe> {
    let req = req.normalize()?;
    let cafe = db::cafes::update(&state.pool, id, &req).await?;
    state.tenant_cache.invalidate_all().await;

    tracing::info!(cafe_id = id, "Café updated");
    Ok(Json(cafe))
}

/// DELETE /api/super-admin/cafes/{id}
///
/// Soft-deletes the café with its menus, categories, items, admins and
/// their images.
pub async fn delete_cafe(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::cafes::delete(&state.pool, id, identity.user_id).await?;
    state.tenant_cache.invalidate_all().await;
    Ok(Json(serde_json::json!({ "message": "Café deleted" })))
}

/// PUT /api/super-admin/cafes/{id}/image
pub async fn upload_cafe_image(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    image::attach(&state, ImageOwner::Cafe { cafe_id: id }, identity.user_id, multipart).await
}

/// DELETE /api/super-admin/cafes/{id}/image
pub async fn delete_cafe_image(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    image::detach(&state, ImageOwner::Cafe { cafe_id: id }, identity.user_id).await
}
