//! Menu items of the admin's café

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};

use crate::api::ApiResult;
use crate::api::image::{self, ImageUploadResponse};
use crate::auth::AdminScope;
use crate::db::{self, images::ImageOwner};
use crate::error::internal;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ItemFilter {
    pub category_id: Option<i64>,
}

/// GET /api/admin/items?category_id=
pub async fn list_items(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Query(filter): Query<ItemFilter>,
) -> ApiResult<Vec<MenuItem>> {
    let items = db::items::list(&state.pool, scope.cafe_id, filter.category_id)
        .await
        .map_err(internal)?;
    Ok(Json(items))
}

/// GET /api/admin/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<MenuItem> {
    let item = db::items::find(&state.pool, scope.cafe_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ItemNotFound))?;
    Ok(Json(item))
}

/// POST /api/admin/items
pub async fn create_item(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Json(req): Json<MenuItemCreate>,
) -> ApiResult<MenuItem> {
    let req = req.normalize()?;
    let item = db::items::create(&state.pool, scope.cafe_id, &req).await?;

    tracing::info!(cafe_id = scope.cafe_id, item_id = item.id, "Menu item created");
    Ok(Json(item))
}

/// PUT /api/admin/items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
    Json(req): Json<MenuItemUpdate>,
) -> ApiResult<MenuItem> {
    let req = req.normalize()?;
    let item = db::items::update(&state.pool, scope.cafe_id, id, &req).await?;
    Ok(Json(item))
}

/// DELETE /api/admin/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::items::delete(&state.pool, scope.cafe_id, id, scope.user_id).await?;
    Ok(Json(serde_json::json!({ "message": "Menu item deleted" })))
}

/// PUT /api/admin/items/{id}/image
pub async fn upload_item_image(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    let owner = ImageOwner::MenuItem {
        cafe_id: scope.cafe_id,
        item_id: id,
    };
    image::attach(&state, owner, scope.user_id, multipart).await
}

/// DELETE /api/admin/items/{id}/image
pub async fn delete_item_image(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let owner = ImageOwner::MenuItem {
        cafe_id: scope.cafe_id,
        item_id: id,
    };
    image::detach(&state, owner, scope.user_id).await
}
