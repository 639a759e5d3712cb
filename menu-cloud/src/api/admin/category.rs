//! Menu categories of the admin's café

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuCategory, MenuCategoryCreate, MenuCategoryUpdate};

use crate::api::ApiResult;
use crate::api::image::{self, ImageUploadResponse};
use crate::auth::AdminScope;
use crate::db::{self, images::ImageOwner};
use crate::error::internal;
use crate::state::AppState;

/// GET /api/admin/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
) -> ApiResult<Vec<MenuCategory>> {
    let categories = db::categories::list(&state.pool, scope.cafe_id)
        .await
        .map_err(internal)?;
    Ok(Json(categories))
}

/// GET /api/admin/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<MenuCategory> {
    let category = db::categories::find(&state.pool, scope.cafe_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
    Ok(Json(category))
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Json(req): Json<MenuCategoryCreate>,
) -> ApiResult<MenuCategory> {
    let req = req.normalize()?;
    let category = db::categories::create(&state.pool, scope.cafe_id, &req)
        .await
        .map_err(internal)?;

    tracing::info!(cafe_id = scope.cafe_id, category_id = category.id, "Category created");
    Ok(Json(category))
}

/// PUT /api/admin/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
    Json(req): Json<MenuCategoryUpdate>,
) -> ApiResult<MenuCategory> {
    let req = req.normalize()?;
    let category = db::categories::update(&state.pool, scope.cafe_id, id, &req).await?;
    Ok(Json(category))
}

/// DELETE /api/admin/categories/{id}
///
/// Items of the category go with it.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::categories::delete(&state.pool, scope.cafe_id, id, scope.user_id).await?;
    Ok(Json(serde_json::json!({ "message": "Category deleted" })))
}

/// PUT /api/admin/categories/{id}/image
pub async fn upload_category_image(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    let owner = ImageOwner::MenuCategory {
        cafe_id: scope.cafe_id,
        category_id: id,
    };
    image::attach(&state, owner, scope.user_id, multipart).await
}

/// DELETE /api/admin/categories/{id}/image
pub async fn delete_category_image(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let owner = ImageOwner::MenuCategory {
        cafe_id: scope.cafe_id,
        category_id: id,
    };
    image::detach(&state, owner, scope.user_id).await
}
