//! Menus of the admin's café

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Menu, MenuCreate, MenuDetail, MenuUpdate};

use crate::api::ApiResult;
use crate::api::image::{self, ImageUploadResponse};
use crate::auth::AdminScope;
use crate::db::{self, images::ImageOwner};
use crate::error::internal;
use crate::state::AppState;

/// GET /api/admin/menus
pub async fn list_menus(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
) -> ApiResult<Vec<Menu>> {
    let menus = db::menus::list(&state.pool, scope.cafe_id)
        .await
        .map_err(internal)?;
    Ok(Json(menus))
}

/// GET /api/admin/menus/{id}
pub async fn get_menu(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<MenuDetail> {
    let menu = db::menus::detail(&state.pool, scope.cafe_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::MenuNotFound))?;
    Ok(Json(menu))
}

/// POST /api/admin/menus
pub async fn create_menu(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Json(req): Json<MenuCreate>,
) -> ApiResult<MenuDetail> {
    let req = req.normalize()?;
    let menu = db::menus::create(&state.pool, scope.cafe_id, &req).await?;
    Ok(Json(menu))
}

/// PUT /api/admin/menus/{id}
pub async fn update_menu(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
    Json(req): Json<MenuUpdate>,
) -> ApiResult<MenuDetail> {
    let req = req.normalize()?;
    let menu = db::menus::update(&state.pool, scope.cafe_id, id, &req).await?;
    Ok(Json(menu))
}

/// DELETE /api/admin/menus/{id}
pub async fn delete_menu(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::menus::delete(&state.pool, scope.cafe_id, id, scope.user_id).await?;
    Ok(Json(serde_json::json!({ "message": "Menu deleted" })))
}

/// POST /api/admin/menus/{id}/activate
///
/// Any other active menu of the café is switched off in the same transaction.
pub async fn activate_menu(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::menus::activate(&state.pool, scope.cafe_id, id).await?;
    Ok(Json(serde_json::json!({ "message": "Menu activated" })))
}

/// POST /api/admin/menus/{id}/deactivate
pub async fn deactivate_menu(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    db::menus::deactivate(&state.pool, scope.cafe_id, id).await?;
    Ok(Json(serde_json::json!({ "message": "Menu deactivated" })))
}

/// PUT /api/admin/menus/{id}/image
pub async fn upload_menu_image(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    let owner = ImageOwner::Menu {
        cafe_id: scope.cafe_id,
        menu_id: id,
    };
    image::attach(&state, owner, scope.user_id, multipart).await
}

/// DELETE /api/admin/menus/{id}/image
pub async fn delete_menu_image(
    State(state): State<AppState>,
    Extension(scope): Extension<AdminScope>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let owner = ImageOwner::Menu {
        cafe_id: scope.cafe_id,
        menu_id: id,
    };
    image::detach(&state, owner, scope.user_id).await
}
