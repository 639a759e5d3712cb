//! Public storefront (no authentication, café resolved from the host)

use axum::routing::get;
use axum::{Extension, Json, Router, extract::State};
use shared::models::PublicMenu;

use super::ApiResult;
use crate::auth::TenantCafe;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/menu", get(get_public_menu))
}

/// GET /api/menu
pub async fn get_public_menu(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantCafe>,
) -> ApiResult<PublicMenu> {
    let menu = db::storefront::public_menu(&state.pool, tenant.cafe_id, |hash| {
        state.image_url(hash)
    })
    .await?;
    Ok(Json(menu))
}
