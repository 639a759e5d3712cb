//! Storefront read model

use shared::error::ErrorCode;
use shared::models::PublicMenu;
use sqlx::PgPool;

use super::{cafes, categories, items, menus};
use crate::error::ServiceResult;

/// The active menu of `cafe_id` as served to customers.
///
/// `image_url` maps an image hash to the URL handed to the client.
pub async fn public_menu(
    pool: &PgPool,
    cafe_id: i64,
    image_url: impl Fn(&str) -> String,
) -> ServiceResult<PublicMenu> {
    let cafe = cafes::find(pool, cafe_id)
        .await?
        .ok_or(ErrorCode::TenantNotFound)?;
    let menu = menus::find_active(pool, cafe_id)
        .await?
        .ok_or(ErrorCode::NoActiveMenu)?;

    let categories = categories::list_for_menu(pool, menu.id).await?;
    let category_ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
    let items = items::list_for_categories(pool, &category_ids).await?;

    Ok(PublicMenu::assemble(cafe, menu, categories, items, image_url))
}
