//! Café admin area
//!
//! Every handler is scoped to the café in the caller's token
//! ([`AdminScope`](crate::auth::AdminScope)); ids from other cafés behave
//! as if they did not exist.

mod cafe;
mod category;
mod item;
mod menu;
mod profile;

use axum::Router;
use axum::routing::{get, post, put};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/profile/image",
            put(profile::upload_profile_image).delete(profile::delete_profile_image),
        )
        .route("/cafe", get(cafe::get_cafe).put(cafe::update_cafe))
        .route(
            "/cafe/image",
            put(cafe::upload_cafe_image).delete(cafe::delete_cafe_image),
        )
        .route("/menus", get(menu::list_menus).post(menu::create_menu))
        .route(
            "/menus/{id}",
            get(menu::get_menu)
                .put(menu::update_menu)
                .delete(menu::delete_menu),
        )
        .route("/menus/{id}/activate", post(menu::activate_menu))
        .route("/menus/{id}/deactivate", post(menu::deactivate_menu))
        .route(
            "/menus/{id}/image",
            put(menu::upload_menu_image).delete(menu::delete_menu_image),
        )
        .route(
            "/categories",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/categories/{id}",
            get(category::get_category)
                .put(category::update_category)
                .delete(category::delete_category),
        )
        .route(
            "/categories/{id}/image",
            put(category::upload_category_image).delete(category::delete_category_image),
        )
        .route("/items", get(item::list_items).post(item::create_item))
        .route(
            "/items/{id}",
            get(item::get_item)
                .put(item::update_item)
                .delete(item::delete_item),
        )
        .route(
            "/items/{id}/image",
            put(item::upload_item_image).delete(item::delete_item_image),
        )
}
