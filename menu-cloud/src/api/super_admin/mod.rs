//! Platform administration (super admin only)

mod admin;
mod cafe;
mod profile;

use axum::Router;
use axum::routing::{get, put};

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
        .route("/cafes", get(cafe::list_cafes).post(cafe::create_cafe))
        .route(
            "/cafes/{id}",
            get(cafe::get_cafe)
                .put(cafe::update_cafe)
                .delete(cafe::delete_cafe),
        )
        .route(
            "/cafes/{id}/image",
            put(cafe::upload_cafe_image).delete(cafe::delete_cafe_image),
        )
        .route("/admins", get(admin::list_admins).post(admin::create_admin))
        .route(
            "/admins/{id}",
            get(admin::get_admin)
                .put(admin::update_admin)
                .delete(admin::delete_admin),
        )
        .route("/admins/{id}/password", put(admin::reset_password))
}
