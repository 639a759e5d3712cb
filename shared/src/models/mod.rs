//! Data models
//!
//! Shared between the server and its frontends (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are snowflake `i64`s (see [`crate::util::snowflake_id`]).
//! The `image` field of an entity holds the hash of its current image.

pub mod account;
pub mod cafe;
pub mod menu;
pub mod menu_category;
pub mod menu_item;
pub mod status;
pub mod storefront;
pub mod validate;

// Re-exports
pub use account::*;
pub use cafe::*;
pub use menu::*;
pub use menu_category::*;
pub use menu_item::*;
pub use status::*;
pub use storefront::*;
