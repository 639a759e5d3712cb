//! Database access layer
//!
//! Plain reads take `&PgPool`. Multi-step writes open one transaction per
//! operation and pass `&mut PgConnection` (`&mut *tx`) to the helpers they
//! share. Every business query filters out `status = 'deleted'` rows.

pub mod admins;
pub mod cafes;
pub mod categories;
pub mod images;
pub mod items;
pub mod menus;
pub mod storefront;
pub mod super_admins;
pub mod users;

pub use crate::error::BoxError;


#[cfg(test)]
pub(crate) mod fixtures;
