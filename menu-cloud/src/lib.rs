//! menu-cloud: multi-tenant café QR-menu service
//!
//! - Public storefront: `GET /api/menu`, café resolved from the request host
//! - Café admin area (JWT, scoped to one café)
//! - Super-admin area for cafés and their admins
//! - Content-addressed image store served under `/media`

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod state;
pub mod util;

pub use config::Config;
pub use state::AppState;
