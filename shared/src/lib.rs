//! Shared types for the QR-menu platform
//!
//! Entity models, request payloads, the storefront view, and the unified
//! error system used by the server and its clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
