//! Authentication and request scoping middleware
//!
//! - `token`: JWT issue/verify plus the role gates for the admin and
//!   super-admin areas
//! - `tenant`: public storefront requests resolved to a café by host
//! - `rate_limit`: per-IP throttling for credential endpoints

pub mod rate_limit;
pub mod tenant;
pub mod token;

pub use rate_limit::RateLimiter;
pub use tenant::{TenantCache, TenantCafe};
pub use token::{AdminScope, Identity};
