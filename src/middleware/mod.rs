//! Request extractors and middleware.
//!
//! - [`auth`]: `AuthUser`, `RequireAdmin` and the capability extractors
//!   declared with [`require_capability!`](crate::require_capability)
//! - [`rate_limit`]: keyed login rate limiting
//!
//! ```ignore
//! use crate::middleware::auth::{AuthUser, RequireNoticesEdit};
//!
//! async fn update_notice(RequireNoticesEdit(auth_user): RequireNoticesEdit) { /* ... */ }
//! ```

pub mod auth;
pub mod rate_limit;
