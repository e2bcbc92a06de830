//! # CourseHub Auth
//!
//! Access token claims and JWT utilities.
//!
//! - [`claims`]: the [`Claims`] carried by every access token
//! - [`jwt`]: token creation and verification
//!
//! ```ignore
//! use coursehub_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(&user.id, &user.username, user.role, user.permissions.granted(), &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
