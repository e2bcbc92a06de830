//! # CourseHub Core
//!
//! Core types, errors, and utilities for the CourseHub API.
//!
//! This crate provides foundational types used throughout the CourseHub application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`capabilities`]: Roles, capabilities and the permission predicate
//! - [`password`]: Password hashing and verification
//! - [`file_storage`]: Storage backend abstraction for uploaded course material
//! - [`ids`]: Time-based identifiers for moderation and audit records
//!
//! # Example
//!
//! ```ignore
//! use coursehub_core::capabilities::{Capability, has_permission};
//! use coursehub_core::errors::AppError;
//!
//! if !has_permission(Some(&user), Capability::CoursesEdit) {
//!     return Err(AppError::forbidden(anyhow::anyhow!("courses_edit required")));
//! }
//! ```

pub mod capabilities;
pub mod errors;
pub mod file_storage;
pub mod ids;
pub mod password;

// Re-export commonly used types at crate root
pub use capabilities::{Capability, PermissionMap, Principal, Role, has_permission};
pub use errors::{AppError, FieldErrors};
pub use file_storage::{FileStorage, LocalFileStorage, StorageError, sanitize_file_name};
pub use password::{hash_password, verify_password};
