//! # CourseHub Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: JWT signing secret and token lifetime
//! - [`cors`]: allowed browser origins
//! - [`rate_limit`]: login rate limiting
//! - [`storage`]: upload directory and public file URLs
//! - [`audit`]: audit log retention
//! - [`server`]: listener addresses
//!
//! ```ignore
//! use coursehub_config::{JwtConfig, StorageConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let storage_config = StorageConfig::from_env();
//! ```

pub mod audit;
pub mod cors;
pub mod jwt;
pub mod rate_limit;
pub mod server;
pub mod storage;

pub use audit::AuditConfig;
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

/// Read and parse an environment variable, falling back on absence or parse failure.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}
