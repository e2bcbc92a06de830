//! Rate limiting for the login endpoint.
//!
//! Token bucket per client key, built on `governor`:
//!
//! - `RATE_LIMIT_ENABLED`: turn the limiter on or off (default: true)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: tokens replenished per second (default: 1)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: bucket size (default: 5)

use std::num::NonZeroU32;

use governor::Quota;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth_per_second: u32,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_per_second: 1,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: crate::env_flag("RATE_LIMIT_ENABLED", defaults.enabled),
            auth_per_second: crate::env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: crate::env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// Configuration with limiting switched off, used by tests.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Quota for auth endpoints. `None` when limiting is disabled.
    ///
    /// Zero values are clamped to one so a misconfigured environment still
    /// produces a usable quota.
    #[must_use]
    pub fn auth_quota(&self) -> Option<Quota> {
        if !self.enabled {
            return None;
        }
        let per_second = NonZeroU32::new(self.auth_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.auth_burst_size).unwrap_or(NonZeroU32::MIN);
        Some(Quota::per_second(per_second).allow_burst(burst))
    }
}
