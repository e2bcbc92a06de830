//! Per-client rate limiting for the login endpoint.
//!
//! Token bucket keyed by client address, built on `governor`. The key is the
//! first address in `X-Forwarded-For`, then the peer address when the server
//! was started with connect info, then `"anonymous"`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use coursehub_core::AppError;

#[derive(Clone)]
pub struct KeyedRateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl std::fmt::Debug for KeyedRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedRateLimiter").finish_non_exhaustive()
    }
}

impl KeyedRateLimiter {
    pub fn new(quota: Quota) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    pub fn check(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<KeyedRateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);

    if !limiter.check(&key) {
        warn!(client = %key, path = %req.uri().path(), "Rate limit exceeded");
        return AppError::too_many_requests(anyhow!("Too many requests, slow down"))
            .into_response();
    }

    debug!(client = %key, "Rate limit check passed");
    next.run(req).await
}

fn client_key(req: &Request) -> String {
    if let Some(ip) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
    {
        return ip.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::num::NonZeroU32;

    fn request_from(forwarded: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/auth/login");
        if let Some(value) = forwarded {
            builder = builder.header("x-forwarded-for", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_client_key_prefers_first_forwarded_address() {
        let req = request_from(Some("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_key(&req), "203.0.113.7");
    }

    #[test]
    fn test_client_key_ignores_garbage_header() {
        let req = request_from(Some("not-an-ip"));
        assert_eq!(client_key(&req), "anonymous");
    }

    #[test]
    fn test_limiter_is_per_key() {
        let limiter = KeyedRateLimiter::new(
            Quota::per_minute(NonZeroU32::new(1).unwrap()).allow_burst(NonZeroU32::new(2).unwrap()),
        );
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));
    }
}
