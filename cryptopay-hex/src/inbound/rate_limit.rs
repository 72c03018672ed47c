//! Rate limiting middleware using Governor.
//!
//! Implements per-merchant rate limiting with a token bucket algorithm.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::{num::NonZeroU32, sync::Arc, time::Duration};

use cryptopay_repo::security::MERCHANT_HEADER;
use cryptopay_types::ErrorResponse;

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// Per-merchant rate limiters
    limiters: DashMap<String, Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
    quota: Quota,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::per_minute(100)
    }
}

impl RateLimiterState {
    /// Allows a burst of `requests`, replenished evenly over one minute.
    pub fn per_minute(requests: u32) -> Self {
        let burst = NonZeroU32::new(requests.max(1)).unwrap_or(NonZeroU32::MIN);
        let period = Duration::from_secs(60) / burst.get();
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_minute(burst))
            .allow_burst(burst);

        Self {
            limiters: DashMap::new(),
            quota,
        }
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        let limiter = self
            .limiters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)))
            .clone();

        limiter.check().is_ok()
    }
}

/// Rate limiting middleware keyed by the merchant id header.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let key = request
        .headers()
        .get(MERCHANT_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();

    if !limiter.check(&key) {
        tracing::warn!(merchant = %key, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new(
                "rate_limited",
                "Rate limit exceeded. Please try again later.",
            )),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_limited() {
        let limiter = RateLimiterState::per_minute(3);
        for _ in 0..3 {
            assert!(limiter.check("m_1"));
        }
        assert!(!limiter.check("m_1"));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiterState::per_minute(1);
        assert!(limiter.check("m_1"));
        assert!(!limiter.check("m_1"));
        assert!(limiter.check("m_2"));
    }
}
