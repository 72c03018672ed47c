//! Read-through rate cache.
//!
//! Quotes younger than the freshness window are served from memory. Misses
//! and stale entries are refreshed from the inner oracle; concurrent refreshes
//! of the same pair are harmless and the last write wins.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use cryptopay_types::{Quote, RateError, RateOracle};

pub struct CachedRateOracle<O> {
    inner: O,
    freshness: Duration,
    quotes: DashMap<(String, String), Quote>,
}

impl<O: RateOracle> CachedRateOracle<O> {
    pub fn new(inner: O, freshness: std::time::Duration) -> Self {
        Self {
            inner,
            freshness: Duration::from_std(freshness).unwrap_or(Duration::seconds(60)),
            quotes: DashMap::new(),
        }
    }

    fn fresh(&self, key: &(String, String)) -> Option<Quote> {
        let now = Utc::now();
        self.quotes
            .get(key)
            .map(|q| *q)
            .filter(|q| now - q.timestamp < self.freshness)
    }
}

#[async_trait]
impl<O: RateOracle> RateOracle for CachedRateOracle<O> {
    async fn get_rate(&self, fiat: &str, crypto: &str) -> Result<Quote, RateError> {
        let key = (fiat.trim().to_uppercase(), crypto.trim().to_uppercase());
        if let Some(quote) = self.fresh(&key) {
            return Ok(quote);
        }

        debug!(fiat = %key.0, crypto = %key.1, "refreshing exchange rate");
        let quote = self.inner.get_rate(&key.0, &key.1).await?;
        self.quotes.insert(key, quote);
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct CountingOracle {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RateOracle for CountingOracle {
        async fn get_rate(&self, fiat: &str, crypto: &str) -> Result<Quote, RateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if crypto == "NOPE" {
                return Err(RateError::RateNotAvailable {
                    fiat: fiat.into(),
                    crypto: crypto.into(),
                });
            }
            Ok(Quote {
                rate: dec!(0.5),
                timestamp: Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_serves_fresh_quotes_from_cache() {
        let inner = CountingOracle::default();
        let calls = inner.calls.clone();
        let cache = CachedRateOracle::new(inner, std::time::Duration::from_secs(60));

        cache.get_rate("SGD", "BTC").await.unwrap();
        cache.get_rate("sgd", "btc").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.get_rate("SGD", "ETH").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refreshes_stale_quotes() {
        let inner = CountingOracle::default();
        let calls = inner.calls.clone();
        let cache = CachedRateOracle::new(inner, std::time::Duration::ZERO);

        cache.get_rate("SGD", "BTC").await.unwrap();
        cache.get_rate("SGD", "BTC").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let inner = CountingOracle::default();
        let calls = inner.calls.clone();
        let cache = CachedRateOracle::new(inner, std::time::Duration::from_secs(60));

        assert!(cache.get_rate("SGD", "NOPE").await.is_err());
        assert!(cache.get_rate("SGD", "NOPE").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
