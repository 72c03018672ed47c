//! Exchange rate oracle port.
//!
//! Implementations can be static tables, HTTP clients, caches, etc.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Error type for rate lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("Rate not available for {fiat} -> {crypto}")]
    RateNotAvailable { fiat: String, crypto: String },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// A rate observation: crypto units per one unit of fiat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub rate: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait RateOracle: Send + Sync + 'static {
    /// Returns how many units of `crypto` one unit of `fiat` buys.
    async fn get_rate(&self, fiat: &str, crypto: &str) -> Result<Quote, RateError>;
}
