//! Static USD price table.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use cryptopay_types::{Quote, RateError, RateOracle};

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: defines price lookups and the list of known codes
// ─────────────────────────────────────────────────────────────────────────────

/// Defines USD prices for fiat currencies and cryptoassets.
///
/// # Syntax
/// ```ignore
/// define_prices! {
///     fiat { "CODE" => usd_per_unit, ... }
///     crypto { "CODE" => usd_per_unit, ... }
/// }
/// ```
macro_rules! define_prices {
    (
        fiat { $($fiat:literal => $fiat_usd:expr),* $(,)? }
        crypto { $($crypto:literal => $crypto_usd:expr),* $(,)? }
    ) => {
        /// USD value of one unit of a fiat currency.
        pub fn fiat_usd_price(code: &str) -> Option<Decimal> {
            match code {
                $($fiat => Some($fiat_usd),)*
                _ => None,
            }
        }

        /// USD value of one unit of a cryptoasset.
        pub fn crypto_usd_price(code: &str) -> Option<Decimal> {
            match code {
                $($crypto => Some($crypto_usd),)*
                _ => None,
            }
        }

        pub const FIAT_CODES: &[&str] = &[$($fiat),*];
        pub const CRYPTO_CODES: &[&str] = &[$($crypto),*];
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// PRICE DEFINITIONS
// ─────────────────────────────────────────────────────────────────────────────

define_prices! {
    fiat {
        "USD" => dec!(1),
        "SGD" => dec!(0.75),
        "MYR" => dec!(0.23),
        "THB" => dec!(0.030),
        "IDR" => dec!(0.000064),
        "VND" => dec!(0.000041),
        "BND" => dec!(0.75),
        "KHR" => dec!(0.00025),
        "LAK" => dec!(0.000056),
    }
    crypto {
        "BTC" => dec!(40000),
        "ETH" => dec!(2850),
        "USDT" => dec!(1),
        "USDC" => dec!(1),
        "BUSD" => dec!(1),
        "DAI" => dec!(1),
        "BNB" => dec!(300),
        "XRP" => dec!(0.5),
        "ADA" => dec!(0.4),
        "SOL" => dec!(100),
        "DOT" => dec!(7),
        "DOGE" => dec!(0.08),
        "LINK" => dec!(15),
        "UNI" => dec!(6),
        "MATIC" => dec!(0.8),
        "LTC" => dec!(70),
        "BCH" => dec!(250),
        "AAVE" => dec!(90),
    }
}

/// Rates are kept to this many decimal places; small fiat units against
/// large crypto prices need the precision.
const RATE_SCALE: u32 = 18;

/// Rate oracle backed by the static price table.
///
/// With fluctuation enabled every quote moves the crypto price by a random
/// amount within `±max_percent`, to simulate a live market.
#[derive(Debug, Clone, Default)]
pub struct StaticRateTable {
    fluctuation_percent: Option<Decimal>,
}

impl StaticRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fluctuation(mut self, max_percent: Decimal) -> Self {
        self.fluctuation_percent = Some(max_percent);
        self
    }

    /// Crypto units bought by one unit of `fiat`.
    pub fn rate(&self, fiat: &str, crypto: &str) -> Result<Decimal, RateError> {
        let fiat = fiat.trim().to_uppercase();
        let crypto = crypto.trim().to_uppercase();
        let unavailable = || RateError::RateNotAvailable {
            fiat: fiat.clone(),
            crypto: crypto.clone(),
        };

        let fiat_usd = fiat_usd_price(&fiat).ok_or_else(unavailable)?;
        let crypto_usd = self.fluctuate(crypto_usd_price(&crypto).ok_or_else(unavailable)?);

        fiat_usd
            .checked_div(crypto_usd)
            .map(|rate| rate.round_dp(RATE_SCALE).normalize())
            .ok_or_else(unavailable)
    }

    fn fluctuate(&self, price: Decimal) -> Decimal {
        let Some(max_percent) = self.fluctuation_percent else {
            return price;
        };
        // Uniform factor in [-1, 1] with three decimal places.
        let factor = Decimal::new(rand::random_range(-1000..=1000), 3);
        price + price * max_percent / dec!(100) * factor
    }
}

#[async_trait]
impl RateOracle for StaticRateTable {
    async fn get_rate(&self, fiat: &str, crypto: &str) -> Result<Quote, RateError> {
        Ok(Quote {
            rate: self.rate(fiat, crypto)?,
            timestamp: Utc::now(),
        })
    }
}
