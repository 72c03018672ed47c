//! Exchange rate oracle.
//!
//! Prices are defined declaratively in USD with the `define_prices!` macro,
//! which generates the lookup functions and code lists. A rate is always
//! quoted as crypto units per one unit of fiat.
//!
//! # Adding a New Asset
//! Add a line to the `define_prices!` invocation in `table.rs`:
//! ```ignore
//! define_prices! {
//!     fiat { "PHP" => dec!(0.018), }
//!     crypto { "AVAX" => dec!(35), }
//! }
//! ```
//!
//! # Example
//! ```
//! use rate_oracle::StaticRateTable;
//! use rust_decimal_macros::dec;
//!
//! let table = StaticRateTable::new();
//! // 1 SGD = 0.75 USD, 1 USDT = 1 USD
//! assert_eq!(table.rate("SGD", "USDT").unwrap(), dec!(0.75));
//! ```

pub mod cache;
pub mod table;

pub use cache::CachedRateOracle;
pub use table::{CRYPTO_CODES, FIAT_CODES, StaticRateTable, crypto_usd_price, fiat_usd_price};
