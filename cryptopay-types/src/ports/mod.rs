//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod archive;
mod ledger;
mod notifier;
mod rates;

pub use archive::PaymentArchive;
pub use ledger::{LedgerError, LedgerService, LedgerStatus};
pub use notifier::{Notifier, PaymentEvent};
pub use rates::{Quote, RateError, RateOracle};
