//! Ledger / wallet service port.
//!
//! Issues receiving addresses and reports confirmation status for them.

/// Error type for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Unknown address: {0}")]
    UnknownAddress(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Confirmation state of an address as reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerStatus {
    Unconfirmed,
    Confirmed { confirmations: u32 },
}

impl LedgerStatus {
    /// True once the ledger reports at least `required` confirmations.
    pub fn is_confirmed(&self, required: u32) -> bool {
        match self {
            LedgerStatus::Unconfirmed => false,
            LedgerStatus::Confirmed { confirmations } => *confirmations >= required,
        }
    }
}

/// Port trait for the ledger/wallet service.
#[async_trait::async_trait]
pub trait LedgerService: Send + Sync + 'static {
    /// Generates a fresh receiving address for the given cryptocurrency.
    async fn generate_payment_address(&self, crypto_currency: &str) -> Result<String, LedgerError>;

    /// Returns the confirmation status of payments sent to `address`.
    async fn get_status(&self, address: &str) -> Result<LedgerStatus, LedgerError>;
}
