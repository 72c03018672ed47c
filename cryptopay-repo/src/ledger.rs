//! Simulated ledger service.
//!
//! Issues random receiving addresses and tracks a confirmation count per
//! address. Confirmations arrive through [`SimulatedLedger::confirm`], or
//! automatically after a fixed delay when one is configured.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use cryptopay_types::{LedgerError, LedgerService, LedgerStatus};

const EVM_ASSETS: &[&str] = &[
    "ETH", "USDT", "USDC", "BUSD", "DAI", "BNB", "LINK", "UNI", "AAVE", "MATIC",
];

struct AddressRecord {
    issued_at: Instant,
    confirmations: u32,
}

#[derive(Default)]
pub struct SimulatedLedger {
    addresses: DashMap<String, AddressRecord>,
    auto_confirm_after: Option<Duration>,
}

impl SimulatedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Addresses report one confirmation once `delay` has passed since issue.
    pub fn with_auto_confirm(mut self, delay: Duration) -> Self {
        self.auto_confirm_after = Some(delay);
        self
    }

    /// Sets the confirmation count of an issued address.
    pub fn confirm(&self, address: &str, confirmations: u32) -> Result<(), LedgerError> {
        let mut record = self
            .addresses
            .get_mut(address)
            .ok_or_else(|| LedgerError::UnknownAddress(address.to_string()))?;
        record.confirmations = confirmations;
        Ok(())
    }

    fn random_hex(bytes: usize) -> String {
        let raw: Vec<u8> = (0..bytes).map(|_| rand::random::<u8>()).collect();
        hex::encode(raw)
    }

    fn format_address(crypto_currency: &str) -> String {
        match crypto_currency {
            "BTC" => format!("bc1q{}", Self::random_hex(19)),
            c if EVM_ASSETS.contains(&c) => format!("0x{}", Self::random_hex(20)),
            other => format!("{}_{}", other.to_lowercase(), Self::random_hex(16)),
        }
    }
}

#[async_trait]
impl LedgerService for SimulatedLedger {
    async fn generate_payment_address(&self, crypto_currency: &str) -> Result<String, LedgerError> {
        let code = crypto_currency.trim().to_uppercase();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LedgerError::UnsupportedCurrency(crypto_currency.to_string()));
        }

        let address = Self::format_address(&code);
        self.addresses.insert(
            address.clone(),
            AddressRecord {
                issued_at: Instant::now(),
                confirmations: 0,
            },
        );
        debug!(currency = %code, address = %address, "issued payment address");
        Ok(address)
    }

    async fn get_status(&self, address: &str) -> Result<LedgerStatus, LedgerError> {
        let record = self
            .addresses
            .get(address)
            .ok_or_else(|| LedgerError::UnknownAddress(address.to_string()))?;

        let confirmations = match self.auto_confirm_after {
            Some(delay) if record.issued_at.elapsed() >= delay => record.confirmations.max(1),
            _ => record.confirmations,
        };

        if confirmations == 0 {
            Ok(LedgerStatus::Unconfirmed)
        } else {
            Ok(LedgerStatus::Confirmed { confirmations })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_address_formats() {
        let ledger = SimulatedLedger::new();

        let btc = ledger.generate_payment_address("BTC").await.unwrap();
        assert!(btc.starts_with("bc1q"));

        let eth = ledger.generate_payment_address("usdt").await.unwrap();
        assert!(eth.starts_with("0x"));
        assert_eq!(eth.len(), 42);

        let ada = ledger.generate_payment_address("ADA").await.unwrap();
        assert!(ada.starts_with("ada_"));

        assert_ne!(btc, ledger.generate_payment_address("BTC").await.unwrap());
    }

    #[tokio::test]
    async fn test_unsupported_currency() {
        let ledger = SimulatedLedger::new();
        assert!(matches!(
            ledger.generate_payment_address("").await,
            Err(LedgerError::UnsupportedCurrency(_))
        ));
    }

    #[tokio::test]
    async fn test_confirmation_flow() {
        let ledger = SimulatedLedger::new();
        let address = ledger.generate_payment_address("BTC").await.unwrap();

        assert_eq!(
            ledger.get_status(&address).await.unwrap(),
            LedgerStatus::Unconfirmed
        );

        ledger.confirm(&address, 3).unwrap();
        let status = ledger.get_status(&address).await.unwrap();
        assert_eq!(status, LedgerStatus::Confirmed { confirmations: 3 });
        assert!(status.is_confirmed(1));
        assert!(!status.is_confirmed(6));
    }

    #[tokio::test]
    async fn test_auto_confirm() {
        let ledger = SimulatedLedger::new().with_auto_confirm(Duration::ZERO);
        let address = ledger.generate_payment_address("ETH").await.unwrap();
        assert!(ledger.get_status(&address).await.unwrap().is_confirmed(1));
    }

    #[tokio::test]
    async fn test_unknown_address() {
        let ledger = SimulatedLedger::new();
        assert!(matches!(
            ledger.get_status("bc1qnope").await,
            Err(LedgerError::UnknownAddress(_))
        ));
        assert!(ledger.confirm("bc1qnope", 1).is_err());
    }
}
