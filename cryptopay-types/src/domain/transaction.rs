//! Transaction domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::jurisdiction::CountryCode;

/// A payment request under compliance review.
///
/// Transactions are ephemeral - they only exist while being validated and
/// are never persisted when validation fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Fiat amount in major units
    pub amount: Decimal,
    /// Fiat currency code
    pub currency: String,
    /// Cryptocurrency the customer pays with
    pub crypto_currency: String,
    pub country_code: CountryCode,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub source_address: Option<String>,
    pub destination_address: Option<String>,
    /// Declared purpose of the transfer, e.g. "payment" or "investment"
    pub purpose: Option<String>,
    /// Last recorded activity of the merchant
    pub merchant_last_active: Option<DateTime<Utc>>,
    pub requested_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a transaction with only the mandatory fields set.
    pub fn new(
        amount: Decimal,
        currency: impl Into<String>,
        crypto_currency: impl Into<String>,
        country_code: impl Into<CountryCode>,
    ) -> Self {
        Self {
            amount,
            currency: currency.into(),
            crypto_currency: crypto_currency.into(),
            country_code: country_code.into(),
            customer_name: None,
            customer_email: None,
            source_address: None,
            destination_address: None,
            purpose: None,
            merchant_last_active: None,
            requested_at: Utc::now(),
        }
    }

    pub fn with_customer(mut self, name: Option<String>, email: Option<String>) -> Self {
        self.customer_name = name;
        self.customer_email = email;
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_merchant_last_active(mut self, at: DateTime<Utc>) -> Self {
        self.merchant_last_active = Some(at);
        self
    }

    pub fn with_requested_at(mut self, at: DateTime<Utc>) -> Self {
        self.requested_at = at;
        self
    }

    /// Customer name, treating blank strings as absent.
    pub fn customer_name(&self) -> Option<&str> {
        non_blank(self.customer_name.as_deref())
    }

    /// Customer email, treating blank strings as absent.
    pub fn customer_email(&self) -> Option<&str> {
        non_blank(self.customer_email.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_creation() {
        let tx = Transaction::new(dec!(1200), "SGD", "BTC", "sg");
        assert_eq!(tx.country_code.as_str(), "SG");
        assert!(tx.customer_name().is_none());
        assert!(tx.purpose.is_none());
    }

    #[test]
    fn test_blank_customer_fields_are_absent() {
        let tx = Transaction::new(dec!(10), "SGD", "BTC", "SG")
            .with_customer(Some("  ".into()), Some("alice@example.com".into()));
        assert!(tx.customer_name().is_none());
        assert_eq!(tx.customer_email(), Some("alice@example.com"));
    }
}
