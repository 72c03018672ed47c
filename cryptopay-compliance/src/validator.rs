//! Transaction validation pipeline.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. amount > 0, currency and crypto currency present
//! 2. jurisdiction lookup (and fiat currency must match it)
//! 3. crypto currency in the supported list
//! 4. amount within the daily limit
//! 5. jurisdiction-specific rules
//!
//! Validation has no side effects; a rejected transaction leaves no trace.

use std::sync::Arc;

use rust_decimal::Decimal;

use cryptopay_types::{CountryCode, Transaction, ValidationError};

use crate::module::Clearance;
use crate::registry::ComplianceRegistry;

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    pub country_code: CountryCode,
    /// Tax due in the jurisdiction's currency
    pub tax: Decimal,
    pub clearance: Clearance,
}

#[derive(Clone)]
pub struct TransactionValidator {
    registry: Arc<ComplianceRegistry>,
}

impl TransactionValidator {
    pub fn new(registry: Arc<ComplianceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ComplianceRegistry {
        &self.registry
    }

    #[tracing::instrument(
        skip(self, tx),
        fields(country = %tx.country_code, amount = %tx.amount, crypto = %tx.crypto_currency)
    )]
    pub fn validate(&self, tx: &Transaction) -> Result<Accepted, ValidationError> {
        let result = self.run(tx);
        if let Err(ref e) = result {
            tracing::info!(reason = %e, "Transaction rejected");
        }
        result
    }

    fn run(&self, tx: &Transaction) -> Result<Accepted, ValidationError> {
        if tx.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidRequest(
                "amount must be greater than zero".into(),
            ));
        }
        if tx.currency.trim().is_empty() {
            return Err(ValidationError::InvalidRequest("currency is required".into()));
        }
        if tx.crypto_currency.trim().is_empty() {
            return Err(ValidationError::InvalidRequest(
                "crypto_currency is required".into(),
            ));
        }

        let module = self.registry.get(tx.country_code.as_str())?;
        let profile = module.profile();

        if !tx.currency.trim().eq_ignore_ascii_case(&profile.currency_code) {
            return Err(ValidationError::InvalidRequest(format!(
                "currency {} does not match {} for {}",
                tx.currency, profile.currency_code, profile.country_code
            )));
        }

        if !profile.supports(&tx.crypto_currency) {
            return Err(ValidationError::UnsupportedAsset {
                asset: tx.crypto_currency.clone(),
                country: profile.country_code.to_string(),
            });
        }

        let limits = module.limits();
        if tx.amount > limits.daily {
            return Err(ValidationError::LimitExceeded {
                amount: tx.amount,
                limit: limits.daily,
            });
        }

        let clearance = module.validate(tx)?;

        Ok(Accepted {
            country_code: profile.country_code.clone(),
            tax: module.calculate_tax(tx.amount),
            clearance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles;
    use crate::registry::JurisdictionSettings;
    use cryptopay_types::AssetGroup;
    use rust_decimal_macros::dec;

    fn validator() -> TransactionValidator {
        TransactionValidator::new(Arc::new(ComplianceRegistry::standard(
            &JurisdictionSettings::default(),
        )))
    }

    fn customer(tx: Transaction) -> Transaction {
        tx.with_customer(Some("Test Customer".into()), Some("test@example.com".into()))
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let v = validator();
        for amount in [dec!(0), dec!(-5)] {
            let tx = Transaction::new(amount, "SGD", "BTC", "SG");
            assert!(matches!(
                v.validate(&tx),
                Err(ValidationError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn test_unknown_jurisdiction_rejected() {
        let tx = Transaction::new(dec!(10), "JPY", "BTC", "JP");
        assert_eq!(
            validator().validate(&tx).unwrap_err(),
            ValidationError::UnknownJurisdiction("JP".into())
        );
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let tx = Transaction::new(dec!(10), "USD", "BTC", "SG");
        assert!(matches!(
            validator().validate(&tx),
            Err(ValidationError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_unsupported_asset_rejected() {
        let tx = Transaction::new(dec!(10), "LAK", "SOL", "LA");
        assert!(matches!(
            validator().validate(&tx),
            Err(ValidationError::UnsupportedAsset { .. })
        ));
    }

    #[test]
    fn test_daily_limit_is_inclusive() {
        let v = validator();
        let at_limit = customer(Transaction::new(dec!(100000), "SGD", "BTC", "SG"));
        assert!(v.validate(&at_limit).is_ok());

        let over = customer(Transaction::new(dec!(100000.01), "SGD", "BTC", "SG"));
        assert_eq!(
            v.validate(&over).unwrap_err(),
            ValidationError::LimitExceeded {
                amount: dec!(100000.01),
                limit: dec!(100000),
            }
        );
    }

    #[test]
    fn test_kyc_threshold_boundary_every_jurisdiction() {
        let v = validator();
        for p in profiles::all() {
            let crypto = p.supported_cryptocurrencies[0].clone();

            let at = Transaction::new(p.kyc_threshold, &p.currency_code, &crypto, p.country_code.clone());
            assert!(
                matches!(v.validate(&at), Err(ValidationError::KycRequired { .. })),
                "{} at threshold must require KYC",
                p.country_code
            );

            let below = Transaction::new(
                p.kyc_threshold - dec!(1),
                &p.currency_code,
                &crypto,
                p.country_code.clone(),
            );
            assert!(
                v.validate(&below).is_ok(),
                "{} below threshold must not require KYC",
                p.country_code
            );
        }
    }

    #[test]
    fn test_every_supported_asset_accepted_with_kyc() {
        let v = validator();
        for p in profiles::all() {
            for crypto in &p.supported_cryptocurrencies {
                let amount = p.daily_limit - dec!(1);
                let tx = customer(Transaction::new(
                    amount,
                    &p.currency_code,
                    crypto,
                    p.country_code.clone(),
                ));
                let accepted = v
                    .validate(&tx)
                    .unwrap_or_else(|e| panic!("{} {}: {}", p.country_code, crypto, e));
                assert_eq!(accepted.tax, crate::tax::calculate_tax(amount, p.tax_rate));

                let over = customer(Transaction::new(
                    p.daily_limit + dec!(1),
                    &p.currency_code,
                    crypto,
                    p.country_code.clone(),
                ));
                assert!(matches!(
                    v.validate(&over),
                    Err(ValidationError::LimitExceeded { .. })
                ));
            }
        }
    }

    #[test]
    fn test_singapore_1200_without_identity() {
        let tx = Transaction::new(dec!(1200), "SGD", "BTC", "SG")
            .with_customer(Some(String::new()), Some(String::new()));
        assert!(matches!(
            validator().validate(&tx),
            Err(ValidationError::KycRequired { .. })
        ));
    }

    #[test]
    fn test_thailand_payment_purpose_blocked() {
        let tx = customer(Transaction::new(dec!(100), "THB", "BTC", "TH")).with_purpose("payment");
        assert!(matches!(
            validator().validate(&tx),
            Err(ValidationError::RegulatoryBlock(_))
        ));
    }

    #[test]
    fn test_accepted_carries_clearance() {
        let tx = Transaction::new(dec!(100000), "KHR", "USDT", "KH");
        let accepted = validator().validate(&tx).unwrap();
        assert_eq!(accepted.clearance.asset_group, Some(AssetGroup::Group1b));
        assert_eq!(accepted.tax, dec!(20000.00));
    }
}
