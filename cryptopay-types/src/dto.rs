//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AssetGroup, ComplianceReport, CountryCode, JurisdictionProfile, KycRequirements, Payment,
    PaymentId, PaymentStatus, ReportPeriod, Transaction,
};

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a new payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// Fiat amount in major units
    #[schema(value_type = String, example = "1200.00")]
    pub amount: Decimal,
    /// Fiat currency, must match the jurisdiction's currency
    #[schema(example = "SGD")]
    pub currency: String,
    #[schema(example = "BTC")]
    pub crypto_currency: String,
    #[schema(value_type = String, example = "SG")]
    pub country_code: CountryCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Alice Tan")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "alice@example.com")]
    pub customer_email: Option<String>,
    /// Merchant's own order reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Declared purpose of the transfer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "investment")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_address: Option<String>,
}

impl CreatePaymentRequest {
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
            order_id: None,
            purpose: None,
            source_address: None,
        }
    }

    pub fn with_customer(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self.customer_email = Some(email.into());
        self
    }

    /// Builds the transaction submitted to compliance review.
    pub fn to_transaction(&self) -> Transaction {
        let mut tx = Transaction::new(
            self.amount,
            self.currency.trim(),
            self.crypto_currency.trim(),
            self.country_code.clone(),
        )
        .with_customer(self.customer_name.clone(), self.customer_email.clone());
        tx.purpose = self.purpose.clone();
        tx.source_address = self.source_address.clone();
        tx
    }
}

/// Response after creating a payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentCreatedResponse {
    pub payment_id: PaymentId,
    /// Address the customer sends the crypto amount to
    pub address: String,
    #[schema(value_type = String, example = "0.00921450")]
    pub crypto_amount: Decimal,
    pub expires_at: DateTime<Utc>,
    pub status: PaymentStatus,
}

impl From<&Payment> for PaymentCreatedResponse {
    fn from(p: &Payment) -> Self {
        Self {
            payment_id: p.id,
            address: p.address.clone(),
            crypto_amount: p.crypto_amount,
            expires_at: p.expires_at,
            status: p.status,
        }
    }
}

/// Full view of a payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: PaymentId,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub currency: String,
    #[schema(value_type = String)]
    pub crypto_amount: Decimal,
    pub crypto_currency: String,
    #[schema(value_type = String)]
    pub exchange_rate: Decimal,
    pub address: String,
    pub status: PaymentStatus,
    #[schema(value_type = String)]
    pub country_code: CountryCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[schema(value_type = String)]
    pub tax_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentResponse {
    fn from(p: &Payment) -> Self {
        Self {
            id: p.id,
            amount: p.amount,
            currency: p.currency.clone(),
            crypto_amount: p.crypto_amount,
            crypto_currency: p.crypto_currency.clone(),
            exchange_rate: p.exchange_rate,
            address: p.address.clone(),
            status: p.status,
            country_code: p.country_code.clone(),
            order_id: p.order_id.clone(),
            tax_amount: p.tax_amount,
            created_at: p.created_at,
            updated_at: p.updated_at,
            expires_at: p.expires_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Jurisdiction DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Public regulatory parameters of a jurisdiction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JurisdictionResponse {
    #[schema(value_type = String, example = "SG")]
    pub country_code: CountryCode,
    #[schema(example = "Singapore")]
    pub country_name: String,
    pub currency_code: String,
    pub regulators: Vec<String>,
    #[schema(value_type = String)]
    pub kyc_threshold: Decimal,
    #[schema(value_type = String)]
    pub daily_limit: Decimal,
    #[schema(value_type = String)]
    pub monthly_limit: Decimal,
    pub supported_cryptocurrencies: Vec<String>,
    #[schema(value_type = String, example = "0.08")]
    pub tax_rate: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub travel_rule_threshold: Option<Decimal>,
    pub kyc_requirements: KycRequirements,
    /// Regulator-mandated notice shown to customers, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl JurisdictionResponse {
    pub fn new(profile: &JurisdictionProfile, notice: Option<String>) -> Self {
        Self {
            country_code: profile.country_code.clone(),
            country_name: profile.country_name.clone(),
            currency_code: profile.currency_code.clone(),
            regulators: profile.regulators.clone(),
            kyc_threshold: profile.kyc_threshold,
            daily_limit: profile.daily_limit,
            monthly_limit: profile.monthly_limit,
            supported_cryptocurrencies: profile.supported_cryptocurrencies.clone(),
            tax_rate: profile.tax_rate,
            travel_rule_threshold: profile.travel_rule_threshold,
            kyc_requirements: profile.kyc_requirements.clone(),
            notice,
        }
    }
}

/// Asset classification result exposed by jurisdictions that group assets.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetClassResponse {
    pub asset: String,
    pub group: AssetGroup,
}

/// Reporting window, RFC 3339 timestamps. `to` is exclusive.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    #[param(value_type = String, example = "2025-03-01T00:00:00Z")]
    pub from: DateTime<Utc>,
    #[param(value_type = String, example = "2025-04-01T00:00:00Z")]
    pub to: DateTime<Utc>,
}

/// Regulatory reports of one jurisdiction over a period.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportsResponse {
    #[schema(example = "TH")]
    pub jurisdiction: String,
    pub period: ReportPeriod,
    pub reports: Vec<ComplianceReport>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Exchange rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExchangeRateQuery {
    /// Fiat currency code
    pub fiat: String,
    /// Cryptocurrency symbol
    pub crypto: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRateResponse {
    pub fiat: String,
    pub crypto: String,
    /// Crypto units per one unit of fiat
    #[schema(value_type = String, example = "0.00000768")]
    pub rate: Decimal,
    /// When the oracle produced the rate
    pub timestamp: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhook & error DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Acknowledgement returned for every authenticated webhook event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub event_id: String,
    /// Whether the event changed a payment's state
    pub applied: bool,
}

/// Error envelope: `{"error": {"code", "message"}}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "compliance_error")]
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_request_accepts_numeric_or_string_amount() {
        let numeric: CreatePaymentRequest = serde_json::from_value(serde_json::json!({
            "amount": 1200,
            "currency": "SGD",
            "crypto_currency": "BTC",
            "country_code": "sg"
        }))
        .unwrap();
        assert_eq!(numeric.amount, dec!(1200));
        assert_eq!(numeric.country_code.as_str(), "SG");

        let string: CreatePaymentRequest = serde_json::from_value(serde_json::json!({
            "amount": "99.50",
            "currency": "SGD",
            "crypto_currency": "BTC",
            "country_code": "SG"
        }))
        .unwrap();
        assert_eq!(string.amount, dec!(99.50));
    }

    #[test]
    fn test_error_envelope_shape() {
        let json = serde_json::to_value(ErrorResponse::new("invalid_request", "bad")).unwrap();
        assert_eq!(json["error"]["code"], "invalid_request");
        assert_eq!(json["error"]["message"], "bad");
    }
}
