//! Database row types for the SQLite archive.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use cryptopay_types::{CountryCode, Payment, PaymentId, PaymentStatus, RepoError};

/// Payment row. Decimals and timestamps are stored as TEXT.
#[derive(FromRow)]
pub struct DbPayment {
    pub id: String,
    pub amount: String,
    pub currency: String,
    pub crypto_amount: String,
    pub crypto_currency: String,
    pub exchange_rate: String,
    pub address: String,
    pub status: String,
    pub country_code: String,
    pub order_id: Option<String>,
    pub tax_amount: String,
    pub travel_rule: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub expires_at: String,
}

fn corrupt(field: &str, e: impl std::fmt::Display) -> RepoError {
    RepoError::Database(format!("invalid {} in payments row: {}", field, e))
}

fn decimal(field: &str, value: &str) -> Result<Decimal, RepoError> {
    Decimal::from_str(value).map_err(|e| corrupt(field, e))
}

fn timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(field, e))
}

impl TryFrom<DbPayment> for Payment {
    type Error = RepoError;

    fn try_from(row: DbPayment) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_str(&row.id).map_err(|e| corrupt("id", e))?,
            amount: decimal("amount", &row.amount)?,
            currency: row.currency,
            crypto_amount: decimal("crypto_amount", &row.crypto_amount)?,
            crypto_currency: row.crypto_currency,
            exchange_rate: decimal("exchange_rate", &row.exchange_rate)?,
            address: row.address,
            status: PaymentStatus::from_str(&row.status).map_err(|e| corrupt("status", e))?,
            country_code: CountryCode::new(&row.country_code),
            order_id: row.order_id,
            tax_amount: decimal("tax_amount", &row.tax_amount)?,
            travel_rule: row.travel_rule,
            created_at: timestamp("created_at", &row.created_at)?,
            updated_at: timestamp("updated_at", &row.updated_at)?,
            expires_at: timestamp("expires_at", &row.expires_at)?,
        })
    }
}

impl From<&Payment> for DbPayment {
    fn from(p: &Payment) -> Self {
        Self {
            id: p.id.to_string(),
            amount: p.amount.to_string(),
            currency: p.currency.clone(),
            crypto_amount: p.crypto_amount.to_string(),
            crypto_currency: p.crypto_currency.clone(),
            exchange_rate: p.exchange_rate.to_string(),
            address: p.address.clone(),
            status: p.status.to_string(),
            country_code: p.country_code.to_string(),
            order_id: p.order_id.clone(),
            tax_amount: p.tax_amount.to_string(),
            travel_rule: p.travel_rule.clone(),
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
            expires_at: p.expires_at.to_rfc3339(),
        }
    }
}
