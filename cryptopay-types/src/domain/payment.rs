//! Payment domain model and its state machine.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::jurisdiction::CountryCode;
use crate::error::LifecycleError;

/// Unique identifier for a Payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new random PaymentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PaymentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle state of a payment.
///
/// ```text
/// Created -> Pending -> Completed | Cancelled | Expired
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Validated, awaiting an address and crypto amount
    Created,
    /// Waiting for the customer's transfer to confirm
    Pending,
    Completed,
    Cancelled,
    Expired,
}

impl PaymentStatus {
    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Completed | PaymentStatus::Cancelled | PaymentStatus::Expired
        )
    }

    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match self {
            PaymentStatus::Created => next == PaymentStatus::Pending,
            PaymentStatus::Pending => next.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Created => "created",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(PaymentStatus::Created),
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            "expired" => Ok(PaymentStatus::Expired),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

/// A cryptocurrency payment accepted by compliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Fiat amount in major units
    pub amount: Decimal,
    pub currency: String,
    pub crypto_amount: Decimal,
    pub crypto_currency: String,
    /// Crypto units per one unit of fiat
    pub exchange_rate: Decimal,
    /// Ledger address the customer pays into (empty until assigned)
    pub address: String,
    pub status: PaymentStatus,
    pub country_code: CountryCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub tax_amount: Decimal,
    /// Sealed travel-rule record, when the jurisdiction requires one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_rule: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a payment in the `Created` state.
    pub fn new(
        amount: Decimal,
        currency: impl Into<String>,
        crypto_currency: impl Into<String>,
        country_code: CountryCode,
        tax_amount: Decimal,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            amount,
            currency: currency.into(),
            crypto_amount: Decimal::ZERO,
            crypto_currency: crypto_currency.into(),
            exchange_rate: Decimal::ZERO,
            address: String::new(),
            status: PaymentStatus::Created,
            country_code,
            order_id: None,
            tax_amount,
            travel_rule: None,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn with_order_id(mut self, order_id: Option<String>) -> Self {
        self.order_id = order_id;
        self
    }

    /// Assigns the ledger address and quoted amount, moving `Created -> Pending`.
    pub fn assign(
        &mut self,
        address: impl Into<String>,
        crypto_amount: Decimal,
        exchange_rate: Decimal,
    ) -> Result<(), LifecycleError> {
        self.transition_to(PaymentStatus::Pending)?;
        self.address = address.into();
        self.crypto_amount = crypto_amount;
        self.exchange_rate = exchange_rate;
        Ok(())
    }

    /// Applies a state transition, rejecting anything the state machine forbids.
    pub fn transition_to(&mut self, next: PaymentStatus) -> Result<(), LifecycleError> {
        if !self.status.can_transition_to(next) {
            return Err(LifecycleError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// A payment expires strictly after `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
