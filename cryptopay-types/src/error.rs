//! Error types for the payment engine.

use rust_decimal::Decimal;

use crate::domain::{PaymentId, PaymentStatus};
use crate::ports::{LedgerError, RateError};

/// Compliance and request validation failures.
///
/// Any of these returned while creating a payment is terminal for that call:
/// no payment exists and nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cryptocurrency {asset} is not supported in {country}")]
    UnsupportedAsset { asset: String, country: String },

    #[error("Amount {amount} exceeds the daily limit of {limit}")]
    LimitExceeded { amount: Decimal, limit: Decimal },

    #[error("KYC information ({missing}) required for payments of {threshold} {currency} or more")]
    KycRequired {
        threshold: Decimal,
        currency: String,
        missing: String,
    },

    #[error("Regulatory block: {0}")]
    RegulatoryBlock(String),

    #[error("Unknown jurisdiction: {0}")]
    UnknownJurisdiction(String),
}

/// Signature authentication failures for signed requests and webhook events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Timestamp outside tolerance window (skew {skew_secs}s)")]
    Stale { skew_secs: i64 },

    #[error("Nonce has already been used")]
    ReplayedNonce,

    #[error("Missing header: {0}")]
    MissingHeader(&'static str),
}

/// Payment state machine failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Invalid transition for payment {id}: {from} -> {to}")]
    InvalidTransition {
        id: PaymentId,
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("Payment not found: {0}")]
    NotFound(PaymentId),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes and the `error.code` field of the API.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Compliance(ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code returned to API callers.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "invalid_request",
            AppError::Compliance(_) => "compliance_error",
            AppError::NotFound(_) => "resource_not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Conflict(_) => "conflict",
            AppError::Upstream(_) => "upstream_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidRequest(msg) => AppError::BadRequest(msg),
            // Misconfiguration, never retried.
            ValidationError::UnknownJurisdiction(code) => {
                AppError::NotFound(format!("Jurisdiction {}", code))
            }
            other => AppError::Compliance(other),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotFound(id) => AppError::NotFound(format!("Payment {}", id)),
            e @ LifecycleError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::Conflict(e),
        }
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        match err {
            e @ RateError::RateNotAvailable { .. } => AppError::NotFound(e.to_string()),
            RateError::ServiceUnavailable(e) => AppError::Upstream(e),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError::Upstream(err.to_string())
    }
}
