//! # Cryptopay Types
//!
//! Domain types and port traits for the crypto payment engine.
//! This crate has ZERO external IO dependencies - only data structures,
//! lifecycle rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (JurisdictionProfile, Transaction, Payment, WebhookEvent,
//!   ComplianceReport)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Validation, auth, lifecycle and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    AssetGroup, AssetGroupTable, ComplianceReport, CountryCode, JurisdictionProfile,
    KycRequirements, Limits, Payment, PaymentEventKind, PaymentId, PaymentStatus, ReportCadence,
    ReportPeriod, ReportScope, ReportSpec, Transaction, WebhookEvent, WebhookPayload,
};
pub use dto::*;
pub use error::{AppError, AuthError, LifecycleError, RepoError, ValidationError};
pub use ports::{
    LedgerError, LedgerService, LedgerStatus, Notifier, PaymentArchive, PaymentEvent, Quote,
    RateError, RateOracle,
};
