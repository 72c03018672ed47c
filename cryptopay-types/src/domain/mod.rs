//! Domain models for the payment engine.

pub mod jurisdiction;
pub mod payment;
pub mod report;
pub mod transaction;
pub mod webhook;

pub use jurisdiction::{
    AssetGroup, AssetGroupTable, CountryCode, JurisdictionProfile, KycRequirements, Limits,
};
pub use payment::{Payment, PaymentId, PaymentStatus};
pub use report::{ComplianceReport, ReportCadence, ReportPeriod, ReportScope, ReportSpec};
pub use transaction::Transaction;
pub use webhook::{PaymentEventKind, WebhookEvent, WebhookPayload};
