//! Payment archive port.
//!
//! Durable storage for payments that reached a terminal state, plus the
//! processed-event ledger used for webhook idempotency.
//! Adapters (in-memory, SQLite) implement this trait.

use crate::domain::{CountryCode, Payment, PaymentId, ReportPeriod};
use crate::error::RepoError;

#[async_trait::async_trait]
pub trait PaymentArchive: Send + Sync + 'static {
    /// Stores a payment, replacing any previous version with the same id.
    async fn save(&self, payment: &Payment) -> Result<(), RepoError>;

    /// Gets an archived payment by id.
    async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Archived payments of `country` created within `period`, oldest first.
    async fn list_between(
        &self,
        country: &CountryCode,
        period: ReportPeriod,
    ) -> Result<Vec<Payment>, RepoError>;

    /// Returns true if the webhook event id was already processed.
    async fn is_event_processed(&self, event_id: &str) -> Result<bool, RepoError>;

    /// Records a webhook event id as processed.
    async fn mark_event_processed(&self, event_id: &str) -> Result<(), RepoError>;
}
