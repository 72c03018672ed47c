//! In-memory payment archive.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use cryptopay_types::{CountryCode, Payment, PaymentArchive, PaymentId, RepoError, ReportPeriod};

/// Process-lifetime archive used when no database is configured.
#[derive(Default)]
pub struct InMemoryArchive {
    payments: DashMap<PaymentId, Payment>,
    processed_events: DashSet<String>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentArchive for InMemoryArchive {
    async fn save(&self, payment: &Payment) -> Result<(), RepoError> {
        self.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        Ok(self.payments.get(&id).map(|p| p.value().clone()))
    }

    async fn list_between(
        &self,
        country: &CountryCode,
        period: ReportPeriod,
    ) -> Result<Vec<Payment>, RepoError> {
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .filter(|p| &p.country_code == country && period.contains(p.created_at))
            .map(|p| p.value().clone())
            .collect();
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }

    async fn is_event_processed(&self, event_id: &str) -> Result<bool, RepoError> {
        Ok(self.processed_events.contains(event_id))
    }

    async fn mark_event_processed(&self, event_id: &str) -> Result<(), RepoError> {
        self.processed_events.insert(event_id.to_string());
        Ok(())
    }
}
