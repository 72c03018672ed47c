//! Payment lifecycle.
//!
//! Owns every payment's status. Active payments live in the concurrent
//! store; a terminal transition is decided there by compare-and-set, then
//! the payment is archived, removed from the store and announced.

use std::sync::Arc;

use tracing::{error, info};

use cryptopay_repo::ActivePaymentStore;
use cryptopay_types::{
    LifecycleError, Notifier, Payment, PaymentArchive, PaymentEvent, PaymentEventKind, PaymentId,
    PaymentStatus, RepoError,
};

pub struct PaymentLifecycle {
    store: ActivePaymentStore,
    archive: Arc<dyn PaymentArchive>,
    notifier: Arc<dyn Notifier>,
    callback_url: Option<String>,
}

impl PaymentLifecycle {
    pub fn new(
        archive: Arc<dyn PaymentArchive>,
        notifier: Arc<dyn Notifier>,
        callback_url: Option<String>,
    ) -> Self {
        Self {
            store: ActivePaymentStore::new(),
            archive,
            notifier,
            callback_url,
        }
    }

    pub fn archive(&self) -> &dyn PaymentArchive {
        self.archive.as_ref()
    }

    /// Starts tracking a pending payment and announces it.
    pub fn register(&self, payment: Payment) {
        let kind = PaymentEventKind::for_status(payment.status);
        self.store.insert(payment.clone());
        if let Some(kind) = kind {
            self.announce(kind, payment);
        }
    }

    /// Snapshot of an active payment.
    pub fn active(&self, id: PaymentId) -> Option<Payment> {
        self.store.get(id)
    }

    pub fn active_count(&self) -> usize {
        self.store.len()
    }

    /// Looks a payment up in the active store, then in the archive.
    pub async fn find(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        if let Some(payment) = self.store.get(id) {
            return Ok(Some(payment));
        }
        self.archive.get(id).await
    }

    /// Moves an active payment to a terminal state.
    ///
    /// Exactly one caller wins for a given payment; every other caller gets
    /// `InvalidTransition` (or `NotFound` once the winner removed it) and must
    /// treat that as a lost race.
    pub async fn finish(
        &self,
        id: PaymentId,
        target: PaymentStatus,
    ) -> Result<Payment, LifecycleError> {
        let payment = self.store.transition(id, target)?;

        match self.archive.save(&payment).await {
            Ok(()) => {
                self.store.remove(id);
            }
            Err(e) => {
                // Keep the terminal payment readable from the store.
                error!(payment_id = %id, "Failed to archive payment: {}", e);
            }
        }

        info!(payment_id = %id, status = %payment.status, "Payment finished");
        if let Some(kind) = PaymentEventKind::for_status(payment.status) {
            self.announce(kind, payment.clone());
        }
        Ok(payment)
    }

    fn announce(&self, kind: PaymentEventKind, payment: Payment) {
        self.notifier
            .send(PaymentEvent::new(kind, payment), self.callback_url.as_deref());
    }
}
