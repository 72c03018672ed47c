//! Concurrent store of active payments.
//!
//! Each payment is keyed by id; operations on different ids never contend.
//! Status changes go through [`ActivePaymentStore::transition`], which checks
//! and updates the status while holding the entry's shard lock, so two
//! writers racing on the same payment cannot both succeed.

use dashmap::DashMap;

use cryptopay_types::{LifecycleError, Payment, PaymentId, PaymentStatus};

#[derive(Default)]
pub struct ActivePaymentStore {
    payments: DashMap<PaymentId, Payment>,
}

impl ActivePaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, payment: Payment) {
        self.payments.insert(payment.id, payment);
    }

    pub fn get(&self, id: PaymentId) -> Option<Payment> {
        self.payments.get(&id).map(|p| p.value().clone())
    }

    /// Atomically moves the payment to `target` if the state machine allows it.
    ///
    /// Returns the updated payment. The entry stays in the store; the caller
    /// removes it once the terminal state has been archived.
    pub fn transition(&self, id: PaymentId, target: PaymentStatus) -> Result<Payment, LifecycleError> {
        let mut entry = self
            .payments
            .get_mut(&id)
            .ok_or(LifecycleError::NotFound(id))?;
        entry.transition_to(target)?;
        Ok(entry.clone())
    }

    pub fn remove(&self, id: PaymentId) -> Option<Payment> {
        self.payments.remove(&id).map(|(_, p)| p)
    }

    /// Ids of every payment currently held.
    pub fn ids(&self) -> Vec<PaymentId> {
        self.payments.iter().map(|e| *e.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}
