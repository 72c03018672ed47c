//! Status poller.
//!
//! One periodic task per active payment asks the ledger for confirmations
//! and checks expiry. A task ends as soon as its payment is terminal, when
//! it is stopped explicitly, or when the poller is dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

use cryptopay_types::{LedgerService, Payment, PaymentId, PaymentStatus};

use crate::lifecycle::PaymentLifecycle;

pub struct StatusPoller {
    lifecycle: Arc<PaymentLifecycle>,
    ledger: Arc<dyn LedgerService>,
    interval: Duration,
    required_confirmations: u32,
    tasks: Arc<DashMap<PaymentId, AbortHandle>>,
}

impl StatusPoller {
    pub fn new(
        lifecycle: Arc<PaymentLifecycle>,
        ledger: Arc<dyn LedgerService>,
        interval: Duration,
        required_confirmations: u32,
    ) -> Self {
        Self {
            lifecycle,
            ledger,
            interval: interval.max(Duration::from_millis(1)),
            required_confirmations,
            tasks: Arc::new(DashMap::new()),
        }
    }

    /// Starts polling a pending payment. Must be called within a Tokio runtime.
    pub fn watch(&self, id: PaymentId, address: String) {
        let job = PollJob {
            lifecycle: self.lifecycle.clone(),
            ledger: self.ledger.clone(),
            interval: self.interval,
            required_confirmations: self.required_confirmations,
            tasks: self.tasks.clone(),
            id,
            address,
        };

        // Hold the entry while spawning so the task cannot deregister first.
        let entry = self.tasks.entry(id);
        let handle = tokio::spawn(job.run());
        entry.insert(handle.abort_handle());
    }

    /// Stops polling a payment, if it is being polled.
    pub fn stop(&self, id: PaymentId) {
        if let Some((_, handle)) = self.tasks.remove(&id) {
            handle.abort();
        }
    }

    pub fn stop_all(&self) {
        self.tasks.retain(|_, handle| {
            handle.abort();
            false
        });
    }

    /// Number of payments currently being polled.
    pub fn active(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop_all();
    }
}

struct PollJob {
    lifecycle: Arc<PaymentLifecycle>,
    ledger: Arc<dyn LedgerService>,
    interval: Duration,
    required_confirmations: u32,
    tasks: Arc<DashMap<PaymentId, AbortHandle>>,
    id: PaymentId,
    address: String,
}

impl PollJob {
    #[instrument(skip(self), fields(payment_id = %self.id))]
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let Some(payment) = self.lifecycle.active(self.id) else {
                break;
            };
            if payment.status.is_terminal() {
                break;
            }
            if let Some(target) = self.check(&payment).await {
                match self.lifecycle.finish(self.id, target).await {
                    Ok(_) => debug!(status = %target, "Poller finished payment"),
                    Err(e) => debug!("Payment already finished elsewhere: {}", e),
                }
                break;
            }
        }

        self.tasks.remove(&self.id);
    }

    /// Terminal state the payment should move to, if any.
    async fn check(&self, payment: &Payment) -> Option<PaymentStatus> {
        match self.ledger.get_status(&self.address).await {
            Ok(status) if status.is_confirmed(self.required_confirmations) => {
                return Some(PaymentStatus::Completed);
            }
            Ok(_) => {}
            Err(e) => warn!(address = %self.address, "Ledger status check failed: {}", e),
        }

        payment
            .is_expired_at(Utc::now())
            .then_some(PaymentStatus::Expired)
    }
}
