//! Outbound notification port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Payment, PaymentEventKind};

/// A payment lifecycle notification, serialized as `{id, event, timestamp, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: String,
    pub event: String,
    pub timestamp: DateTime<Utc>,
    pub data: Payment,
}

impl PaymentEvent {
    pub fn new(kind: PaymentEventKind, payment: Payment) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event: kind.as_str().to_string(),
            timestamp: Utc::now(),
            data: payment,
        }
    }
}

/// Port trait for notification delivery.
///
/// Sending is fire-and-forget: implementations must not block the caller
/// on delivery and report failures through logs only.
pub trait Notifier: Send + Sync + 'static {
    fn send(&self, event: PaymentEvent, recipient: Option<&str>);
}
