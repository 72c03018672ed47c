use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::payment::{PaymentId, PaymentStatus};

/// Payment lifecycle events carried by webhooks, in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentEventKind {
    Created,
    Completed,
    Cancelled,
    Expired,
}

impl PaymentEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "payment.created",
            Self::Completed => "payment.completed",
            Self::Cancelled => "payment.cancelled",
            Self::Expired => "payment.expired",
        }
    }

    pub fn parse(event: &str) -> Option<Self> {
        match event {
            "payment.created" => Some(Self::Created),
            "payment.completed" => Some(Self::Completed),
            "payment.cancelled" => Some(Self::Cancelled),
            "payment.expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Event announcing that a payment entered `status`.
    pub fn for_status(status: PaymentStatus) -> Option<Self> {
        match status {
            PaymentStatus::Pending => Some(Self::Created),
            PaymentStatus::Completed => Some(Self::Completed),
            PaymentStatus::Cancelled => Some(Self::Cancelled),
            PaymentStatus::Expired => Some(Self::Expired),
            PaymentStatus::Created => None,
        }
    }

    /// Status an inbound event may drive a pending payment to.
    ///
    /// Only completion and cancellation are accepted from the outside;
    /// expiry is decided locally by the poller.
    pub fn inbound_target(&self) -> Option<PaymentStatus> {
        match self {
            Self::Completed => Some(PaymentStatus::Completed),
            Self::Cancelled => Some(PaymentStatus::Cancelled),
            Self::Created | Self::Expired => None,
        }
    }
}

impl std::fmt::Display for PaymentEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire body of a webhook delivery: `{id?, event, timestamp, data}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[schema(example = "payment.completed")]
    pub event: String,
    pub timestamp: DateTime<Utc>,
    /// Payment-shaped object; only `id` is required inbound
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl WebhookPayload {
    /// Payment id referenced by `data.id`, if present and well-formed.
    pub fn payment_id(&self) -> Option<PaymentId> {
        self.data.get("id")?.as_str()?.parse().ok()
    }
}

/// An authenticated inbound webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event id used for idempotency
    pub id: String,
    pub event_type: String,
    pub payload: WebhookPayload,
    pub signature: String,
    pub received_at: DateTime<Utc>,
}

impl WebhookEvent {
    /// Builds an event from a verified payload. `fallback_id` is used when the
    /// sender did not supply one.
    pub fn new(payload: WebhookPayload, signature: impl Into<String>, fallback_id: String) -> Self {
        Self {
            id: payload.id.clone().unwrap_or(fallback_id),
            event_type: payload.event.clone(),
            payload,
            signature: signature.into(),
            received_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> Option<PaymentEventKind> {
        PaymentEventKind::parse(&self.event_type)
    }
}
