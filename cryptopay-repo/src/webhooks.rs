//! Outbound payment notifications.
//!
//! [`WebhookDispatcher`] queues events and a background worker POSTs them,
//! signed, to the merchant callback URL. Delivery is fire-and-forget: failures
//! are logged and never reported back to the caller.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use cryptopay_types::{Notifier, PaymentEvent};

use crate::security::RequestSigner;

const QUEUE_CAPACITY: usize = 1024;
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

struct Delivery {
    event: PaymentEvent,
    recipient: Option<String>,
}

/// Queues payment events for signed HTTP delivery.
pub struct WebhookDispatcher {
    tx: mpsc::Sender<Delivery>,
}

impl WebhookDispatcher {
    /// Starts the delivery worker. Must be called within a Tokio runtime.
    ///
    /// Events sent without an explicit recipient go to `default_url`; when
    /// neither is set the event is dropped.
    pub fn spawn(
        client: reqwest::Client,
        default_url: Option<String>,
        signer: RequestSigner,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let worker = WebhookWorker {
            rx,
            client,
            default_url,
            signer,
        };
        let handle = tokio::spawn(worker.run());
        (Self { tx }, handle)
    }
}

impl Notifier for WebhookDispatcher {
    fn send(&self, event: PaymentEvent, recipient: Option<&str>) {
        let event_id = event.id.clone();
        let delivery = Delivery {
            event,
            recipient: recipient.map(str::to_string),
        };
        if let Err(e) = self.tx.try_send(delivery) {
            warn!(event_id = %event_id, "dropping webhook event: {}", e);
        }
    }
}

struct WebhookWorker {
    rx: mpsc::Receiver<Delivery>,
    client: reqwest::Client,
    default_url: Option<String>,
    signer: RequestSigner,
}

impl WebhookWorker {
    #[instrument(skip(self))]
    async fn run(mut self) {
        info!("Starting webhook worker");
        while let Some(delivery) = self.rx.recv().await {
            self.deliver(delivery).await;
        }
        info!("Webhook worker stopped");
    }

    #[instrument(skip(self, delivery), fields(event_id = %delivery.event.id, event = %delivery.event.event))]
    async fn deliver(&self, delivery: Delivery) {
        let Some(url) = delivery.recipient.or_else(|| self.default_url.clone()) else {
            debug!("No callback URL configured, skipping delivery");
            return;
        };

        let body = match serde_json::to_vec(&delivery.event) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to serialize webhook event: {}", e);
                return;
            }
        };

        let headers = self.signer.sign(&body);
        let mut request = self
            .client
            .post(&url)
            .timeout(DELIVERY_TIMEOUT)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        for (name, value) in headers.pairs() {
            request = request.header(name, value);
        }

        match request.body(body).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(url = %url, "Webhook delivered");
            }
            Ok(resp) => {
                warn!(url = %url, status = %resp.status(), "Webhook rejected by receiver");
            }
            Err(e) => {
                warn!(url = %url, "Webhook delivery failed: {}", e);
            }
        }
    }
}

/// Notifier that only logs events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send(&self, event: PaymentEvent, recipient: Option<&str>) {
        info!(
            event_id = %event.id,
            event = %event.event,
            payment_id = %event.data.id,
            status = %event.data.status,
            recipient = recipient.unwrap_or("-"),
            "payment notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{SignatureVerifier, SignedHeaders};
    use axum::Router;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use chrono::Duration as ChronoDuration;
    use cryptopay_types::{CountryCode, Payment, PaymentEventKind};
    use rust_decimal_macros::dec;

    fn payment() -> Payment {
        Payment::new(
            dec!(100),
            "THB",
            "BTC",
            CountryCode::new("TH"),
            dec!(15),
            ChronoDuration::minutes(60),
        )
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn test_dispatcher_signs_deliveries() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<(HeaderMap, Bytes)>();
        let app = Router::new().route(
            "/hook",
            post(move |headers: HeaderMap, body: Bytes| {
                let seen_tx = seen_tx.clone();
                async move {
                    let _ = seen_tx.send((headers, body));
                    StatusCode::OK
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let (dispatcher, _worker) = WebhookDispatcher::spawn(
            client(),
            Some(format!("http://{}/hook", addr)),
            RequestSigner::new("whsec_merchant"),
        );
        dispatcher.send(
            PaymentEvent::new(PaymentEventKind::Completed, payment()),
            None,
        );

        let (headers, body) = tokio::time::timeout(Duration::from_secs(5), seen_rx.recv())
            .await
            .unwrap()
            .unwrap();

        let signed =
            SignedHeaders::from_lookup(|name| headers.get(name).and_then(|v| v.to_str().ok()))
                .unwrap();
        let verifier = SignatureVerifier::new(
            "whsec_merchant",
            Duration::from_secs(300),
            Duration::from_secs(600),
        );
        assert!(verifier.verify(&signed, &body).is_ok());

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["event"], "payment.completed");
        assert_eq!(json["data"]["currency"], "THB");
    }

    #[tokio::test]
    async fn test_dispatcher_without_url_drops_event() {
        let (dispatcher, worker) = WebhookDispatcher::spawn(client(), None, RequestSigner::new("s"));
        dispatcher.send(PaymentEvent::new(PaymentEventKind::Created, payment()), None);
        drop(dispatcher);
        tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .unwrap()
            .unwrap();
    }
}
