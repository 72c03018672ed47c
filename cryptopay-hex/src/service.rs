//! Payment Application Service
//!
//! Orchestrates compliance review, the payment lifecycle and the outbound
//! ports. Contains NO infrastructure logic - pure business orchestration.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info, instrument, warn};

use cryptopay_compliance::{ComplianceRegistry, TransactionValidator, TravelRuleRecord};
use cryptopay_repo::security::{DataSealer, SignedHeaders};
use cryptopay_types::{
    AppError, AssetClassResponse, CreatePaymentRequest, ExchangeRateResponse,
    JurisdictionResponse, LedgerService, Notifier, Payment, PaymentArchive,
    PaymentCreatedResponse, PaymentId, PaymentStatus, RateError, RateOracle, ReportPeriod,
    ReportsResponse, WebhookAck,
};

use crate::lifecycle::PaymentLifecycle;
use crate::poller::StatusPoller;
use crate::webhook::WebhookAuthenticator;

/// Decimal places kept on the quoted crypto amount.
const CRYPTO_SCALE: u32 = 8;

/// Adapters the service is wired to.
pub struct ServicePorts {
    pub registry: Arc<ComplianceRegistry>,
    pub ledger: Arc<dyn LedgerService>,
    pub rates: Arc<dyn RateOracle>,
    pub archive: Arc<dyn PaymentArchive>,
    pub notifier: Arc<dyn Notifier>,
}

/// Tunables of the payment engine.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub payment_ttl: Duration,
    pub poll_interval: Duration,
    pub required_confirmations: u32,
    pub webhook_secret: String,
    pub signature_tolerance: Duration,
    pub nonce_retention: Duration,
    /// Merchant endpoint receiving payment notifications
    pub callback_url: Option<String>,
    pub data_encryption_key: String,
    /// Merchant named as beneficiary in travel-rule records
    pub merchant_id: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            payment_ttl: Duration::from_secs(60 * 60),
            poll_interval: Duration::from_secs(5),
            required_confirmations: 1,
            webhook_secret: String::new(),
            signature_tolerance: Duration::from_secs(300),
            nonce_retention: Duration::from_secs(600),
            callback_url: None,
            data_encryption_key: String::new(),
            merchant_id: None,
        }
    }
}

/// Application service for payment operations.
pub struct PaymentService {
    validator: TransactionValidator,
    lifecycle: Arc<PaymentLifecycle>,
    poller: StatusPoller,
    webhooks: WebhookAuthenticator,
    ledger: Arc<dyn LedgerService>,
    rates: Arc<dyn RateOracle>,
    sealer: DataSealer,
    merchant_id: Option<String>,
    payment_ttl: chrono::Duration,
    /// Milliseconds since epoch of the last accepted payment, 0 when none
    last_activity_ms: AtomicI64,
}

impl PaymentService {
    pub fn new(ports: ServicePorts, settings: ServiceSettings) -> Self {
        let lifecycle = Arc::new(PaymentLifecycle::new(
            ports.archive,
            ports.notifier,
            settings.callback_url.clone(),
        ));
        let poller = StatusPoller::new(
            lifecycle.clone(),
            ports.ledger.clone(),
            settings.poll_interval,
            settings.required_confirmations,
        );

        Self {
            validator: TransactionValidator::new(ports.registry),
            lifecycle,
            poller,
            webhooks: WebhookAuthenticator::new(
                settings.webhook_secret,
                settings.signature_tolerance,
                settings.nonce_retention,
            ),
            ledger: ports.ledger,
            rates: ports.rates,
            sealer: DataSealer::new(&settings.data_encryption_key),
            merchant_id: settings.merchant_id,
            payment_ttl: chrono::Duration::from_std(settings.payment_ttl)
                .unwrap_or_else(|_| chrono::Duration::minutes(60)),
            last_activity_ms: AtomicI64::new(0),
        }
    }

    pub fn registry(&self) -> &ComplianceRegistry {
        self.validator.registry()
    }

    /// Number of payments still awaiting a terminal state.
    pub fn active_payments(&self) -> usize {
        self.lifecycle.active_count()
    }

    /// Number of running status pollers.
    pub fn active_pollers(&self) -> usize {
        self.poller.active()
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        match self.last_activity_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Utc.timestamp_millis_opt(ms).single(),
        }
    }

    /// Overrides the merchant's last recorded activity.
    pub fn record_activity(&self, at: DateTime<Utc>) {
        self.last_activity_ms
            .store(at.timestamp_millis(), Ordering::Relaxed);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Reviews the request, quotes it and opens a pending payment.
    ///
    /// A compliance rejection returns before any port is called.
    #[instrument(skip(self, req), fields(country = %req.country_code, currency = %req.currency, crypto = %req.crypto_currency))]
    pub async fn create_payment(
        &self,
        req: CreatePaymentRequest,
    ) -> Result<PaymentCreatedResponse, AppError> {
        let mut tx = req.to_transaction();
        tx.merchant_last_active = self.last_activity();

        let accepted = self.validator.validate(&tx)?;

        let quote = self
            .rates
            .get_rate(&tx.currency, &tx.crypto_currency)
            .await
            .map_err(|e| match e {
                RateError::RateNotAvailable { .. } => AppError::Upstream(e.to_string()),
                other => other.into(),
            })?;
        let address = self
            .ledger
            .generate_payment_address(&tx.crypto_currency)
            .await?;

        let crypto_amount = (tx.amount * quote.rate).round_dp(CRYPTO_SCALE).normalize();
        let mut payment = Payment::new(
            tx.amount,
            tx.currency.clone(),
            tx.crypto_currency.clone(),
            accepted.country_code,
            accepted.tax,
            self.payment_ttl,
        )
        .with_order_id(req.order_id);
        payment.assign(address.clone(), crypto_amount, quote.rate)?;

        if let Some(record) = accepted.clearance.travel_rule {
            let record = record.with_beneficiary(self.merchant_id.clone(), address.clone());
            payment.travel_rule = Some(self.seal_travel_rule(&record)?);
        }

        let response = PaymentCreatedResponse::from(&payment);
        let id = payment.id;
        self.lifecycle.register(payment);
        self.poller.watch(id, address);
        self.record_activity(Utc::now());

        info!(payment_id = %id, crypto_amount = %crypto_amount, "Payment created");
        Ok(response)
    }

    /// Gets a payment by ID, active or archived.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.lifecycle
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment {}", id)))
    }

    /// Cancels a pending payment.
    ///
    /// Cancelling a payment that already reached a terminal state returns it
    /// unchanged.
    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn cancel_payment(&self, id: PaymentId) -> Result<Payment, AppError> {
        match self.lifecycle.finish(id, PaymentStatus::Cancelled).await {
            Ok(payment) => {
                self.poller.stop(id);
                Ok(payment)
            }
            Err(e) => {
                let current = self.get_payment(id).await?;
                if current.status.is_terminal() {
                    debug!(status = %current.status, "Payment already finished");
                    Ok(current)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Webhooks
    // ─────────────────────────────────────────────────────────────────────────────

    /// Processes a signed webhook delivery.
    ///
    /// Authentication failures are returned as `Unauthorized`. Events that
    /// were already processed, carry no inbound transition, or lose the race
    /// against another writer are acknowledged with `applied: false`.
    #[instrument(skip(self, headers, body), fields(nonce = %headers.nonce))]
    pub async fn handle_webhook(
        &self,
        headers: &SignedHeaders,
        body: &[u8],
    ) -> Result<WebhookAck, AppError> {
        let event = self.webhooks.authenticate(headers, body)?;
        let archive = self.lifecycle.archive();

        if archive.is_event_processed(&event.id).await? {
            debug!(event_id = %event.id, "Duplicate webhook event");
            return Ok(WebhookAck {
                event_id: event.id,
                applied: false,
            });
        }

        let Some(target) = event.kind().and_then(|k| k.inbound_target()) else {
            info!(event_id = %event.id, event = %event.event_type, "Ignoring webhook event");
            archive.mark_event_processed(&event.id).await?;
            return Ok(WebhookAck {
                event_id: event.id,
                applied: false,
            });
        };

        let id = event
            .payload
            .payment_id()
            .ok_or_else(|| AppError::BadRequest("Webhook data.id is not a payment id".into()))?;

        let applied = match self.lifecycle.finish(id, target).await {
            Ok(_) => {
                self.poller.stop(id);
                true
            }
            Err(e) => {
                warn!(event_id = %event.id, payment_id = %id, "Dropped webhook event: {}", e);
                false
            }
        };

        archive.mark_event_processed(&event.id).await?;
        Ok(WebhookAck {
            event_id: event.id,
            applied,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reference data
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn jurisdiction(&self, code: &str) -> Result<JurisdictionResponse, AppError> {
        let module = self.registry().get(code)?;
        Ok(JurisdictionResponse::new(module.profile(), module.notice()))
    }

    /// Asset group of `asset` in a jurisdiction that groups assets.
    pub fn classify_asset(&self, code: &str, asset: &str) -> Result<AssetClassResponse, AppError> {
        let module = self.registry().get(code)?;
        let asset = asset.trim().to_uppercase();
        match module.classify(&asset)? {
            Some(group) => Ok(AssetClassResponse { asset, group }),
            None => Err(AppError::NotFound(format!(
                "Jurisdiction {} does not group assets",
                module.profile().country_code
            ))),
        }
    }

    /// Regulatory reports of a jurisdiction over `[from, to)`.
    ///
    /// Built from archived payments, so payments still pending are not
    /// counted.
    #[instrument(skip(self))]
    pub async fn reports(
        &self,
        code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ReportsResponse, AppError> {
        let module = self.registry().get(code)?;
        let period = ReportPeriod::new(from, to)
            .ok_or_else(|| AppError::BadRequest("Report period must end after it starts".into()))?;

        let country = &module.profile().country_code;
        let payments = self.lifecycle.archive().list_between(country, period).await?;
        debug!(payments = payments.len(), "Building reports");

        Ok(ReportsResponse {
            jurisdiction: country.to_string(),
            period,
            reports: module.reports(period, &payments),
        })
    }

    pub async fn exchange_rate(
        &self,
        fiat: &str,
        crypto: &str,
    ) -> Result<ExchangeRateResponse, AppError> {
        let quote = self.rates.get_rate(fiat, crypto).await?;
        Ok(ExchangeRateResponse {
            fiat: fiat.trim().to_uppercase(),
            crypto: crypto.trim().to_uppercase(),
            rate: quote.rate,
            timestamp: quote.timestamp,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Housekeeping
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn purge_expired_nonces(&self) {
        self.webhooks.purge_expired_nonces();
    }

    /// Stops every status poller.
    pub fn shutdown(&self) {
        info!(active = self.poller.active(), "Stopping status pollers");
        self.poller.stop_all();
    }

    fn seal_travel_rule(&self, record: &TravelRuleRecord) -> Result<String, AppError> {
        let plaintext =
            serde_json::to_vec(record).map_err(|e| AppError::Internal(e.to_string()))?;
        self.sealer
            .seal(&plaintext)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Decrypts the travel-rule record attached to a payment.
    pub fn open_travel_rule(&self, payment: &Payment) -> Result<Option<TravelRuleRecord>, AppError> {
        let Some(sealed) = payment.travel_rule.as_deref() else {
            return Ok(None);
        };
        let plaintext = self
            .sealer
            .open(sealed)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        serde_json::from_slice(&plaintext)
            .map(Some)
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}
