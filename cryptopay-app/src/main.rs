//! # Cryptopay Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the compliance registry and outbound adapters
//! - Create the payment service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cryptopay_compliance::ComplianceRegistry;
use cryptopay_hex::inbound::{HttpServer, ServerSettings};
use cryptopay_hex::{PaymentService, ServicePorts, ServiceSettings};
use cryptopay_repo::security::RequestSigner;
use cryptopay_repo::{SimulatedLedger, TracingNotifier, WebhookDispatcher, build_archive};
use cryptopay_types::Notifier;
use rate_oracle::{CachedRateOracle, StaticRateTable};

use config::Config;

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("cryptopay-service"), provider))
}

/// Key for sealing customer data. A generated key only lives as long as the
/// process, so sealed records from earlier runs cannot be opened.
fn data_encryption_key(config: &Config) -> String {
    match &config.data_encryption_key {
        Some(key) => key.clone(),
        None => {
            tracing::warn!("DATA_ENCRYPTION_KEY not set, generating an ephemeral key");
            hex::encode(rand::random::<[u8; 32]>())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // Initialize OpenTelemetry tracing when enabled
    let otel = if config.otel_enabled {
        Some(init_tracer()?)
    } else {
        None
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cryptopay_app=debug,cryptopay_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting cryptopay server on port {}", config.port);

    let registry = Arc::new(ComplianceRegistry::standard(&config.jurisdiction_settings()));
    tracing::info!(jurisdictions = ?registry.codes(), "Compliance registry ready");

    let ledger = match config.simulated_confirmation {
        Some(delay) => SimulatedLedger::new().with_auto_confirm(delay),
        None => SimulatedLedger::new(),
    };
    let rates = CachedRateOracle::new(StaticRateTable::new(), config.rate_freshness);
    let archive = build_archive(config.database_url.as_deref()).await?;

    let notifier: Arc<dyn Notifier> = match &config.merchant_callback_url {
        Some(url) => {
            tracing::info!(callback_url = %url, "Delivering payment events");
            let (dispatcher, _worker) = WebhookDispatcher::spawn(
                reqwest::Client::new(),
                Some(url.clone()),
                RequestSigner::new(config.webhook_secret.clone()),
            );
            Arc::new(dispatcher)
        }
        None => Arc::new(TracingNotifier),
    };

    let service = PaymentService::new(
        ServicePorts {
            registry,
            ledger: Arc::new(ledger),
            rates: Arc::new(rates),
            archive,
            notifier,
        },
        ServiceSettings {
            payment_ttl: config.payment_ttl,
            poll_interval: config.poll_interval,
            required_confirmations: config.required_confirmations,
            webhook_secret: config.webhook_secret.clone(),
            signature_tolerance: config.signature_tolerance,
            nonce_retention: config.nonce_retention,
            callback_url: config.merchant_callback_url.clone(),
            data_encryption_key: data_encryption_key(&config),
            merchant_id: config.merchant_id.clone(),
        },
    );

    // Create and run the HTTP server
    let server = HttpServer::new(
        Arc::new(service),
        ServerSettings {
            merchant_id: config.merchant_id.clone(),
            api_secret: config.merchant_api_secret.clone(),
            signature_tolerance: config.signature_tolerance,
            nonce_retention: config.nonce_retention,
            rate_limit_per_minute: config.rate_limit_per_minute,
        },
    );
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
