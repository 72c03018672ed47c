//! HTTP Server configuration and startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use cryptopay_repo::security::SignatureVerifier;

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::PaymentService;

/// Inbound security settings of the HTTP adapter.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub merchant_id: Option<String>,
    pub api_secret: String,
    pub signature_tolerance: Duration,
    pub nonce_retention: Duration,
    pub rate_limit_per_minute: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            merchant_id: None,
            api_secret: String::new(),
            signature_tolerance: Duration::from_secs(300),
            nonce_retention: Duration::from_secs(600),
            rate_limit_per_minute: 100,
        }
    }
}

/// HTTP Server for the payment API.
pub struct HttpServer {
    state: Arc<AppState>,
    rate_limiter: Arc<RateLimiterState>,
    nonce_retention: Duration,
}

impl HttpServer {
    pub fn new(service: Arc<PaymentService>, settings: ServerSettings) -> Self {
        let api_verifier = SignatureVerifier::new(
            settings.api_secret,
            settings.signature_tolerance,
            settings.nonce_retention,
        );
        Self {
            state: Arc::new(AppState {
                service,
                api_verifier,
                merchant_id: settings.merchant_id,
            }),
            rate_limiter: Arc::new(RateLimiterState::per_minute(settings.rate_limit_per_minute)),
            nonce_retention: settings.nonce_retention,
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/openapi.json", get(handlers::openapi_json))
            .route("/api/payments", post(handlers::create_payment))
            .route("/api/payments/{id}", get(handlers::get_payment))
            .route("/api/payments/{id}/cancel", post(handlers::cancel_payment))
            .route("/api/jurisdictions/{code}", get(handlers::get_jurisdiction))
            .route(
                "/api/jurisdictions/{code}/assets/{asset}",
                get(handlers::classify_asset),
            )
            .route(
                "/api/jurisdictions/{code}/reports",
                get(handlers::jurisdiction_reports),
            )
            .route("/api/exchange-rates", get(handlers::exchange_rate))
            .route("/api/webhooks/events", post(handlers::webhook_events))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    ///
    /// Status pollers are stopped once the server has drained.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let purge = tokio::spawn(purge_nonces(self.state.clone(), self.nonce_retention));

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await;

        purge.abort();
        self.state.service.shutdown();
        served?;
        Ok(())
    }
}

/// Drops replay-cache entries older than the retention window.
async fn purge_nonces(state: Arc<AppState>, retention: Duration) {
    let mut ticker = tokio::time::interval(retention.max(Duration::from_secs(1)));
    loop {
        ticker.tick().await;
        state.api_verifier.purge_expired_nonces();
        state.service.purge_expired_nonces();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
