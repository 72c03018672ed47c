//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use cryptopay_types::domain::{
    AssetGroup, ComplianceReport, CountryCode, KycRequirements, PaymentId, PaymentStatus,
    ReportCadence, ReportPeriod, WebhookPayload,
};
use cryptopay_types::dto::{
    AssetClassResponse, CreatePaymentRequest, ErrorBody, ErrorResponse, ExchangeRateQuery,
    ExchangeRateResponse, JurisdictionResponse, PaymentCreatedResponse, PaymentResponse,
    ReportQuery, ReportsResponse, WebhookAck,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy", "active_payments": 0}))
    )
)]
async fn health() {}

/// Create a payment
///
/// Runs the jurisdiction's compliance review, quotes the amount and opens a
/// pending payment with a fresh deposit address.
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "payments",
    request_body = CreatePaymentRequest,
    security(("merchant_signature" = [])),
    responses(
        (status = 201, description = "Payment created", body = PaymentCreatedResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown jurisdiction", body = ErrorResponse),
        (status = 422, description = "Rejected by compliance review", body = ErrorResponse),
        (status = 502, description = "Rate oracle or ledger unavailable", body = ErrorResponse)
    )
)]
async fn create_payment() {}

/// Get a payment
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "payments",
    security(("merchant_signature" = [])),
    params(
        ("id" = PaymentId, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment details", body = PaymentResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
async fn get_payment() {}

/// Cancel a pending payment
///
/// Cancelling a payment that already finished returns it unchanged.
#[utoipa::path(
    post,
    path = "/api/payments/{id}/cancel",
    tag = "payments",
    security(("merchant_signature" = [])),
    params(
        ("id" = PaymentId, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment cancelled or already finished", body = PaymentResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
async fn cancel_payment() {}

/// Get a jurisdiction's regulatory profile
#[utoipa::path(
    get,
    path = "/api/jurisdictions/{code}",
    tag = "jurisdictions",
    security(("merchant_signature" = [])),
    params(
        ("code" = String, Path, description = "ISO country code", example = "SG")
    ),
    responses(
        (status = 200, description = "Jurisdiction profile", body = JurisdictionResponse),
        (status = 404, description = "Unknown jurisdiction", body = ErrorResponse)
    )
)]
async fn get_jurisdiction() {}

/// Classify a cryptoasset
#[utoipa::path(
    get,
    path = "/api/jurisdictions/{code}/assets/{asset}",
    tag = "jurisdictions",
    security(("merchant_signature" = [])),
    params(
        ("code" = String, Path, description = "ISO country code", example = "KH"),
        ("asset" = String, Path, description = "Cryptocurrency symbol", example = "USDT")
    ),
    responses(
        (status = 200, description = "Asset group", body = AssetClassResponse),
        (status = 404, description = "Jurisdiction unknown or does not group assets", body = ErrorResponse)
    )
)]
async fn classify_asset() {}

/// Regulatory reports
///
/// Aggregates the jurisdiction's archived payments over the period, one
/// report per regulator filing.
#[utoipa::path(
    get,
    path = "/api/jurisdictions/{code}/reports",
    tag = "jurisdictions",
    security(("merchant_signature" = [])),
    params(
        ("code" = String, Path, description = "ISO country code", example = "TH"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Reports for the period", body = ReportsResponse),
        (status = 400, description = "Missing or inverted period", body = ErrorResponse),
        (status = 404, description = "Unknown jurisdiction", body = ErrorResponse)
    )
)]
async fn jurisdiction_reports() {}

/// Current exchange rate
#[utoipa::path(
    get,
    path = "/api/exchange-rates",
    tag = "rates",
    security(("merchant_signature" = [])),
    params(ExchangeRateQuery),
    responses(
        (status = 200, description = "Crypto units per unit of fiat", body = ExchangeRateResponse),
        (status = 404, description = "No rate for the pair", body = ErrorResponse)
    )
)]
async fn exchange_rate() {}

/// Receive a payment event
///
/// Authenticated with the webhook secret through the `X-Signature`,
/// `X-Timestamp` and `X-Nonce` headers. Only `payment.completed` and
/// `payment.cancelled` change a payment.
#[utoipa::path(
    post,
    path = "/api/webhooks/events",
    tag = "webhooks",
    request_body = WebhookPayload,
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 400, description = "Malformed event", body = ErrorResponse),
        (status = 401, description = "Signature rejected", body = ErrorResponse)
    )
)]
async fn webhook_events() {}

/// OpenAPI documentation for the payment API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cryptopay Compliance & Payment API",
        version = "1.0.0",
        description = "Crypto payment acceptance with per-jurisdiction compliance review for BN, KH, ID, LA, MY, SG, TH and VN.\n\n## Authentication\n\nEvery `/api` request except webhook events is signed with the merchant API secret:\n\n```\nX-Merchant-Id: <merchant id>\nX-Timestamp: <unix millis>\nX-Nonce: <random>\nX-Signature: hex(HMAC-SHA256(secret, timestamp + \".\" + nonce + \".\" + METHOD + \" \" + path + \"\\n\" + body))\n```",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_payment,
        get_payment,
        cancel_payment,
        get_jurisdiction,
        classify_asset,
        jurisdiction_reports,
        exchange_rate,
        webhook_events,
    ),
    components(
        schemas(
            CreatePaymentRequest,
            PaymentCreatedResponse,
            PaymentResponse,
            PaymentStatus,
            PaymentId,
            CountryCode,
            JurisdictionResponse,
            KycRequirements,
            AssetClassResponse,
            AssetGroup,
            ReportsResponse,
            ComplianceReport,
            ReportPeriod,
            ReportCadence,
            ExchangeRateResponse,
            WebhookPayload,
            WebhookAck,
            ErrorResponse,
            ErrorBody,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "Payment creation and lifecycle"),
        (name = "jurisdictions", description = "Regulatory profiles and asset classification"),
        (name = "rates", description = "Exchange rates"),
        (name = "webhooks", description = "Inbound payment events"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for signed merchant requests.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "merchant_signature",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Signature"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/payments",
            "/api/payments/{id}",
            "/api/payments/{id}/cancel",
            "/api/jurisdictions/{code}",
            "/api/jurisdictions/{code}/assets/{asset}",
            "/api/jurisdictions/{code}/reports",
            "/api/exchange-rates",
            "/api/webhooks/events",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{}", path);
        }
    }
}
