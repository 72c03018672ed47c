//! Integration tests for the HTTP adapter.
//!
//! These tests drive the full router (signature auth, rate limiting and
//! handlers) against in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use cryptopay_compliance::{ComplianceRegistry, JurisdictionSettings};
use cryptopay_hex::inbound::{HttpServer, ServerSettings};
use cryptopay_hex::{PaymentService, ServicePorts, ServiceSettings};
use cryptopay_repo::security::{MERCHANT_HEADER, RequestSigner, request_payload};
use cryptopay_repo::{InMemoryArchive, SimulatedLedger, TracingNotifier};
use rate_oracle::StaticRateTable;

const MERCHANT_ID: &str = "m_test";
const API_SECRET: &str = "sk_test";
const WEBHOOK_SECRET: &str = "whsec_test";

fn create_app(rate_limit_per_minute: u32) -> Router {
    let ports = ServicePorts {
        registry: Arc::new(ComplianceRegistry::standard(&JurisdictionSettings::default())),
        ledger: Arc::new(SimulatedLedger::new()),
        rates: Arc::new(StaticRateTable::new()),
        archive: Arc::new(InMemoryArchive::new()),
        notifier: Arc::new(TracingNotifier),
    };
    let service = PaymentService::new(
        ports,
        ServiceSettings {
            poll_interval: Duration::from_secs(60),
            webhook_secret: WEBHOOK_SECRET.into(),
            data_encryption_key: "test-data-key".into(),
            ..ServiceSettings::default()
        },
    );
    let server = HttpServer::new(
        Arc::new(service),
        ServerSettings {
            merchant_id: Some(MERCHANT_ID.into()),
            api_secret: API_SECRET.into(),
            rate_limit_per_minute,
            ..ServerSettings::default()
        },
    );
    server.router()
}

/// Builds a merchant API request signed with `secret`.
fn signed_with(secret: &str, method: Method, uri: &str, body: &str) -> Request<Body> {
    let payload = request_payload(method.as_str(), uri, body.as_bytes());
    let headers = RequestSigner::new(secret).sign(&payload);

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(MERCHANT_HEADER, MERCHANT_ID)
        .header("Content-Type", "application/json");
    for (name, value) in headers.pairs() {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn signed(method: Method, uri: &str, body: &str) -> Request<Body> {
    signed_with(API_SECRET, method, uri, body)
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn create_payment(app: &Router, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(signed(Method::POST, "/api/payments", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}

#[tokio::test]
async fn test_health_and_openapi_are_public() {
    let app = create_app(100);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "healthy");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = read_json(response).await;
    assert!(doc["paths"]["/api/payments"].is_object());
}

#[tokio::test]
async fn test_payment_round_trip() {
    let app = create_app(100);

    let created = create_payment(
        &app,
        json!({
            "amount": "100",
            "currency": "SGD",
            "crypto_currency": "BTC",
            "country_code": "SG",
            "order_id": "order-42"
        }),
    )
    .await;
    assert_eq!(created["status"], "pending");
    assert_eq!(created["crypto_amount"], "0.001875");
    let id = created["payment_id"].as_str().unwrap().to_string();

    let uri = format!("/api/payments/{}", id);
    let response = app
        .clone()
        .oneshot(signed(Method::GET, &uri, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payment = read_json(response).await;
    assert_eq!(payment["order_id"], "order-42");
    assert_eq!(payment["country_code"], "SG");

    let uri = format!("/api/payments/{}/cancel", id);
    let response = app
        .clone()
        .oneshot(signed(Method::POST, &uri, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "cancelled");
}

#[tokio::test]
async fn test_compliance_rejection_is_422() {
    let app = create_app(100);
    let body = json!({
        "amount": "1200",
        "currency": "SGD",
        "crypto_currency": "BTC",
        "country_code": "SG"
    });

    let response = app
        .oneshot(signed(Method::POST, "/api/payments", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_json(response).await["error"]["code"], "compliance_error");
}

#[tokio::test]
async fn test_malformed_body_is_invalid_request() {
    let app = create_app(100);
    let response = app
        .oneshot(signed(Method::POST, "/api/payments", r#"{"amount": "#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"]["code"], "invalid_request");
}

#[tokio::test]
async fn test_reference_data_endpoints() {
    let app = create_app(100);

    let response = app
        .clone()
        .oneshot(signed(Method::GET, "/api/jurisdictions/SG", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["currency_code"], "SGD");

    let response = app
        .clone()
        .oneshot(signed(Method::GET, "/api/jurisdictions/KH/assets/USDT", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(signed(Method::GET, "/api/jurisdictions/JP", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        read_json(response).await["error"]["code"],
        "resource_not_found"
    );

    let response = app
        .clone()
        .oneshot(signed(
            Method::GET,
            "/api/exchange-rates?fiat=SGD&crypto=USDT",
            "",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["rate"], "0.75");

    let response = app
        .oneshot(signed(Method::GET, "/api/exchange-rates?fiat=SGD", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsigned_and_forged_requests_are_rejected() {
    let app = create_app(100);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/jurisdictions/SG")
                .header(MERCHANT_HEADER, MERCHANT_ID)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["error"]["code"], "unauthorized");

    let response = app
        .clone()
        .oneshot(signed_with("wrong", Method::GET, "/api/jurisdictions/SG", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Signature for one path replayed against another.
    let mut request = signed(Method::GET, "/api/jurisdictions/SG", "");
    *request.uri_mut() = "/api/jurisdictions/TH".parse().unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = signed(Method::GET, "/api/jurisdictions/SG", "");
    request
        .headers_mut()
        .insert(MERCHANT_HEADER, "m_other".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_replayed_request_is_rejected() {
    let app = create_app(100);
    let request = signed(Method::GET, "/api/jurisdictions/SG", "");
    let mut replay = Request::builder()
        .uri("/api/jurisdictions/SG")
        .body(Body::empty())
        .unwrap();
    *replay.headers_mut() = request.headers().clone();

    assert_eq!(
        app.clone().oneshot(request).await.unwrap().status(),
        StatusCode::OK
    );
    assert_eq!(
        app.oneshot(replay).await.unwrap().status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_captured_request_with_new_nonce_is_rejected() {
    let app = create_app(100);
    let body = json!({
        "amount": "100",
        "currency": "SGD",
        "crypto_currency": "BTC",
        "country_code": "SG"
    })
    .to_string();
    let request = signed(Method::POST, "/api/payments", &body);
    let mut resent = Request::builder()
        .method(Method::POST)
        .uri("/api/payments")
        .body(Body::from(body.clone()))
        .unwrap();
    *resent.headers_mut() = request.headers().clone();
    resent
        .headers_mut()
        .insert("X-Nonce", "a-fresh-nonce".parse().unwrap());

    assert_eq!(
        app.clone().oneshot(request).await.unwrap().status(),
        StatusCode::CREATED
    );
    assert_eq!(
        app.oneshot(resent).await.unwrap().status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_jurisdiction_reports_endpoint() {
    let app = create_app(100);

    let response = app
        .clone()
        .oneshot(signed(
            Method::GET,
            "/api/jurisdictions/TH/reports?from=2025-03-01T00:00:00Z&to=2025-04-01T00:00:00Z",
            "",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["jurisdiction"], "TH");
    assert_eq!(json["reports"][0]["report_type"], "SEC_Monthly_Report");
    assert_eq!(json["reports"][1]["report_type"], "BOT_Quarterly_Report");
    assert_eq!(json["reports"][0]["payment_count"], 0);

    let response = app
        .clone()
        .oneshot(signed(
            Method::GET,
            "/api/jurisdictions/TH/reports?from=2025-04-01T00:00:00Z&to=2025-03-01T00:00:00Z",
            "",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(signed(Method::GET, "/api/jurisdictions/TH/reports", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_event_completes_payment() {
    let app = create_app(100);
    let created = create_payment(
        &app,
        json!({
            "amount": "100",
            "currency": "SGD",
            "crypto_currency": "BTC",
            "country_code": "SG"
        }),
    )
    .await;
    let id = created["payment_id"].as_str().unwrap().to_string();

    let unsigned = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks/events")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.clone().oneshot(unsigned).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let event = json!({
        "id": "evt_http_1",
        "event": "payment.completed",
        "timestamp": "2026-01-01T00:00:00Z",
        "data": { "id": id }
    })
    .to_string();
    let headers = RequestSigner::new(WEBHOOK_SECRET).sign(event.as_bytes());
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks/events");
    for (name, value) in headers.pairs() {
        builder = builder.header(name, value);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::from(event)).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ack = read_json(response).await;
    assert_eq!(ack["event_id"], "evt_http_1");
    assert_eq!(ack["applied"], true);

    let response = app
        .oneshot(signed(Method::GET, &format!("/api/payments/{}", id), ""))
        .await
        .unwrap();
    assert_eq!(read_json(response).await["status"], "completed");
}

#[tokio::test]
async fn test_rate_limiting_returns_429_when_exceeded() {
    let app = create_app(3);

    for i in 1..=3 {
        let response = app
            .clone()
            .oneshot(signed(Method::GET, "/api/jurisdictions/SG", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "request {}", i);
    }

    let response = app
        .clone()
        .oneshot(signed(Method::GET, "/api/jurisdictions/SG", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(read_json(response).await["error"]["code"], "rate_limited");

    // Health checks are never limited.
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
