//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use cryptopay_repo::security::{SignatureVerifier, SignedHeaders};
use cryptopay_types::{
    AppError, CreatePaymentRequest, ErrorResponse, ExchangeRateQuery, PaymentId, PaymentResponse,
    ReportQuery,
};

use crate::PaymentService;
use crate::openapi::ApiDoc;
use crate::webhook::WebhookAuthenticator;

/// Application state shared across handlers.
pub struct AppState {
    pub service: Arc<PaymentService>,
    /// Verifies merchant API request signatures
    pub api_verifier: SignatureVerifier,
    /// When set, API requests must carry this merchant id
    pub merchant_id: Option<String>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Compliance(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(self.0.code(), message))).into_response()
    }
}

fn parse_payment_id(id: &str) -> Result<PaymentId, ApiError> {
    id.parse()
        .map_err(|_| AppError::BadRequest("Invalid payment ID".into()).into())
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "active_payments": state.service.active_payments(),
    }))
}

/// OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, payload))]
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let created = state.service.create_payment(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_payment_id(&id)?;
    let payment = state.service.get_payment(id).await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn cancel_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_payment_id(&id)?;
    let payment = state.service.cancel_payment(id).await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference data
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn get_jurisdiction(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.jurisdiction(&code)?))
}

#[tracing::instrument(skip(state))]
pub async fn classify_asset(
    State(state): State<Arc<AppState>>,
    Path((code, asset)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.classify_asset(&code, &asset)?))
}

#[tracing::instrument(skip(state, query))]
pub async fn jurisdiction_reports(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(q) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    Ok(Json(state.service.reports(&code, q.from, q.to).await?))
}

#[tracing::instrument(skip(state, query))]
pub async fn exchange_rate(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ExchangeRateQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(q) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    Ok(Json(state.service.exchange_rate(&q.fiat, &q.crypto).await?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhooks
// ─────────────────────────────────────────────────────────────────────────────

/// Receives a signed webhook event. The raw body is authenticated before
/// anything parses it.
#[tracing::instrument(skip_all)]
pub async fn webhook_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signed = SignedHeaders::from_lookup(|name| {
        headers.get(name).and_then(|v| v.to_str().ok())
    })
    .map_err(WebhookAuthenticator::missing_headers)?;

    let ack = state.service.handle_webhook(&signed, &body).await?;
    Ok(Json(ack))
}
