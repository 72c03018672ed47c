//! Signature authentication middleware for merchant API requests.

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use cryptopay_repo::security::{MERCHANT_HEADER, SignedHeaders, request_payload};
use cryptopay_types::{AppError, AuthError};

use super::handlers::{ApiError, AppState};

/// Largest request body accepted for signature verification.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Paths that skip merchant signature checks. Webhook events carry their own
/// signature, verified by the handler.
fn is_public(path: &str) -> bool {
    matches!(path, "/health" | "/api/openapi.json" | "/api/webhooks/events")
}

/// Authentication middleware that validates request signatures.
///
/// This middleware:
/// 1. Reads the signature headers and buffers the body
/// 2. Verifies the HMAC over `METHOD path\nbody` with the merchant API secret
/// 3. Rejects stale timestamps and replayed nonces
/// 4. Returns 401 Unauthorized if validation fails
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    if let Some(expected) = state.merchant_id.as_deref() {
        let given = request
            .headers()
            .get(MERCHANT_HEADER)
            .and_then(|v| v.to_str().ok());
        if given != Some(expected) {
            tracing::warn!(merchant = ?given, "Rejected request from unknown merchant");
            return unauthorized(AuthError::MissingHeader(MERCHANT_HEADER));
        }
    }

    let headers = request.headers();
    let signed = match SignedHeaders::from_lookup(|name| {
        headers.get(name).and_then(|v| v.to_str().ok())
    }) {
        Ok(signed) => signed,
        Err(e) => return unauthorized(e),
    };

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return ApiError(AppError::BadRequest(format!("Unreadable body: {}", e)))
                .into_response();
        }
    };

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path());
    let payload = request_payload(parts.method.as_str(), path, &bytes);

    if let Err(e) = state.api_verifier.verify(&signed, &payload) {
        tracing::warn!(path = %parts.uri.path(), "Rejected API request: {}", e);
        return unauthorized(e);
    }

    next.run(Request::from_parts(parts, Body::from(bytes)))
        .await
}

fn unauthorized(err: AuthError) -> Response {
    ApiError(AppError::Unauthorized(err)).into_response()
}
