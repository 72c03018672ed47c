//! Inbound webhook authentication.

use std::time::Duration;

use tracing::warn;

use cryptopay_repo::security::{SignatureVerifier, SignedHeaders, body_digest};
use cryptopay_types::{AppError, AuthError, WebhookEvent, WebhookPayload};

/// Verifies signed webhook deliveries before anything reads their content.
pub struct WebhookAuthenticator {
    verifier: SignatureVerifier,
}

impl WebhookAuthenticator {
    pub fn new(secret: impl Into<String>, tolerance: Duration, nonce_retention: Duration) -> Self {
        Self {
            verifier: SignatureVerifier::new(secret, tolerance, nonce_retention),
        }
    }

    /// Authenticates the raw body and decodes it into an event.
    ///
    /// The event id is the sender's `id` field, or the SHA-256 of the body
    /// when the sender did not supply one.
    pub fn authenticate(
        &self,
        headers: &SignedHeaders,
        body: &[u8],
    ) -> Result<WebhookEvent, AppError> {
        if let Err(e) = self.verifier.verify(headers, body) {
            warn!(nonce = %headers.nonce, "Rejected webhook event: {}", e);
            return Err(e.into());
        }

        let payload: WebhookPayload = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;
        Ok(WebhookEvent::new(
            payload,
            headers.signature.clone(),
            body_digest(body),
        ))
    }

    /// Logs and converts a header lookup failure.
    pub fn missing_headers(err: AuthError) -> AppError {
        warn!("Rejected webhook event: {}", err);
        err.into()
    }

    pub fn purge_expired_nonces(&self) {
        self.verifier.purge_expired_nonces();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptopay_repo::security::RequestSigner;
    use cryptopay_types::PaymentEventKind;

    fn authenticator() -> WebhookAuthenticator {
        WebhookAuthenticator::new(
            "whsec_test",
            Duration::from_secs(300),
            Duration::from_secs(600),
        )
    }

    #[test]
    fn test_authenticates_and_decodes() {
        let body = br#"{"id":"evt_1","event":"payment.completed","timestamp":"2026-01-01T00:00:00Z","data":{"id":"00000000-0000-0000-0000-000000000001"}}"#;
        let headers = RequestSigner::new("whsec_test").sign(body);

        let event = authenticator().authenticate(&headers, body).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.kind(), Some(PaymentEventKind::Completed));
        assert_eq!(event.signature, headers.signature);
    }

    #[test]
    fn test_event_id_defaults_to_body_digest() {
        let body = br#"{"event":"payment.cancelled","timestamp":"2026-01-01T00:00:00Z","data":{}}"#;
        let headers = RequestSigner::new("whsec_test").sign(body);

        let event = authenticator().authenticate(&headers, body).unwrap();
        assert_eq!(event.id, body_digest(body));
    }

    #[test]
    fn test_rejects_bad_signature_before_parsing() {
        let headers = RequestSigner::new("other").sign(b"not json");
        let err = authenticator().authenticate(&headers, b"not json").unwrap_err();
        assert!(matches!(
            err,
            AppError::Unauthorized(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_rejects_malformed_body_after_auth() {
        let headers = RequestSigner::new("whsec_test").sign(b"not json");
        let err = authenticator().authenticate(&headers, b"not json").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
