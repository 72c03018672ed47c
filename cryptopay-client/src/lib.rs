//! # Cryptopay Client SDK
//!
//! A typed Rust client for the Cryptopay API. Every `/api` request is signed
//! with the merchant API secret; see [`cryptopay_repo::security`] for the
//! signature scheme.

use chrono::{DateTime, SecondsFormat, Utc};
use cryptopay_repo::security::{MERCHANT_HEADER, RequestSigner, request_payload};
use cryptopay_types::{
    AssetClassResponse, CreatePaymentRequest, ErrorResponse, ExchangeRateResponse,
    JurisdictionResponse, PaymentCreatedResponse, PaymentId, PaymentResponse, ReportsResponse,
};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Client has no merchant credentials")]
    MissingCredentials,
}

struct Credentials {
    merchant_id: String,
    signer: RequestSigner,
}

/// Cryptopay API client.
pub struct CryptopayClient {
    base_url: String,
    credentials: Option<Credentials>,
    http: Client,
}

impl CryptopayClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: None,
            http: Client::new(),
        }
    }

    /// Sets the merchant id and API secret used to sign requests.
    pub fn with_credentials(
        mut self,
        merchant_id: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            merchant_id: merchant_id.into(),
            signer: RequestSigner::new(api_secret),
        });
        self
    }

    /// Replaces the underlying HTTP client.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Creates a payment. Compliance rejections surface as
    /// `ClientError::Api` with code `compliance_error`.
    pub async fn create_payment(
        &self,
        req: &CreatePaymentRequest,
    ) -> Result<PaymentCreatedResponse, ClientError> {
        let body = serde_json::to_vec(req)?;
        self.send(Method::POST, "/api/payments", body).await
    }

    pub async fn get_payment(&self, id: PaymentId) -> Result<PaymentResponse, ClientError> {
        self.send(Method::GET, &format!("/api/payments/{}", id), Vec::new())
            .await
    }

    /// Cancels a pending payment.
    pub async fn cancel_payment(&self, id: PaymentId) -> Result<PaymentResponse, ClientError> {
        self.send(
            Method::POST,
            &format!("/api/payments/{}/cancel", id),
            Vec::new(),
        )
        .await
    }

    pub async fn jurisdiction(&self, code: &str) -> Result<JurisdictionResponse, ClientError> {
        self.send(Method::GET, &format!("/api/jurisdictions/{}", code), Vec::new())
            .await
    }

    pub async fn classify_asset(
        &self,
        code: &str,
        asset: &str,
    ) -> Result<AssetClassResponse, ClientError> {
        self.send(
            Method::GET,
            &format!("/api/jurisdictions/{}/assets/{}", code, asset),
            Vec::new(),
        )
        .await
    }

    /// Regulatory reports of a jurisdiction over `[from, to)`.
    pub async fn reports(
        &self,
        code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ReportsResponse, ClientError> {
        // UTC with a `Z` suffix keeps `+` out of the query string.
        let path = format!(
            "/api/jurisdictions/{}/reports?from={}&to={}",
            code,
            from.to_rfc3339_opts(SecondsFormat::Secs, true),
            to.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        self.send(Method::GET, &path, Vec::new()).await
    }

    pub async fn exchange_rate(
        &self,
        fiat: &str,
        crypto: &str,
    ) -> Result<ExchangeRateResponse, ClientError> {
        self.send(
            Method::GET,
            &format!("/api/exchange-rates?fiat={}&crypto={}", fiat, crypto),
            Vec::new(),
        )
        .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Vec<u8>,
    ) -> Result<T, ClientError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(ClientError::MissingCredentials)?;
        let headers = creds
            .signer
            .sign(&request_payload(method.as_str(), path, &body));

        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(MERCHANT_HEADER, &creds.merchant_id);
        for (name, value) in headers.pairs() {
            req = req.header(name, value);
        }
        if !body.is_empty() {
            req = req
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(envelope) => (envelope.error.code, envelope.error.message),
                Err(_) => ("unknown".to_string(), body),
            };
            Err(ClientError::Api {
                status: status.as_u16(),
                code,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CryptopayClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
        assert!(client.credentials.is_none());
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = CryptopayClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_unsigned_client_refuses_api_calls() {
        let client = CryptopayClient::new("http://localhost:3000");
        let err = client.jurisdiction("SG").await.unwrap_err();
        assert!(matches!(err, ClientError::MissingCredentials));
    }
}
