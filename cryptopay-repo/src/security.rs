//! Security primitives: HMAC request/webhook signing, replay protection and
//! AES-GCM sealing of customer data at rest.
//!
//! Signatures are `hex(HMAC-SHA256(secret, timestamp + "." + nonce + "." + payload))`,
//! where `timestamp` is milliseconds since the Unix epoch. They travel in the
//! [`SIGNATURE_HEADER`], [`TIMESTAMP_HEADER`] and [`NONCE_HEADER`] headers.

use std::time::{Duration, Instant};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use cryptopay_types::AuthError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Timestamp";
pub const NONCE_HEADER: &str = "X-Nonce";
/// Identifies the calling merchant on API requests.
pub const MERCHANT_HEADER: &str = "X-Merchant-Id";

/// Hex SHA-256 digest of a raw body.
pub fn body_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Payload signed for a merchant API request: `METHOD path\nbody`.
///
/// `path` includes the query string, so neither can be swapped under a valid
/// signature.
pub fn request_payload(method: &str, path: &str, body: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(method.len() + path.len() + body.len() + 2);
    payload.extend_from_slice(method.to_ascii_uppercase().as_bytes());
    payload.push(b' ');
    payload.extend_from_slice(path.as_bytes());
    payload.push(b'\n');
    payload.extend_from_slice(body);
    payload
}

/// Signs `timestamp + "." + nonce + "." + payload` with HMAC-SHA256.
///
/// The nonce is under the MAC, so a captured request cannot be replayed with
/// a fresh `X-Nonce`.
pub fn sign(secret: &str, timestamp: &str, nonce: &str, payload: &[u8]) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(nonce.as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a signature using constant-time comparison.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    nonce: &str,
    payload: &[u8],
    signature: &str,
) -> bool {
    let expected = sign(secret, timestamp, nonce, payload);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

// ─────────────────────────────────────────────────────────────────────────────
// Signed headers
// ─────────────────────────────────────────────────────────────────────────────

/// The three authentication headers carried by a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub signature: String,
    pub timestamp: String,
    pub nonce: String,
}

impl SignedHeaders {
    /// Reads the headers through `get`, which looks a header up by name.
    pub fn from_lookup<'a, F>(get: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let read = |name: &'static str| {
            get(name)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(AuthError::MissingHeader(name))
        };
        Ok(Self {
            signature: read(SIGNATURE_HEADER)?,
            timestamp: read(TIMESTAMP_HEADER)?,
            nonce: read(NONCE_HEADER)?,
        })
    }

    /// Header name/value pairs, ready to attach to an outgoing request.
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (SIGNATURE_HEADER, self.signature.as_str()),
            (TIMESTAMP_HEADER, self.timestamp.as_str()),
            (NONCE_HEADER, self.nonce.as_str()),
        ]
    }
}

/// Produces signed headers for outbound requests and webhook deliveries.
#[derive(Clone)]
pub struct RequestSigner {
    secret: String,
}

impl RequestSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Signs `payload` with the current time and a fresh nonce.
    pub fn sign(&self, payload: &[u8]) -> SignedHeaders {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        self.sign_at(payload, Utc::now().timestamp_millis(), nonce)
    }

    pub fn sign_at(&self, payload: &[u8], timestamp_ms: i64, nonce: String) -> SignedHeaders {
        let timestamp = timestamp_ms.to_string();
        SignedHeaders {
            signature: sign(&self.secret, &timestamp, &nonce, payload),
            timestamp,
            nonce,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Replay protection
// ─────────────────────────────────────────────────────────────────────────────

/// Remembers nonces for a retention window.
pub struct ReplayCache {
    seen: DashMap<String, Instant>,
    retention: Duration,
}

impl ReplayCache {
    pub fn new(retention: Duration) -> Self {
        Self {
            seen: DashMap::new(),
            retention,
        }
    }

    /// Records `nonce`. Returns false if it was already seen within the window.
    pub fn check_and_record(&self, nonce: &str) -> bool {
        match self.seen.entry(nonce.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().elapsed() < self.retention {
                    false
                } else {
                    entry.insert(Instant::now());
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Instant::now());
                true
            }
        }
    }

    /// Drops nonces older than the retention window.
    pub fn purge(&self) {
        let retention = self.retention;
        self.seen.retain(|_, seen_at| seen_at.elapsed() < retention);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Verifies signed requests: MAC, timestamp tolerance, then nonce replay.
///
/// One instance guards merchant API requests (keyed with the API secret) and
/// another guards inbound webhook events (keyed with the webhook secret).
pub struct SignatureVerifier {
    secret: String,
    tolerance: chrono::Duration,
    replay: ReplayCache,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>, tolerance: Duration, nonce_retention: Duration) -> Self {
        Self {
            secret: secret.into(),
            tolerance: chrono::Duration::from_std(tolerance)
                .unwrap_or_else(|_| chrono::Duration::seconds(300)),
            replay: ReplayCache::new(nonce_retention),
        }
    }

    pub fn verify(&self, headers: &SignedHeaders, body: &[u8]) -> Result<(), AuthError> {
        self.verify_at(headers, body, Utc::now())
    }

    pub fn verify_at(
        &self,
        headers: &SignedHeaders,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        if !verify_signature(
            &self.secret,
            &headers.timestamp,
            &headers.nonce,
            body,
            &headers.signature,
        ) {
            return Err(AuthError::InvalidSignature);
        }

        let sent_ms: i64 = headers
            .timestamp
            .parse()
            .map_err(|_| AuthError::InvalidSignature)?;
        // Saturates on absurd timestamps, which then fail the window check.
        let skew_ms = now.timestamp_millis().saturating_sub(sent_ms);
        if skew_ms.unsigned_abs() > self.tolerance.num_milliseconds().unsigned_abs() {
            return Err(AuthError::Stale {
                skew_secs: skew_ms / 1000,
            });
        }

        if !self.replay.check_and_record(&headers.nonce) {
            return Err(AuthError::ReplayedNonce);
        }
        Ok(())
    }

    /// Drops expired nonces from the replay cache.
    pub fn purge_expired_nonces(&self) {
        self.replay.purge();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Data sealing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum SealError {
    #[error("Encryption failed")]
    Encrypt,

    #[error("Decryption failed")]
    Decrypt,

    #[error("Malformed sealed value: {0}")]
    Malformed(String),
}

const NONCE_LEN: usize = 12;

/// AES-256-GCM sealing of customer data. Output is `hex(nonce || ciphertext)`.
#[derive(Clone)]
pub struct DataSealer {
    cipher: Aes256Gcm,
}

impl DataSealer {
    /// The cipher key is the SHA-256 digest of `key`.
    pub fn new(key: &str) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(digest.as_slice()));
        Self { cipher }
    }

    pub fn seal(&self, plaintext: &[u8]) -> Result<String, SealError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|_| SealError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(hex::encode(sealed))
    }

    pub fn open(&self, sealed: &str) -> Result<Vec<u8>, SealError> {
        let bytes = hex::decode(sealed).map_err(|e| SealError::Malformed(e.to_string()))?;
        if bytes.len() <= NONCE_LEN {
            return Err(SealError::Malformed("value too short".into()));
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SealError::Decrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_123";

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SECRET, Duration::from_secs(300), Duration::from_secs(600))
    }

    fn signed(body: &[u8], now: DateTime<Utc>, nonce: &str) -> SignedHeaders {
        RequestSigner::new(SECRET).sign_at(body, now.timestamp_millis(), nonce.to_string())
    }

    #[test]
    fn test_request_payload_binds_method_and_path() {
        assert_eq!(
            request_payload("get", "/api/payments/1?x=y", b""),
            b"GET /api/payments/1?x=y\n".to_vec()
        );
        assert_ne!(
            request_payload("POST", "/api/payments", b"{}"),
            request_payload("POST", "/api/payments/1/cancel", b"{}")
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let a = sign(SECRET, "1700000000000", "n1", b"{}");
        let b = sign(SECRET, "1700000000000", "n1", b"{}");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, sign(SECRET, "1700000000001", "n1", b"{}"));
        assert_ne!(a, sign(SECRET, "1700000000000", "n2", b"{}"));
    }

    #[test]
    fn test_valid_request_is_accepted() {
        let now = Utc::now();
        let body = br#"{"event":"payment.completed"}"#;
        let headers = signed(body, now, "n1");
        assert_eq!(verifier().verify_at(&headers, body, now), Ok(()));
    }

    #[test]
    fn test_single_byte_tampering_is_rejected() {
        let now = Utc::now();
        let body = br#"{"amount":"100"}"#.to_vec();
        let headers = signed(&body, now, "n1");
        let v = verifier();

        for i in 0..body.len() {
            let mut tampered = body.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                v.verify_at(&headers, &tampered, now),
                Err(AuthError::InvalidSignature)
            );
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let now = Utc::now();
        let headers =
            RequestSigner::new("other").sign_at(b"{}", now.timestamp_millis(), "n1".into());
        assert_eq!(
            verifier().verify_at(&headers, b"{}", now),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let now = Utc::now();
        let headers = signed(b"{}", now - chrono::Duration::seconds(301), "n1");
        assert!(matches!(
            verifier().verify_at(&headers, b"{}", now),
            Err(AuthError::Stale { skew_secs: 301 })
        ));

        let future = signed(b"{}", now + chrono::Duration::seconds(400), "n2");
        assert!(matches!(
            verifier().verify_at(&future, b"{}", now),
            Err(AuthError::Stale { .. })
        ));

        let edge = signed(b"{}", now - chrono::Duration::seconds(300), "n3");
        assert_eq!(verifier().verify_at(&edge, b"{}", now), Ok(()));
    }

    #[test]
    fn test_replayed_nonce_is_rejected() {
        let now = Utc::now();
        let v = verifier();
        let headers = signed(b"{}", now, "same");

        assert_eq!(v.verify_at(&headers, b"{}", now), Ok(()));
        assert_eq!(
            v.verify_at(&headers, b"{}", now),
            Err(AuthError::ReplayedNonce)
        );
    }

    #[test]
    fn test_captured_request_with_fresh_nonce_is_rejected() {
        let now = Utc::now();
        let v = verifier();
        let mut captured = signed(b"{}", now, "original");
        assert_eq!(v.verify_at(&captured, b"{}", now), Ok(()));

        captured.nonce = "attacker-chosen".into();
        assert_eq!(
            v.verify_at(&captured, b"{}", now),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_extreme_timestamp_is_stale() {
        let now = Utc::now();
        for sent_ms in [i64::MIN, i64::MAX] {
            let headers = RequestSigner::new(SECRET).sign_at(b"{}", sent_ms, "n1".into());
            assert!(matches!(
                verifier().verify_at(&headers, b"{}", now),
                Err(AuthError::Stale { .. })
            ));
        }
    }

    #[test]
    fn test_failed_mac_does_not_burn_nonce() {
        let now = Utc::now();
        let v = verifier();
        let mut forged = signed(b"{}", now, "n1");
        forged.signature = "00".repeat(32);

        assert_eq!(
            v.verify_at(&forged, b"{}", now),
            Err(AuthError::InvalidSignature)
        );
        assert_eq!(v.verify_at(&signed(b"{}", now, "n1"), b"{}", now), Ok(()));
    }

    #[test]
    fn test_missing_headers() {
        let err = SignedHeaders::from_lookup(|name| match name {
            SIGNATURE_HEADER => Some("abc"),
            _ => None,
        })
        .unwrap_err();
        assert_eq!(err, AuthError::MissingHeader(TIMESTAMP_HEADER));

        let ok = SignedHeaders::from_lookup(|_| Some("v")).unwrap();
        assert_eq!(ok.nonce, "v");
    }

    #[test]
    fn test_replay_cache_purge() {
        let cache = ReplayCache::new(Duration::from_millis(0));
        assert!(cache.check_and_record("n"));
        // Zero retention: the nonce is immediately reusable.
        assert!(cache.check_and_record("n"));
        cache.purge();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_seal_and_open() {
        let sealer = DataSealer::new("data-key");
        let sealed = sealer.seal(b"Jane Tan <jane@example.com>").unwrap();

        assert!(!sealed.contains("Jane"));
        assert_ne!(sealed, sealer.seal(b"Jane Tan <jane@example.com>").unwrap());
        assert_eq!(sealer.open(&sealed).unwrap(), b"Jane Tan <jane@example.com>");
    }

    #[test]
    fn test_open_rejects_wrong_key_and_garbage() {
        let sealed = DataSealer::new("k1").seal(b"secret").unwrap();
        assert!(matches!(
            DataSealer::new("k2").open(&sealed),
            Err(SealError::Decrypt)
        ));
        assert!(matches!(
            DataSealer::new("k1").open("zz"),
            Err(SealError::Malformed(_))
        ));
        assert!(matches!(
            DataSealer::new("k1").open("00ff"),
            Err(SealError::Malformed(_))
        ));
    }
}
