//! Request authentication headers.
//!
//! Two tiers gate the privileged API:
//!
//! - **L1**: an EIP-712 `ClobAuth` signature proving control of the private key.
//!   Used to create or derive API credentials.
//! - **L2**: an HMAC-SHA256 over `timestamp + method + path + body`, keyed by the
//!   base64-decoded API secret. Used for every trading operation.
//!
//! The L2 body must be the exact string transmitted. Callers serialize the body
//! once (compact JSON) and pass the same string to signing and to the transport.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;

use crate::signing::Signer;
use crate::{Error, Result};

pub const POLY_ADDRESS: &str = "POLY_ADDRESS";
pub const POLY_SIGNATURE: &str = "POLY_SIGNATURE";
pub const POLY_TIMESTAMP: &str = "POLY_TIMESTAMP";
pub const POLY_NONCE: &str = "POLY_NONCE";
pub const POLY_API_KEY: &str = "POLY_API_KEY";
pub const POLY_PASSPHRASE: &str = "POLY_PASSPHRASE";

/// Header name to value.
pub type AuthHeaders = BTreeMap<&'static str, String>;

/// Trust tier required by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthLevel {
    /// Public endpoints.
    L0,
    /// Private key available.
    L1,
    /// Private key and API credentials available.
    L2,
}

impl std::fmt::Display for AuthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthLevel::L0 => write!(f, "L0"),
            AuthLevel::L1 => write!(f, "L1"),
            AuthLevel::L2 => write!(f, "L2"),
        }
    }
}

pub(crate) const L1_AUTH_UNAVAILABLE: &str =
    "A private key is needed to interact with this endpoint!";
pub(crate) const L2_AUTH_UNAVAILABLE: &str =
    "API Credentials are needed to interact with this endpoint!";

/// API credentials for authenticated CLOB requests.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub api_key: String,
    /// Base64 (URL-safe) HMAC secret.
    pub api_secret: String,
    pub api_passphrase: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("api_passphrase", &"[REDACTED]")
            .finish()
    }
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String, api_passphrase: String) -> Self {
        Self {
            api_key,
            api_secret,
            api_passphrase,
        }
    }

    /// Load from `POLY_API_KEY`, `POLY_API_SECRET` and `POLY_API_PASSPHRASE`.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("POLY_API_KEY").map_err(|_| Error::Config {
            message: "POLY_API_KEY environment variable not set".to_string(),
        })?;
        let api_secret = std::env::var("POLY_API_SECRET").map_err(|_| Error::Config {
            message: "POLY_API_SECRET environment variable not set".to_string(),
        })?;
        let api_passphrase = std::env::var("POLY_API_PASSPHRASE").map_err(|_| Error::Config {
            message: "POLY_API_PASSPHRASE environment variable not set".to_string(),
        })?;

        Ok(Self {
            api_key,
            api_secret,
            api_passphrase,
        })
    }
}

/// The parts of an outgoing request covered by the L2 signature.
#[derive(Debug, Clone, Copy)]
pub struct RequestArgs<'a> {
    pub method: &'a str,
    /// Path without host or query string.
    pub request_path: &'a str,
    /// Serialized body exactly as it will be sent.
    pub body: Option<&'a str>,
}

impl<'a> RequestArgs<'a> {
    pub fn new(method: &'a str, request_path: &'a str) -> Self {
        Self {
            method,
            request_path,
            body: None,
        }
    }

    pub fn with_body(mut self, body: &'a str) -> Self {
        self.body = Some(body);
        self
    }
}

/// Build L1 headers stamped with the current time. `nonce` defaults to 0.
#[allow(clippy::result_large_err)]
pub fn create_level_1_headers(signer: &Signer, nonce: Option<u64>) -> Result<AuthHeaders> {
    level_1_headers_at(signer, nonce, current_timestamp())
}

/// Build L1 headers for an explicit timestamp.
#[allow(clippy::result_large_err)]
pub fn level_1_headers_at(
    signer: &Signer,
    nonce: Option<u64>,
    timestamp: u64,
) -> Result<AuthHeaders> {
    let nonce = nonce.unwrap_or(0);
    let signature = signer.sign_clob_auth_message(timestamp, nonce)?;

    let mut headers = AuthHeaders::new();
    headers.insert(POLY_ADDRESS, signer.address().to_checksum(None));
    headers.insert(POLY_SIGNATURE, signature);
    headers.insert(POLY_TIMESTAMP, timestamp.to_string());
    headers.insert(POLY_NONCE, nonce.to_string());
    Ok(headers)
}

/// Build L2 headers stamped with the current time.
#[allow(clippy::result_large_err)]
pub fn create_level_2_headers(
    signer: &Signer,
    credentials: &ApiCredentials,
    request: &RequestArgs<'_>,
) -> Result<AuthHeaders> {
    level_2_headers_at(signer, credentials, request, current_timestamp())
}

/// Build L2 headers for an explicit timestamp.
#[allow(clippy::result_large_err)]
pub fn level_2_headers_at(
    signer: &Signer,
    credentials: &ApiCredentials,
    request: &RequestArgs<'_>,
    timestamp: u64,
) -> Result<AuthHeaders> {
    let timestamp = timestamp.to_string();
    let signature = build_hmac_signature(
        &credentials.api_secret,
        &timestamp,
        request.method,
        request.request_path,
        request.body,
    )?;

    let mut headers = AuthHeaders::new();
    headers.insert(POLY_ADDRESS, signer.address().to_checksum(None));
    headers.insert(POLY_SIGNATURE, signature);
    headers.insert(POLY_TIMESTAMP, timestamp);
    headers.insert(POLY_API_KEY, credentials.api_key.clone());
    headers.insert(POLY_PASSPHRASE, credentials.api_passphrase.clone());
    Ok(headers)
}

/// HMAC-SHA256 over `timestamp + method + path + body`, URL-safe base64 encoded.
#[allow(clippy::result_large_err)]
pub fn build_hmac_signature(
    secret: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: Option<&str>,
) -> Result<String> {
    let message = match body {
        Some(b) => format!("{}{}{}{}", timestamp, method, request_path, b),
        None => format!("{}{}{}", timestamp, method, request_path),
    };

    // Secrets are issued URL-safe; accept unpadded and standard alphabets too.
    let secret_bytes = base64::engine::general_purpose::URL_SAFE
        .decode(secret)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(secret))
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(secret))
        .map_err(|e| Error::Signing {
            message: format!("Invalid API secret encoding: {}", e),
        })?;

    let mut mac = Hmac::<Sha256>::new_from_slice(&secret_bytes).map_err(|e| Error::Signing {
        message: format!("Failed to create HMAC: {}", e),
    })?;

    mac.update(message.as_bytes());
    let result = mac.finalize();

    Ok(base64::engine::general_purpose::URL_SAFE.encode(result.into_bytes()))
}

/// Current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::POLYGON_CHAIN_ID;

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_signer() -> Signer {
        Signer::new(TEST_PRIVATE_KEY, POLYGON_CHAIN_ID).unwrap()
    }

    #[test]
    fn test_credentials_from_env() {
        let _guard = crate::config::ENV_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        std::env::set_var("POLY_API_KEY", "env-key");
        std::env::set_var("POLY_API_SECRET", "c2VjcmV0");
        std::env::set_var("POLY_API_PASSPHRASE", "env-pass");
        let creds = ApiCredentials::from_env().unwrap();
        assert_eq!(creds.api_key, "env-key");
        assert_eq!(creds.api_passphrase, "env-pass");

        std::env::remove_var("POLY_API_SECRET");
        match ApiCredentials::from_env() {
            Err(Error::Config { message }) => assert!(message.contains("POLY_API_SECRET")),
            other => panic!("expected config error, got {:?}", other.map(|c| c.api_key)),
        }

        std::env::remove_var("POLY_API_KEY");
        std::env::remove_var("POLY_API_PASSPHRASE");
    }

    fn test_credentials() -> ApiCredentials {
        ApiCredentials::new(
            "test-key".to_string(),
            base64::engine::general_purpose::URL_SAFE.encode("test-secret"),
            "test-passphrase".to_string(),
        )
    }

    #[test]
    fn test_hmac_signature_is_deterministic() {
        let secret = test_credentials().api_secret;
        let body = r#"{"order":"data"}"#;

        let a = build_hmac_signature(&secret, "1700000000", "POST", "/order", Some(body)).unwrap();
        let b = build_hmac_signature(&secret, "1700000000", "POST", "/order", Some(body)).unwrap();

        assert_eq!(a, b);
        assert!(base64::engine::general_purpose::URL_SAFE.decode(&a).is_ok());
    }

    #[test]
    fn test_hmac_signature_covers_every_input() {
        let secret = test_credentials().api_secret;
        let base =
            build_hmac_signature(&secret, "1700000000", "POST", "/order", Some("{\"a\":1}"))
                .unwrap();

        let changed_body =
            build_hmac_signature(&secret, "1700000000", "POST", "/order", Some("{\"a\":2}"))
                .unwrap();
        let pretty_body =
            build_hmac_signature(&secret, "1700000000", "POST", "/order", Some("{\"a\": 1}"))
                .unwrap();
        let changed_ts =
            build_hmac_signature(&secret, "1700000001", "POST", "/order", Some("{\"a\":1}"))
                .unwrap();
        let changed_method =
            build_hmac_signature(&secret, "1700000000", "DELETE", "/order", Some("{\"a\":1}"))
                .unwrap();

        assert_ne!(base, changed_body);
        assert_ne!(base, pretty_body);
        assert_ne!(base, changed_ts);
        assert_ne!(base, changed_method);
    }

    #[test]
    fn test_hmac_secret_alphabets() {
        let raw = b"\xfb\xff\xfe-secret";
        let url_safe = base64::engine::general_purpose::URL_SAFE.encode(raw);
        let standard = base64::engine::general_purpose::STANDARD.encode(raw);

        let a = build_hmac_signature(&url_safe, "1", "GET", "/orders", None).unwrap();
        let b = build_hmac_signature(&standard, "1", "GET", "/orders", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hmac_rejects_invalid_secret() {
        let result = build_hmac_signature("***not base64***", "1", "GET", "/orders", None);
        assert!(matches!(result, Err(Error::Signing { .. })));
    }

    #[test]
    fn test_level_1_headers() {
        let signer = test_signer();
        let headers = level_1_headers_at(&signer, None, 1_700_000_000).unwrap();

        assert_eq!(
            headers[POLY_ADDRESS],
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert_eq!(headers[POLY_TIMESTAMP], "1700000000");
        assert_eq!(headers[POLY_NONCE], "0");
        assert_eq!(headers[POLY_SIGNATURE].len(), 132);
        assert!(!headers.contains_key(POLY_API_KEY));

        let with_nonce = level_1_headers_at(&signer, Some(3), 1_700_000_000).unwrap();
        assert_eq!(with_nonce[POLY_NONCE], "3");
        assert_ne!(with_nonce[POLY_SIGNATURE], headers[POLY_SIGNATURE]);
    }

    #[test]
    fn test_level_2_headers() {
        let signer = test_signer();
        let credentials = test_credentials();
        let body = r#"{"orderID":"abc"}"#;
        let request = RequestArgs::new("DELETE", "/order").with_body(body);

        let headers = level_2_headers_at(&signer, &credentials, &request, 1_700_000_000).unwrap();

        assert_eq!(headers[POLY_API_KEY], "test-key");
        assert_eq!(headers[POLY_PASSPHRASE], "test-passphrase");
        assert_eq!(headers[POLY_TIMESTAMP], "1700000000");
        assert_eq!(
            headers[POLY_SIGNATURE],
            build_hmac_signature(
                &credentials.api_secret,
                "1700000000",
                "DELETE",
                "/order",
                Some(body)
            )
            .unwrap()
        );
        assert!(!headers.contains_key(POLY_NONCE));
    }

    #[test]
    fn test_auth_levels_are_ordered() {
        assert!(AuthLevel::L0 < AuthLevel::L1);
        assert!(AuthLevel::L1 < AuthLevel::L2);
        assert_eq!(AuthLevel::L2.to_string(), "L2");
    }

    #[test]
    fn test_debug_does_not_expose_credentials() {
        let debug_str = format!("{:?}", test_credentials());
        assert!(!debug_str.contains("test-key"));
        assert!(!debug_str.contains("test-passphrase"));
    }
}
