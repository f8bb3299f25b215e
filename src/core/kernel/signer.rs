use crate::core::errors::ClientError;
use hmac::{Hmac, Mac};
use reqwest::{Method, Url};
use sha2::Sha256;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Result type for signing operations: (headers, `query_additions`)
pub type SignatureResult = Result<(HashMap<String, String>, Vec<(String, String)>), ClientError>;

/// Canonical view of a request handed to a signer.
#[derive(Debug, Clone, Copy)]
pub struct SigningInput<'a> {
    pub method: &'a Method,
    /// Absolute URL including the unsigned query string.
    pub url: &'a Url,
    /// Path component only, e.g. `/v1/me/getbalance`.
    pub path: &'a str,
    /// Query string without the leading '?'.
    pub query_string: &'a str,
    pub body: &'a str,
    /// Request timestamp in milliseconds.
    pub timestamp: u64,
}

/// Per-exchange authentication.
///
/// Implementations hold their own credentials and must be deterministic for
/// a fixed timestamp (or nonce). Output values are treated as secrets by the
/// pipeline and never logged in clear.
pub trait AuthSigner: Send + Sync {
    /// Headers and query parameters to attach to the request.
    fn sign_request(&self, input: &SigningInput<'_>) -> SignatureResult;
}

/// Lowercase hex HMAC-SHA256 of `message`.
pub fn hmac_sha256_hex(secret: &str, message: &str) -> Result<String, ClientError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ClientError::Configuration(format!("Invalid secret key: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Current wall-clock time in milliseconds.
pub fn timestamp_millis() -> Result<u64, ClientError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| ClientError::Configuration(format!("System time error: {}", e)))
}
