use crate::core::config::Credentials;
use crate::core::kernel::{hmac_sha256_hex, AuthSigner, SignatureResult, SigningInput};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Coincheck: HMAC-SHA256 over `nonce + full URL + body`.
///
/// The exchange rejects a nonce that is not larger than the previous one,
/// so nonces are the request time in milliseconds bumped past the last
/// nonce this signer issued.
pub struct CoincheckSigner {
    credentials: Credentials,
    last_nonce: AtomicU64,
}

impl CoincheckSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            last_nonce: AtomicU64::new(0),
        }
    }

    fn next_nonce(&self, timestamp: u64) -> u64 {
        let previous = self
            .last_nonce
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(timestamp.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        timestamp.max(previous + 1)
    }
}

impl AuthSigner for CoincheckSigner {
    fn sign_request(&self, input: &SigningInput<'_>) -> SignatureResult {
        let nonce = self.next_nonce(input.timestamp).to_string();
        let message = format!("{}{}{}", nonce, input.url, input.body);
        let signature = hmac_sha256_hex(self.credentials.api_secret(), &message)?;

        let mut headers = HashMap::new();
        headers.insert("ACCESS-KEY".to_string(), self.credentials.api_key().to_string());
        headers.insert("ACCESS-NONCE".to_string(), nonce);
        headers.insert("ACCESS-SIGNATURE".to_string(), signature);

        Ok((headers, Vec::new()))
    }
}
