use crate::core::config::Credentials;
use crate::core::kernel::{hmac_sha256_hex, AuthSigner, SignatureResult, SigningInput};
use std::collections::HashMap;

/// Default `recvWindow` in milliseconds.
pub const RECV_WINDOW_MS: u64 = 5000;

/// BINANCE: HMAC-SHA256 over the query string extended with `recvWindow`
/// and `timestamp`. The signature travels as the final query parameter.
pub struct BinanceSigner {
    credentials: Credentials,
    recv_window_ms: u64,
}

impl BinanceSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            recv_window_ms: RECV_WINDOW_MS,
        }
    }

    #[must_use]
    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window_ms = recv_window_ms;
        self
    }

    fn signed_params(&self, timestamp: u64) -> Vec<(String, String)> {
        vec![
            ("recvWindow".to_string(), self.recv_window_ms.to_string()),
            ("timestamp".to_string(), timestamp.to_string()),
        ]
    }
}

impl AuthSigner for BinanceSigner {
    fn sign_request(&self, input: &SigningInput<'_>) -> SignatureResult {
        let mut params = self.signed_params(input.timestamp);
        let extra = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let payload = if input.query_string.is_empty() {
            extra
        } else {
            format!("{}&{}", input.query_string, extra)
        };

        let signature = hmac_sha256_hex(self.credentials.api_secret(), &payload)?;
        params.push(("signature".to_string(), signature));

        let mut headers = HashMap::new();
        headers.insert("X-MBX-APIKEY".to_string(), self.credentials.api_key().to_string());

        Ok((headers, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, Url};

    #[test]
    fn test_signature_covers_query_and_timestamp() {
        let signer = BinanceSigner::new(Credentials::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A",
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
        ));
        let url = Url::parse("https://api.binance.com/api/v3/account").unwrap();
        let input = SigningInput {
            method: &Method::GET,
            url: &url,
            path: url.path(),
            query_string: "symbol=LTCBTC",
            body: "",
            timestamp: 1_499_827_319_559,
        };
        let (headers, params) = signer.sign_request(&input).unwrap();
        assert!(headers["X-MBX-APIKEY"].starts_with("vmPUZE6mv9"));
        let names: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["recvWindow", "timestamp", "signature"]);

        let expected = hmac_sha256_hex(
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
            "symbol=LTCBTC&recvWindow=5000&timestamp=1499827319559",
        )
        .unwrap();
        assert_eq!(params[2].1, expected);
    }
}
