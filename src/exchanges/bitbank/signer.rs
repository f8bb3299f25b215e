use crate::core::config::Credentials;
use crate::core::kernel::{hmac_sha256_hex, AuthSigner, SignatureResult, SigningInput};
use reqwest::Method;
use std::collections::HashMap;

/// Milliseconds a signed request stays valid after `ACCESS-REQUEST-TIME`.
pub const TIME_WINDOW_MS: u64 = 5000;

/// bitbank: HMAC-SHA256 over `request_time + time_window` followed by the
/// JSON body for POST, or by `path[?query]` otherwise.
pub struct BitbankSigner {
    credentials: Credentials,
    time_window_ms: u64,
}

impl BitbankSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            time_window_ms: TIME_WINDOW_MS,
        }
    }

    #[must_use]
    pub fn with_time_window(mut self, time_window_ms: u64) -> Self {
        self.time_window_ms = time_window_ms;
        self
    }

    fn message(&self, input: &SigningInput<'_>) -> String {
        let mut message = format!("{}{}", input.timestamp, self.time_window_ms);
        if *input.method == Method::POST {
            message.push_str(input.body);
        } else {
            message.push_str(input.path);
            if !input.query_string.is_empty() {
                message.push('?');
                message.push_str(input.query_string);
            }
        }
        message
    }
}

impl AuthSigner for BitbankSigner {
    fn sign_request(&self, input: &SigningInput<'_>) -> SignatureResult {
        let signature = hmac_sha256_hex(self.credentials.api_secret(), &self.message(input))?;

        let mut headers = HashMap::new();
        headers.insert("ACCESS-KEY".to_string(), self.credentials.api_key().to_string());
        headers.insert("ACCESS-REQUEST-TIME".to_string(), input.timestamp.to_string());
        headers.insert("ACCESS-TIME-WINDOW".to_string(), self.time_window_ms.to_string());
        headers.insert("ACCESS-SIGNATURE".to_string(), signature);

        Ok((headers, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    fn signer() -> BitbankSigner {
        BitbankSigner::new(Credentials::new("key", "secret"))
    }

    #[test]
    fn test_get_message_is_time_window_and_path() {
        let url = Url::parse("https://api.bitbank.cc/v1/user/assets").unwrap();
        let input = SigningInput {
            method: &Method::GET,
            url: &url,
            path: url.path(),
            query_string: "",
            body: "",
            timestamp: 1_640_000_000_000,
        };
        assert_eq!(signer().message(&input), "16400000000005000/v1/user/assets");
    }

    #[test]
    fn test_post_message_uses_body_only() {
        let url = Url::parse("https://api.bitbank.cc/v1/user/spot/order").unwrap();
        let body = r#"{"pair":"btc_jpy","amount":"0.0001","price":"17000000","side":"sell","type":"limit"}"#;
        let input = SigningInput {
            method: &Method::POST,
            url: &url,
            path: url.path(),
            query_string: "",
            body,
            timestamp: 1_640_000_000_000,
        };
        assert_eq!(signer().message(&input), format!("16400000000005000{}", body));

        let (headers, _) = signer().sign_request(&input).unwrap();
        assert_eq!(headers["ACCESS-TIME-WINDOW"], "5000");
        assert_eq!(headers["ACCESS-REQUEST-TIME"], "1640000000000");
        assert_eq!(headers["ACCESS-SIGNATURE"].len(), 64);
    }
}
