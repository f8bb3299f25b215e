use crate::core::config::Credentials;
use crate::core::kernel::{hmac_sha256_hex, AuthSigner, SignatureResult, SigningInput};
use std::collections::HashMap;

/// bitFlyer Lightning: HMAC-SHA256 over `timestamp + METHOD + path[?query] + body`.
pub struct BitFlyerSigner {
    credentials: Credentials,
}

impl BitFlyerSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    fn message(input: &SigningInput<'_>) -> String {
        let mut message = format!("{}{}{}", input.timestamp, input.method, input.path);
        if !input.query_string.is_empty() {
            message.push('?');
            message.push_str(input.query_string);
        }
        message.push_str(input.body);
        message
    }
}

impl AuthSigner for BitFlyerSigner {
    fn sign_request(&self, input: &SigningInput<'_>) -> SignatureResult {
        let signature = hmac_sha256_hex(self.credentials.api_secret(), &Self::message(input))?;

        let mut headers = HashMap::new();
        headers.insert("ACCESS-KEY".to_string(), self.credentials.api_key().to_string());
        headers.insert("ACCESS-TIMESTAMP".to_string(), input.timestamp.to_string());
        headers.insert("ACCESS-SIGN".to_string(), signature);

        Ok((headers, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, Url};

    #[test]
    fn test_get_message_includes_query() {
        let url =
            Url::parse("https://api.bitflyer.com/v1/me/getchildorders?product_code=BTC_JPY")
                .unwrap();
        let input = SigningInput {
            method: &Method::GET,
            url: &url,
            path: url.path(),
            query_string: url.query().unwrap_or(""),
            body: "",
            timestamp: 1_640_000_000_000,
        };
        assert_eq!(
            BitFlyerSigner::message(&input),
            "1640000000000GET/v1/me/getchildorders?product_code=BTC_JPY"
        );
    }

    #[test]
    fn test_post_message_appends_body() {
        let url = Url::parse("https://api.bitflyer.com/v1/me/sendchildorder").unwrap();
        let body = r#"{"product_code":"BTC_JPY"}"#;
        let input = SigningInput {
            method: &Method::POST,
            url: &url,
            path: url.path(),
            query_string: "",
            body,
            timestamp: 1,
        };
        let signer = BitFlyerSigner::new(Credentials::new("key", "secret"));
        let (headers, query) = signer.sign_request(&input).unwrap();

        assert!(query.is_empty());
        assert_eq!(headers["ACCESS-KEY"], "key");
        assert_eq!(headers["ACCESS-TIMESTAMP"], "1");
        assert_eq!(
            headers["ACCESS-SIGN"],
            hmac_sha256_hex("secret", &format!("1POST/v1/me/sendchildorder{}", body)).unwrap()
        );
    }
}
