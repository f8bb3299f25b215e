//! Per-exchange requests, domain models, signers and response validators.
//!
//! Each submodule follows the same layout: `types` for the domain models,
//! `requests` for [`NativeRequest`](crate::core::kernel::NativeRequest)
//! implementations, `validator` for the default
//! [`ResponseValidator`], a `signer` when the exchange has private
//! endpoints, and a thin typed `rest` client over an
//! [`ExchangeSession`](crate::core::session::ExchangeSession).

pub mod binance;
pub mod bitbank;
pub mod bitflyer;
pub mod coincheck;
pub mod gmocoin;
pub mod upbit;

use crate::core::config::Credentials;
use crate::core::errors::ClientError;
use crate::core::exchange::Exchange;
use crate::core::kernel::{AuthSigner, HttpResponseData, ResponseValidator};
use crate::core::message::NativeMessage;
use reqwest::header::HeaderValue;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Signer for `exchange`, or `None` when this crate exposes no private
/// endpoints for it.
pub fn auth_signer(
    exchange: Exchange,
    credentials: &Credentials,
) -> Result<Option<Arc<dyn AuthSigner>>, ClientError> {
    if HeaderValue::from_str(credentials.api_key()).is_err() {
        return Err(ClientError::Configuration(format!(
            "{} API key contains characters not allowed in an HTTP header",
            exchange
        )));
    }

    let credentials = credentials.clone();
    let signer: Arc<dyn AuthSigner> = match exchange {
        Exchange::BitFlyer => Arc::new(bitflyer::BitFlyerSigner::new(credentials)),
        Exchange::Bitbank => Arc::new(bitbank::BitbankSigner::new(credentials)),
        Exchange::Coincheck => Arc::new(coincheck::CoincheckSigner::new(credentials)),
        Exchange::Binance => Arc::new(binance::BinanceSigner::new(credentials)),
        Exchange::GmoCoin | Exchange::Upbit => {
            warn!(exchange = %exchange, "credentials ignored: no private endpoints");
            return Ok(None);
        }
    };
    Ok(Some(signer))
}

/// The validator a session installs ahead of user validators.
pub fn response_validator(exchange: Exchange) -> Arc<dyn ResponseValidator> {
    match exchange {
        Exchange::BitFlyer => Arc::new(bitflyer::BitFlyerValidator),
        Exchange::Bitbank => Arc::new(bitbank::BitbankValidator),
        Exchange::Coincheck => Arc::new(coincheck::CoincheckValidator),
        Exchange::GmoCoin => Arc::new(gmocoin::GmoCoinValidator),
        Exchange::Binance => Arc::new(binance::BinanceValidator),
        Exchange::Upbit => Arc::new(upbit::UpbitValidator),
    }
}

/// Error bodies are often HTML from a proxy; those read as `Null`.
pub(crate) fn error_body(message: &NativeMessage) -> Value {
    serde_json::from_str(message.raw()).unwrap_or(Value::Null)
}

/// Error codes arrive as numbers or strings; strings lose their quotes.
pub(crate) fn code_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn exchange_error(
    exchange: Exchange,
    response: &HttpResponseData,
    code: Option<String>,
    message: &str,
    native: &NativeMessage,
) -> ClientError {
    ClientError::Exchange {
        exchange,
        http_status: response.status,
        code,
        message: message.to_string(),
        body: native.raw().to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::exchange::{Exchange, Visibility};
    use crate::core::kernel::{CallContext, HttpResponseData};
    use reqwest::header::HeaderMap;
    use reqwest::{Method, Url};
    use std::time::Duration;

    pub fn context(exchange: Exchange) -> CallContext {
        CallContext {
            call_id: 1,
            exchange,
            visibility: Visibility::Public,
            endpoint_class: "test".to_string(),
        }
    }

    pub fn response(status: u16, body: &str) -> HttpResponseData {
        HttpResponseData {
            status,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
            elapsed: Duration::ZERO,
            url: Url::parse("https://example.invalid/").unwrap(),
            method: Method::GET,
        }
    }
}
