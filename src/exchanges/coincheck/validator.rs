use crate::core::errors::ClientError;
use crate::core::exchange::Exchange;
use crate::core::kernel::{CallContext, HttpResponseData, ResponseValidator};
use crate::core::message::NativeMessage;
use crate::exchanges::{error_body, exchange_error};

/// Rejects non-2xx responses shaped like `{"success":false,"error":"invalid authentication"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoincheckValidator;

impl ResponseValidator for CoincheckValidator {
    fn validate(
        &self,
        _ctx: &CallContext,
        response: &HttpResponseData,
        message: &NativeMessage,
    ) -> Result<(), ClientError> {
        if response.is_success() {
            return Ok(());
        }
        let body = error_body(message);
        let code = body
            .get("success")
            .and_then(|v| v.as_bool())
            .map(|success| success.to_string());
        let text = body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error");
        Err(exchange_error(Exchange::Coincheck, response, code, text, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::test_support::{context, response};

    #[test]
    fn test_authentication_error() {
        let raw = r#"{"success":false,"error":"invalid authentication"}"#;
        let message = NativeMessage::new(Exchange::Coincheck, raw);
        let err = CoincheckValidator
            .validate(&context(Exchange::Coincheck), &response(401, raw), &message)
            .unwrap_err();
        assert_eq!(err.exchange_code(), Some("false"));
        assert!(err.to_string().contains("invalid authentication"));
    }
}
