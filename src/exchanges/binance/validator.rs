use crate::core::errors::ClientError;
use crate::core::exchange::Exchange;
use crate::core::kernel::{CallContext, HttpResponseData, ResponseValidator};
use crate::core::message::NativeMessage;
use crate::exchanges::{code_text, error_body, exchange_error};

/// Reads `{"code":-1121,"msg":"Invalid symbol."}` from non-2xx responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinanceValidator;

impl ResponseValidator for BinanceValidator {
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
        let code = body.get("code").map(code_text);
        let text = body
            .get("msg")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error");
        Err(exchange_error(Exchange::Binance, response, code, text, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::test_support::{context, response};

    #[test]
    fn test_negative_code() {
        let raw = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
        let message = NativeMessage::new(Exchange::Binance, raw);
        let err = BinanceValidator
            .validate(&context(Exchange::Binance), &response(400, raw), &message)
            .unwrap_err();
        assert_eq!(err.exchange_code(), Some("-1121"));
        assert!(err.to_string().contains("Invalid symbol."));
    }
}
