use crate::core::errors::ClientError;
use crate::core::exchange::Exchange;
use crate::core::kernel::{CallContext, HttpResponseData, ResponseValidator};
use crate::core::message::NativeMessage;
use crate::exchanges::{code_text, error_body, exchange_error};

/// Rejects non-2xx responses, reading `status` and `error_message` from
/// bodies like `{"status":-500,"error_message":"Invalid signature","data":null}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitFlyerValidator;

impl ResponseValidator for BitFlyerValidator {
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
        let code = body.get("status").map(code_text);
        let text = body
            .get("error_message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error");
        Err(exchange_error(Exchange::BitFlyer, response, code, text, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::test_support::{context, response};

    #[test]
    fn test_error_body_becomes_exchange_error() {
        let raw = r#"{"status":-500,"error_message":"Invalid signature","data":null}"#;
        let message = NativeMessage::new(Exchange::BitFlyer, raw);
        let err = BitFlyerValidator
            .validate(&context(Exchange::BitFlyer), &response(401, raw), &message)
            .unwrap_err();
        assert_eq!(err.exchange_code(), Some("-500"));
        assert!(err.to_string().contains("Invalid signature"));
    }

    #[test]
    fn test_success_passes() {
        let raw = r#"{"product_code":"BTC_JPY"}"#;
        let message = NativeMessage::new(Exchange::BitFlyer, raw);
        assert!(BitFlyerValidator
            .validate(&context(Exchange::BitFlyer), &response(200, raw), &message)
            .is_ok());
    }
}
