use crate::core::errors::ClientError;
use crate::core::exchange::Exchange;
use crate::core::kernel::{CallContext, HttpResponseData, ResponseValidator};
use crate::core::message::NativeMessage;
use crate::exchanges::{code_text, error_body, exchange_error};

/// Reads `{"error":{"name":..,"message":..}}` from non-2xx responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpbitValidator;

impl ResponseValidator for UpbitValidator {
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
        let error = body.get("error");
        let code = error.and_then(|e| e.get("name")).map(code_text);
        let text = error
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("No error message");
        Err(exchange_error(Exchange::Upbit, response, code, text, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::test_support::{context, response};

    #[test]
    fn test_error_name_is_code() {
        let raw = r#"{"error":{"name":"invalid_parameter","message":"markets missing"}}"#;
        let message = NativeMessage::new(Exchange::Upbit, raw);
        let err = UpbitValidator
            .validate(&context(Exchange::Upbit), &response(400, raw), &message)
            .unwrap_err();
        assert_eq!(err.exchange_code(), Some("invalid_parameter"));
        assert!(err.to_string().contains("markets missing"));
    }

    #[test]
    fn test_non_json_error_body() {
        let raw = "<html>Bad Gateway</html>";
        let message = NativeMessage::new(Exchange::Upbit, raw);
        let err = UpbitValidator
            .validate(&context(Exchange::Upbit), &response(502, raw), &message)
            .unwrap_err();
        assert_eq!(err.exchange_code(), None);
        assert!(matches!(err, ClientError::Exchange { http_status: 502, .. }));
    }
}
