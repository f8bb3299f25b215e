use crate::core::errors::ClientError;
use crate::core::exchange::Exchange;
use crate::core::kernel::{CallContext, HttpResponseData, ResponseValidator};
use crate::core::message::{Metadata, NativeMessage};
use crate::exchanges::{code_text, error_body, exchange_error};

/// Fails on non-2xx or `status != 0`, joining every
/// `messages[].message_code: message_string` into the error message.
#[derive(Debug, Clone, Copy, Default)]
pub struct GmoCoinValidator;

impl ResponseValidator for GmoCoinValidator {
    fn validate(
        &self,
        _ctx: &CallContext,
        response: &HttpResponseData,
        message: &NativeMessage,
    ) -> Result<(), ClientError> {
        let api_ok =
            !matches!(message.metadata(), Ok(Metadata::Status { status, .. }) if *status != 0);
        if response.is_success() && api_ok {
            return Ok(());
        }

        let body = error_body(message);
        let code = body.get("status").map(code_text);
        let messages: Vec<String> = body
            .get("messages")
            .and_then(|v| v.as_array())
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| {
                        format!(
                            "{}: {}",
                            entry.get("message_code").and_then(|v| v.as_str()).unwrap_or("?"),
                            entry.get("message_string").and_then(|v| v.as_str()).unwrap_or("")
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        let text = if messages.is_empty() {
            "Unknown error".to_string()
        } else {
            messages.join("; ")
        };
        Err(exchange_error(Exchange::GmoCoin, response, code, &text, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::test_support::{context, response};

    #[test]
    fn test_status_one_joins_messages() {
        let raw = r#"{"status":1,"messages":[
            {"message_code":"ERR-5201","message_string":"MAINTENANCE."},
            {"message_code":"ERR-5003","message_string":"Requests are too many."}],
            "responsetime":"2019-03-19T02:15:06.026Z"}"#;
        let message = NativeMessage::new(Exchange::GmoCoin, raw);
        let err = GmoCoinValidator
            .validate(&context(Exchange::GmoCoin), &response(200, raw), &message)
            .unwrap_err();
        assert_eq!(err.exchange_code(), Some("1"));
        assert!(err
            .to_string()
            .contains("ERR-5201: MAINTENANCE.; ERR-5003: Requests are too many."));
    }

    #[test]
    fn test_status_zero_passes() {
        let raw = r#"{"status":0,"data":[],"responsetime":"2019-03-19T02:15:06.026Z"}"#;
        let message = NativeMessage::new(Exchange::GmoCoin, raw);
        assert!(GmoCoinValidator
            .validate(&context(Exchange::GmoCoin), &response(200, raw), &message)
            .is_ok());
    }
}
