use crate::core::errors::ClientError;
use crate::core::exchange::Exchange;
use crate::core::kernel::{CallContext, HttpResponseData, ResponseValidator};
use crate::core::message::{Metadata, NativeMessage};
use crate::exchanges::{code_text, error_body, exchange_error};

/// bitbank answers most failures with HTTP 200 and
/// `{"success":0,"data":{"code":20003}}`, so the envelope flag is checked
/// along with the status.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitbankValidator;

impl ResponseValidator for BitbankValidator {
    fn validate(
        &self,
        _ctx: &CallContext,
        response: &HttpResponseData,
        message: &NativeMessage,
    ) -> Result<(), ClientError> {
        let succeeded = matches!(message.metadata(), Ok(Metadata::Success { success: 1 }));
        if response.is_success() && succeeded {
            return Ok(());
        }

        let body = error_body(message);
        let code = body.pointer("/data/code").map(code_text);
        let text = match code.as_deref() {
            Some(code) => error_message(code)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Unknown error (code: {})", code)),
            None => "Unknown error".to_string(),
        };
        Err(exchange_error(Exchange::Bitbank, response, code, &text, message))
    }
}

/// Message for a bitbank error code.
pub fn error_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "10000" => "Url not found.",
        "10001" => "System error.",
        "10002" => "Malformed request.",
        "10003" => "System error.",
        "10005" => "Timeout waiting for response.",
        "10007" => "System maintenance.",
        "10008" => "Server is busy. Retry later.",
        "10009" => "You sent requests too frequently. Retry later with decreased requests.",
        "20001" => "Authentication failed api authorization.",
        "20002" => "Invalid ACCESS-KEY.",
        "20003" => "ACCESS-KEY not found.",
        "20004" => "ACCESS-NONCE not found.",
        "20005" => "Invalid ACCESS-SIGNATURE.",
        "20011" => "MFA failed.",
        "20014" => "SMS verification failed.",
        "20018" => "Please login. (This happens when you request API without `/v1/`.)",
        "20019" => "Please login. (This also happens when you request API without `/v1/`.)",
        "20023" => "Missing OTP code.",
        "20024" => "Missing SMS code.",
        "20025" => "Missing OTP and SMS code.",
        "20026" => {
            "MFA is temporarily locked because too many failures. Please retry after 60 seconds."
        }
        "20033" => "ACCESS-REQUEST-TIME not found.",
        "20034" => "Invalid time of ACCESS-REQUEST-TIME.",
        "20035" => "No request was sent within ACCESS-TIME-WINDOW.",
        "20036" => "ACCESS-REQUEST-TIME and ACCESS-NONCE not found.",
        "20037" => "Invalid ACCESS-REQUEST-TIME.",
        "20038" => "Invalid ACCESS-TIME-WINDOW.",
        "20039" => "Invalid ACCESS-NONCE.",
        "30001" => "Required order quantity.",
        "30006" => "Required order id.",
        "30007" => "Required order id array.",
        "30009" => "Required asset.",
        "30012" => "Required amount.",
        "30013" => "Required order type.",
        "30015" => "Required order side.",
        "30016" => "Required asset.",
        "30019" => "Required uuid.",
        "30039" => "Required price.",
        "30101" => "Required trigger price.",
        "30107" => "Required 'pair'.",
        "30113" => "Please specify 'since' or 'end' param.",
        "30117" => "Required 'stop' or 'stop_limit'.",
        "30120" => "Required 'stop_id' or 'stop_ids'.",
        "30121" => "Too many stop order ids.",
        "30122" => "Required 'stop_price' or 'stop_trigger_price'.",
        "30123" => "Stop order id does not found.",
        "40001" => "Invalid order quantity.",
        "40006" => "Invalid count.",
        "40007" => "Invalid end param.",
        "40008" => "Invalid end_id param.",
        "40009" => "Invalid from_id param.",
        "40013" => "Invalid order id.",
        "40014" => "Invalid order id array.",
        "40015" => "Invalid order type.",
        "40016" => "Invalid asset.",
        "40017" => "Invalid order side.",
        "40020" => "Invalid uuid.",
        "40021" => "Invalid price.",
        "40025" => "Invalid amount.",
        "40028" => "Invalid since param.",
        "40048" => "Invalid user withdrawal limit.",
        "40112" => "Invalid request body.",
        "40113" => "Invalid pair.",
        "40114" => "Invalid json format.",
        "40121" => "Invalid stop order type.",
        "40122" => "Invalid stop order side.",
        "40123" => "Invalid stop price.",
        "40124" => "Invalid stop order quantity.",
        "40126" => "Invalid stop trigger price.",
        "40127" => "pair does not match.",
        "40200" => "Invalid order.",
        "50003" => "Account is restricted.",
        "50004" => "Account is provisional.",
        "50005" => "Account is blocked.",
        "50006" => "Account is blocked.",
        "50008" => "Identity verification is not confirmed.",
        "50009" => "Order not found.",
        "50010" => "Order can not be canceled.",
        "50011" => "Api not found.",
        "50026" => "Order has already been canceled.",
        "50027" => "Order has already been executed.",
        "50028" => "Buy order has already been placed.",
        "50029" => "Sell order has already been placed.",
        "50030" => "Buy and Sell orders have already been placed.",
        "50031" => "Stop order has already been placed.",
        "50032" => "Stop order has already been canceled.",
        "50033" => "Stop order has already been triggered.",
        "50034" => "Order does not exist.",
        "50035" => "Stop order does not exist.",
        "50036" => "Too many stop orders.",
        "50037" => "Too many stop orders for same pair.",
        "50038" => "Too many stop orders for all pairs.",
        "50040" => "Pair suspension.",
        "50041" => "Pair has already been suspended. Pair will become active shortly.",
        "50042" => "Order or stop order has already been canceled.",
        "50043" => "Cannot create buy order while short position exists.",
        "50044" => "Cannot create sell order while long position exists.",
        "50050" => "Withdrawal account registration has not been completed.",
        "50052" => "Withdrawal destination is not registered.",
        "50064" => "Withdrawal is restricted.",
        "50065" => "Withdrawal is disabled.",
        "50066" => "Withdrawal amount is over monthly limit.",
        "50067" => "Deposit is disabled.",
        "50068" => "Withdrawal is disabled temporary.",
        "50069" => "Deposit is disabled temporary.",
        "50070" => "User margin flag is off. Use 'Spot' account to create orders.",
        "50071" => "User spot flag is off. Use 'Margin' account to create orders.",
        "50072" => "Cannot specify both user spot and margin flags.",
        "50073" => "Spot trading is disabled.",
        "50074" => "Margin trading is disabled.",
        "50075" => "Spot trading is temporarily disabled.",
        "50076" => "Margin trading is temporarily disabled.",
        "50077" => "Lending is temporarily disabled.",
        "50078" => "Cannot lend or borrow asset while position exists.",
        "50079" => "Too many lending offers.",
        "50080" => "Loan cannot be canceled.",
        "50081" => "Lending/borrowing is disabled.",
        "50082" => "Too many open loan offers.",
        "50083" => "Withdrawal is limited temporarily until collateral coverage is recovered.",
        "60001" => "Insufficient amount.",
        "60002" => "Market buy order quantity exceeded upper limit.",
        "60003" => "Order quantity exceeded limit.",
        "60004" => "Order quantity is below lower threshold.",
        "60005" => "Order price exceeded upper limit.",
        "60006" => "Order price is below lower limit.",
        "60011" => "Too many simultaneous orders.",
        "60016" => "Trigger price exceeded upper limit.",
        "60017" => "Withdrawal amount exceeded upper limit.",
        "60018" => "Trigger price can not be specified to trigger immediately.",
        "60019" => "TakeProfit/StopLoss order side must be in close direction.",
        "60020" => "Withdrawal amount is below lower limit.",
        "70001" => "System error.",
        "70002" => "System is currently unavailable.",
        "70003" => "Please wait and try again.",
        "70004" => "Too many orders are queued.",
        "70010" => "Too many orders.",
        "70011" => "Too many orders are queued. Please wait and try again.",
        "70012" => "Too many conditional orders.",
        "70013" => "Too many conditional orders are queued. Please wait and try again.",
        "70014" => "Too many cancel or update orders.",
        "70015" => "Too many cancel or update orders are queued. Please wait and try again.",
        "70016" => "Received an incorrect order.",
        "70017" => "From/To reversed.",
        "70018" => "Too many requests via web.",
        "70019" => "Too many requests via app.",
        "70020" => "Too many requests via api.",
        "70021" => "Too many requests.",
        "70022" => "Too many requests at the same time.",
        "70023" => "Too many requests are queued. Please wait and try again.",
        "70024" => "Too many requests via api v3.",
        "70025" => "Too many requests via api v1.",
        "70026" => "Too many requests.",
        _ => return None,
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::test_support::{context, response};

    fn validate(status: u16, raw: &str) -> Result<(), ClientError> {
        let message = NativeMessage::new(Exchange::Bitbank, raw);
        BitbankValidator.validate(&context(Exchange::Bitbank), &response(status, raw), &message)
    }

    #[test]
    fn test_success_flag_zero_fails_with_http_200() {
        let err = validate(200, r#"{"success":0,"data":{"code":20003}}"#).unwrap_err();
        assert_eq!(err.exchange_code(), Some("20003"));
        assert!(err.to_string().contains("ACCESS-KEY not found."));
    }

    #[test]
    fn test_unknown_code() {
        let err = validate(200, r#"{"success":0,"data":{"code":"99999"}}"#).unwrap_err();
        assert!(err.to_string().contains("Unknown error (code: 99999)"));
    }

    #[test]
    fn test_success_passes() {
        assert!(validate(200, r#"{"success":1,"data":{"last":"1","vol":"2"}}"#).is_ok());
    }
}
