use super::types::UpbitTicker;
use crate::core::errors::ClientError;
use crate::core::exchange::Exchange;
use crate::core::kernel::{decode_json, EndpointPath, NativeRequest};

/// `GET /v1/ticker?markets=KRW-BTC,KRW-ETH`
#[derive(Debug, Clone)]
pub struct GetTicker {
    pub markets: Vec<String>,
}

impl GetTicker {
    pub fn new<I, S>(markets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markets: markets.into_iter().map(Into::into).collect(),
        }
    }
}

impl NativeRequest for GetTicker {
    type Output = Vec<UpbitTicker>;

    fn exchange(&self) -> Exchange {
        Exchange::Upbit
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("ticker")
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("markets".to_string(), self.markets.join(","))]
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Upbit, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markets_joined_with_commas() {
        let request = GetTicker::new(["KRW-BTC", "KRW-ETH"]);
        assert_eq!(
            request.query(),
            vec![("markets".to_string(), "KRW-BTC,KRW-ETH".to_string())]
        );
        assert_eq!(
            request.endpoint().compose(&request.api_root()).unwrap().as_str(),
            "https://api.upbit.com/v1/ticker"
        );
    }
}
