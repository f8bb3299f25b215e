use super::types::{GmoOrderBook, GmoTicker};
use crate::core::errors::ClientError;
use crate::core::exchange::Exchange;
use crate::core::kernel::{decode_json, EndpointPath, NativeRequest};

/// `GET /public/v1/ticker`. All symbols unless one is given.
#[derive(Debug, Clone, Default)]
pub struct GetTicker {
    pub symbol: Option<String>,
}

impl GetTicker {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
        }
    }
}

impl NativeRequest for GetTicker {
    type Output = Vec<GmoTicker>;

    fn exchange(&self) -> Exchange {
        Exchange::GmoCoin
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("ticker")
    }

    fn query(&self) -> Vec<(String, String)> {
        self.symbol
            .iter()
            .map(|symbol| ("symbol".to_string(), symbol.clone()))
            .collect()
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::GmoCoin, content)
    }
}

/// `GET /public/v1/orderbooks?symbol=`
#[derive(Debug, Clone)]
pub struct GetOrderBooks {
    pub symbol: String,
}

impl GetOrderBooks {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl NativeRequest for GetOrderBooks {
    type Output = GmoOrderBook;

    fn exchange(&self) -> Exchange {
        Exchange::GmoCoin
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("orderbooks")
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("symbol".to_string(), self.symbol.clone())]
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::GmoCoin, content)
    }
}
