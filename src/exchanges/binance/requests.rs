use super::types::{BinanceAccount, BinanceDepth, BinanceTicker, ExchangeInfo};
use crate::core::errors::ClientError;
use crate::core::exchange::{Exchange, Visibility};
use crate::core::kernel::{decode_json, EndpointPath, NativeRequest};

/// Request weight is shared by every `/api/v3` endpoint.
const WEIGHT_CLASS: &str = "request_weight";

/// `GET /api/v3/ticker/24hr?symbol=`
#[derive(Debug, Clone)]
pub struct GetTicker24hr {
    pub symbol: String,
}

impl GetTicker24hr {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl NativeRequest for GetTicker24hr {
    type Output = BinanceTicker;

    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["ticker"], "24hr")
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("symbol".to_string(), self.symbol.clone())]
    }

    fn endpoint_class(&self) -> String {
        WEIGHT_CLASS.to_string()
    }

    fn weight(&self) -> u32 {
        2
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Binance, content)
    }
}

/// `GET /api/v3/depth?symbol=&limit=`. `limit` must be within 1..=5000.
#[derive(Debug, Clone)]
pub struct GetDepth {
    pub symbol: String,
    pub limit: Option<u32>,
}

impl GetDepth {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            limit: None,
        }
    }

    pub fn with_limit(symbol: impl Into<String>, limit: u32) -> Result<Self, ClientError> {
        if !(1..=5000).contains(&limit) {
            return Err(ClientError::Configuration(format!(
                "depth limit must be within 1..=5000, got {}",
                limit
            )));
        }
        Ok(Self {
            symbol: symbol.into(),
            limit: Some(limit),
        })
    }
}

impl NativeRequest for GetDepth {
    type Output = BinanceDepth;

    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("depth")
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![("symbol".to_string(), self.symbol.clone())];
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }

    fn endpoint_class(&self) -> String {
        WEIGHT_CLASS.to_string()
    }

    fn weight(&self) -> u32 {
        match self.limit.unwrap_or(100) {
            0..=100 => 5,
            101..=500 => 25,
            501..=1000 => 50,
            _ => 250,
        }
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Binance, content)
    }
}

/// `GET /api/v3/exchangeInfo`
#[derive(Debug, Clone, Default)]
pub struct GetExchangeInfo {
    pub symbols: Vec<String>,
}

impl NativeRequest for GetExchangeInfo {
    type Output = ExchangeInfo;

    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("exchangeInfo")
    }

    fn query(&self) -> Vec<(String, String)> {
        match self.symbols.as_slice() {
            [] => Vec::new(),
            [symbol] => vec![("symbol".to_string(), symbol.clone())],
            symbols => {
                let quoted: Vec<String> = symbols.iter().map(|s| format!("\"{}\"", s)).collect();
                vec![("symbols".to_string(), format!("[{}]", quoted.join(",")))]
            }
        }
    }

    fn endpoint_class(&self) -> String {
        WEIGHT_CLASS.to_string()
    }

    fn weight(&self) -> u32 {
        20
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Binance, content)
    }
}

/// `GET /api/v3/account` (signed).
#[derive(Debug, Clone, Default)]
pub struct GetAccount {
    pub omit_zero_balances: bool,
}

impl NativeRequest for GetAccount {
    type Output = BinanceAccount;

    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("account")
    }

    fn query(&self) -> Vec<(String, String)> {
        if self.omit_zero_balances {
            vec![("omitZeroBalances".to_string(), "true".to_string())]
        } else {
            Vec::new()
        }
    }

    fn endpoint_class(&self) -> String {
        WEIGHT_CLASS.to_string()
    }

    fn weight(&self) -> u32 {
        20
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Binance, content)
    }
}
