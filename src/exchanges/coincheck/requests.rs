use super::types::{
    split_balances, CoincheckOrderBook, CoincheckTicker, CurrencyBalance, UnsettledOrder,
};
use crate::core::errors::ClientError;
use crate::core::exchange::{Exchange, Visibility};
use crate::core::kernel::{decode_json, EndpointPath, NativeRequest};

/// `GET /api/ticker?pair=`
#[derive(Debug, Clone)]
pub struct GetTicker {
    pub pair: String,
}

impl GetTicker {
    pub fn new(pair: impl Into<String>) -> Self {
        Self { pair: pair.into() }
    }
}

impl Default for GetTicker {
    fn default() -> Self {
        Self::new("btc_jpy")
    }
}

impl NativeRequest for GetTicker {
    type Output = CoincheckTicker;

    fn exchange(&self) -> Exchange {
        Exchange::Coincheck
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("ticker")
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("pair".to_string(), self.pair.clone())]
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Coincheck, content)
    }
}

/// `GET /api/order_books?pair=`
#[derive(Debug, Clone)]
pub struct GetOrderBook {
    pub pair: String,
}

impl GetOrderBook {
    pub fn new(pair: impl Into<String>) -> Self {
        Self { pair: pair.into() }
    }
}

impl NativeRequest for GetOrderBook {
    type Output = CoincheckOrderBook;

    fn exchange(&self) -> Exchange {
        Exchange::Coincheck
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("order_books")
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("pair".to_string(), self.pair.clone())]
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Coincheck, content)
    }
}

/// `GET /api/accounts/balance`, one entry per currency.
#[derive(Debug, Clone, Default)]
pub struct GetBalance;

impl NativeRequest for GetBalance {
    type Output = Vec<CurrencyBalance>;

    fn exchange(&self) -> Exchange {
        Exchange::Coincheck
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["accounts"], "balance")
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        split_balances(content)
    }
}

/// `GET /api/exchange/orders/opens`
#[derive(Debug, Clone, Default)]
pub struct GetUnsettledOrders;

impl NativeRequest for GetUnsettledOrders {
    type Output = Vec<UnsettledOrder>;

    fn exchange(&self) -> Exchange {
        Exchange::Coincheck
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["exchange", "orders"], "opens")
    }

    fn content_path(&self) -> &'static [&'static str] {
        &["orders"]
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Coincheck, content)
    }
}
