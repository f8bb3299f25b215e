use super::requests::{GetBalance, GetOrderBook, GetTicker, GetUnsettledOrders};
use super::types::{CoincheckOrderBook, CoincheckTicker, CurrencyBalance, UnsettledOrder};
use crate::core::errors::CallError;
use crate::core::session::ExchangeSession;

/// Thin typed wrapper around an [`ExchangeSession`] for Coincheck.
pub struct CoincheckRestClient {
    session: ExchangeSession,
}

impl CoincheckRestClient {
    pub fn new(session: ExchangeSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ExchangeSession {
        &self.session
    }

    pub async fn get_ticker(&self, pair: &str) -> Result<CoincheckTicker, CallError> {
        self.session.execute(&GetTicker::new(pair)).await
    }

    pub async fn get_order_book(&self, pair: &str) -> Result<CoincheckOrderBook, CallError> {
        self.session.execute(&GetOrderBook::new(pair)).await
    }

    pub async fn get_balance(&self) -> Result<Vec<CurrencyBalance>, CallError> {
        self.session.execute(&GetBalance).await
    }

    pub async fn get_unsettled_orders(&self) -> Result<Vec<UnsettledOrder>, CallError> {
        self.session.execute(&GetUnsettledOrders).await
    }
}
