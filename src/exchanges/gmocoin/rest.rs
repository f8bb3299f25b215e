use super::requests::{GetOrderBooks, GetTicker};
use super::types::{GmoOrderBook, GmoTicker};
use crate::core::errors::CallError;
use crate::core::session::ExchangeSession;

/// Thin typed wrapper around an [`ExchangeSession`] for GMO Coin.
pub struct GmoCoinRestClient {
    session: ExchangeSession,
}

impl GmoCoinRestClient {
    pub fn new(session: ExchangeSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ExchangeSession {
        &self.session
    }

    /// Tickers for every symbol, or just `symbol`.
    pub async fn get_ticker(&self, symbol: Option<&str>) -> Result<Vec<GmoTicker>, CallError> {
        let request = GetTicker {
            symbol: symbol.map(str::to_string),
        };
        self.session.execute(&request).await
    }

    pub async fn get_order_books(&self, symbol: &str) -> Result<GmoOrderBook, CallError> {
        self.session.execute(&GetOrderBooks::new(symbol)).await
    }
}
