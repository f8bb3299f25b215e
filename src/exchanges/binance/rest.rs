use super::requests::{GetAccount, GetDepth, GetExchangeInfo, GetTicker24hr};
use super::types::{BinanceAccount, BinanceDepth, BinanceTicker, ExchangeInfo};
use crate::core::errors::{CallError, Stage};
use crate::core::session::ExchangeSession;

pub struct BinanceRestClient {
    session: ExchangeSession,
}

impl BinanceRestClient {
    pub fn new(session: ExchangeSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ExchangeSession {
        &self.session
    }

    pub async fn get_ticker_24hr(&self, symbol: &str) -> Result<BinanceTicker, CallError> {
        self.session.execute(&GetTicker24hr::new(symbol)).await
    }

    /// Order book snapshot; `limit` defaults to 100 on the server.
    pub async fn get_depth(
        &self,
        symbol: &str,
        limit: Option<u32>,
    ) -> Result<BinanceDepth, CallError> {
        let request = match limit {
            Some(limit) => {
                GetDepth::with_limit(symbol, limit).map_err(CallError::at(Stage::Built))?
            }
            None => GetDepth::new(symbol),
        };
        self.session.execute(&request).await
    }

    pub async fn get_exchange_info(&self, symbols: &[&str]) -> Result<ExchangeInfo, CallError> {
        let request = GetExchangeInfo {
            symbols: symbols.iter().map(|s| (*s).to_string()).collect(),
        };
        self.session.execute(&request).await
    }

    pub async fn get_account(&self) -> Result<BinanceAccount, CallError> {
        self.session.execute(&GetAccount::default()).await
    }
}
