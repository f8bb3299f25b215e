use super::requests::GetTicker;
use super::types::UpbitTicker;
use crate::core::errors::CallError;
use crate::core::session::ExchangeSession;

pub struct UpbitRestClient {
    session: ExchangeSession,
}

impl UpbitRestClient {
    pub fn new(session: ExchangeSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ExchangeSession {
        &self.session
    }

    /// Tickers for the given `KRW-BTC` style markets, in request order.
    pub async fn get_ticker(&self, markets: &[&str]) -> Result<Vec<UpbitTicker>, CallError> {
        self.session
            .execute(&GetTicker::new(markets.iter().copied()))
            .await
    }
}
