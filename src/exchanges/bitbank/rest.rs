use super::requests::{CreateOrder, GetAssets, GetDepth, GetSpotStatus, GetTicker};
use super::types::{Asset, BitbankDepth, BitbankOrder, BitbankTicker, SpotStatus};
use crate::core::errors::CallError;
use crate::core::session::ExchangeSession;
use tracing::instrument;

/// Thin typed wrapper around an [`ExchangeSession`] for bitbank.
pub struct BitbankRestClient {
    session: ExchangeSession,
}

impl BitbankRestClient {
    pub fn new(session: ExchangeSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ExchangeSession {
        &self.session
    }

    #[instrument(skip(self), fields(exchange = "bitbank"))]
    pub async fn get_ticker(&self, pair: &str) -> Result<BitbankTicker, CallError> {
        self.session.execute(&GetTicker::new(pair)).await
    }

    pub async fn get_depth(&self, pair: &str) -> Result<BitbankDepth, CallError> {
        self.session.execute(&GetDepth::new(pair)).await
    }

    pub async fn get_spot_status(&self) -> Result<SpotStatus, CallError> {
        self.session.execute(&GetSpotStatus).await
    }

    pub async fn get_assets(&self) -> Result<Vec<Asset>, CallError> {
        self.session.execute(&GetAssets).await
    }

    #[instrument(skip(self, order), fields(exchange = "bitbank", pair = %order.pair))]
    pub async fn create_order(&self, order: &CreateOrder) -> Result<BitbankOrder, CallError> {
        self.session.execute(order).await
    }
}
