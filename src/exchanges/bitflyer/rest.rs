use super::requests::{
    CancelChildOrder, GetBalance, GetBoard, GetBoardState, GetChildOrders, GetExecutions,
    GetHealth, GetMarkets, GetPrivateExecutions, GetTicker, GetTradingCommission, SendChildOrder,
};
use super::types::{
    Balance, BitFlyerBoard, BitFlyerMarket, BitFlyerTicker, BoardState, ChildOrder,
    ChildOrderAcceptance, HealthStatus, PrivateExecution, PublicExecution, TradingCommission,
};
use crate::core::errors::CallError;
use crate::core::session::ExchangeSession;
use tracing::instrument;

/// Thin typed wrapper around an [`ExchangeSession`] for bitFlyer Lightning.
pub struct BitFlyerRestClient {
    session: ExchangeSession,
}

impl BitFlyerRestClient {
    pub fn new(session: ExchangeSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ExchangeSession {
        &self.session
    }

    pub async fn get_markets(&self) -> Result<Vec<BitFlyerMarket>, CallError> {
        self.session.execute(&GetMarkets).await
    }

    #[instrument(skip(self), fields(exchange = "bitflyer"))]
    pub async fn get_ticker(&self, product_code: &str) -> Result<BitFlyerTicker, CallError> {
        self.session.execute(&GetTicker::new(product_code)).await
    }

    pub async fn get_board(&self, product_code: &str) -> Result<BitFlyerBoard, CallError> {
        self.session.execute(&GetBoard::new(product_code)).await
    }

    pub async fn get_executions(
        &self,
        request: &GetExecutions,
    ) -> Result<Vec<PublicExecution>, CallError> {
        self.session.execute(request).await
    }

    pub async fn get_health(&self, product_code: Option<&str>) -> Result<HealthStatus, CallError> {
        let request = GetHealth {
            product_code: product_code.map(str::to_string),
        };
        self.session.execute(&request).await
    }

    pub async fn get_board_state(&self, product_code: &str) -> Result<BoardState, CallError> {
        let request = GetBoardState {
            product_code: product_code.to_string(),
        };
        self.session.execute(&request).await
    }

    pub async fn get_balance(&self) -> Result<Vec<Balance>, CallError> {
        self.session.execute(&GetBalance).await
    }

    pub async fn get_child_orders(
        &self,
        request: &GetChildOrders,
    ) -> Result<Vec<ChildOrder>, CallError> {
        self.session.execute(request).await
    }

    /// The caller's own fills.
    pub async fn get_private_executions(
        &self,
        request: &GetPrivateExecutions,
    ) -> Result<Vec<PrivateExecution>, CallError> {
        self.session.execute(request).await
    }

    pub async fn get_trading_commission(
        &self,
        product_code: &str,
    ) -> Result<TradingCommission, CallError> {
        self.session
            .execute(&GetTradingCommission::new(product_code))
            .await
    }

    #[instrument(
        skip(self, order),
        fields(exchange = "bitflyer", product_code = %order.product_code)
    )]
    pub async fn send_child_order(
        &self,
        order: &SendChildOrder,
    ) -> Result<ChildOrderAcceptance, CallError> {
        self.session.execute(order).await
    }

    pub async fn cancel_child_order(&self, cancel: &CancelChildOrder) -> Result<(), CallError> {
        self.session.execute(cancel).await
    }
}
