use super::types::{
    Balance, BitFlyerBoard, BitFlyerMarket, BitFlyerTicker, BoardState, ChildOrder,
    ChildOrderAcceptance, ChildOrderState, ChildOrderType, HealthStatus, PrivateExecution,
    PublicExecution, Side, TimeInForce, TradingCommission,
};
use crate::core::errors::ClientError;
use crate::core::exchange::{Exchange, Visibility};
use crate::core::kernel::{decode_json, EndpointPath, NativeRequest};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Serialize;

fn push_opt(query: &mut Vec<(String, String)>, name: &str, value: Option<impl ToString>) {
    if let Some(value) = value {
        query.push((name.to_string(), value.to_string()));
    }
}

/// `GET /v1/markets`
#[derive(Debug, Clone, Default)]
pub struct GetMarkets;

impl NativeRequest for GetMarkets {
    type Output = Vec<BitFlyerMarket>;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("markets")
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `GET /v1/ticker`. Without a product code the exchange answers for BTC_JPY.
#[derive(Debug, Clone, Default)]
pub struct GetTicker {
    pub product_code: Option<String>,
}

impl GetTicker {
    pub fn new(product_code: impl Into<String>) -> Self {
        Self {
            product_code: Some(product_code.into()),
        }
    }
}

impl NativeRequest for GetTicker {
    type Output = BitFlyerTicker;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("ticker")
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "product_code", self.product_code.as_ref());
        query
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `GET /v1/board`
#[derive(Debug, Clone, Default)]
pub struct GetBoard {
    pub product_code: Option<String>,
}

impl GetBoard {
    pub fn new(product_code: impl Into<String>) -> Self {
        Self {
            product_code: Some(product_code.into()),
        }
    }
}

impl NativeRequest for GetBoard {
    type Output = BitFlyerBoard;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("board")
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "product_code", self.product_code.as_ref());
        query
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `GET /v1/executions`, paged by execution id.
#[derive(Debug, Clone, Default)]
pub struct GetExecutions {
    pub product_code: Option<String>,
    pub count: Option<u32>,
    pub before: Option<u64>,
    pub after: Option<u64>,
}

impl NativeRequest for GetExecutions {
    type Output = Vec<PublicExecution>;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("executions")
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "product_code", self.product_code.as_ref());
        push_opt(&mut query, "count", self.count);
        push_opt(&mut query, "before", self.before);
        push_opt(&mut query, "after", self.after);
        query
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `GET /v1/gethealth`
#[derive(Debug, Clone, Default)]
pub struct GetHealth {
    pub product_code: Option<String>,
}

impl NativeRequest for GetHealth {
    type Output = HealthStatus;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("gethealth")
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "product_code", self.product_code.as_ref());
        query
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `GET /v1/getboardstate`
#[derive(Debug, Clone)]
pub struct GetBoardState {
    pub product_code: String,
}

impl NativeRequest for GetBoardState {
    type Output = BoardState;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::action("getboardstate")
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("product_code".to_string(), self.product_code.clone())]
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `GET /v1/me/getbalance`
#[derive(Debug, Clone, Default)]
pub struct GetBalance;

impl NativeRequest for GetBalance {
    type Output = Vec<Balance>;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["me"], "getbalance")
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `GET /v1/me/getchildorders`. Setting `before` or `after` excludes active orders.
#[derive(Debug, Clone, Default)]
pub struct GetChildOrders {
    pub product_code: Option<String>,
    pub count: Option<u32>,
    pub before: Option<u64>,
    pub after: Option<u64>,
    pub child_order_state: Option<ChildOrderState>,
    pub child_order_id: Option<String>,
    pub child_order_acceptance_id: Option<String>,
    pub parent_order_id: Option<String>,
}

impl NativeRequest for GetChildOrders {
    type Output = Vec<ChildOrder>;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["me"], "getchildorders")
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "product_code", self.product_code.as_ref());
        push_opt(&mut query, "count", self.count);
        push_opt(&mut query, "before", self.before);
        push_opt(&mut query, "after", self.after);
        push_opt(
            &mut query,
            "child_order_state",
            self.child_order_state.map(ChildOrderState::as_str),
        );
        push_opt(&mut query, "child_order_id", self.child_order_id.as_ref());
        push_opt(
            &mut query,
            "child_order_acceptance_id",
            self.child_order_acceptance_id.as_ref(),
        );
        push_opt(&mut query, "parent_order_id", self.parent_order_id.as_ref());
        query
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `GET /v1/me/getexecutions`
#[derive(Debug, Clone, Default)]
pub struct GetPrivateExecutions {
    pub product_code: String,
    pub count: Option<u32>,
    pub before: Option<u64>,
    pub after: Option<u64>,
    pub child_order_id: Option<String>,
    pub child_order_acceptance_id: Option<String>,
}

impl GetPrivateExecutions {
    pub fn new(product_code: impl Into<String>) -> Self {
        Self {
            product_code: product_code.into(),
            ..Default::default()
        }
    }
}

impl NativeRequest for GetPrivateExecutions {
    type Output = Vec<PrivateExecution>;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["me"], "getexecutions")
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![("product_code".to_string(), self.product_code.clone())];
        push_opt(&mut query, "count", self.count);
        push_opt(&mut query, "before", self.before);
        push_opt(&mut query, "after", self.after);
        push_opt(&mut query, "child_order_id", self.child_order_id.as_ref());
        push_opt(
            &mut query,
            "child_order_acceptance_id",
            self.child_order_acceptance_id.as_ref(),
        );
        query
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `GET /v1/me/gettradingcommission?product_code=`
#[derive(Debug, Clone)]
pub struct GetTradingCommission {
    pub product_code: String,
}

impl GetTradingCommission {
    pub fn new(product_code: impl Into<String>) -> Self {
        Self {
            product_code: product_code.into(),
        }
    }
}

impl NativeRequest for GetTradingCommission {
    type Output = TradingCommission;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["me"], "gettradingcommission")
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("product_code".to_string(), self.product_code.clone())]
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `POST /v1/me/sendchildorder`
#[derive(Debug, Clone, Serialize)]
pub struct SendChildOrder {
    pub product_code: String,
    pub child_order_type: ChildOrderType,
    pub side: Side,
    pub size: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute_to_expire: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
}

impl SendChildOrder {
    pub fn limit(
        product_code: impl Into<String>,
        side: Side,
        price: Decimal,
        size: Decimal,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            child_order_type: ChildOrderType::Limit,
            side,
            size,
            price: Some(price),
            minute_to_expire: None,
            time_in_force: None,
        }
    }

    pub fn market(product_code: impl Into<String>, side: Side, size: Decimal) -> Self {
        Self {
            product_code: product_code.into(),
            child_order_type: ChildOrderType::Market,
            side,
            size,
            price: None,
            minute_to_expire: None,
            time_in_force: None,
        }
    }

    fn validate(&self) -> Result<(), ClientError> {
        match (self.child_order_type, self.price) {
            (ChildOrderType::Limit, None) => Err(ClientError::Configuration(
                "price is required for LIMIT orders".to_string(),
            )),
            (ChildOrderType::Market, Some(price)) => Err(ClientError::Configuration(format!(
                "price cannot be specified for MARKET orders: {}",
                price
            ))),
            _ => match self.minute_to_expire {
                Some(minutes) if !(1..=43_200).contains(&minutes) => {
                    Err(ClientError::Configuration(format!(
                        "minute_to_expire must be within 1..=43200, got {}",
                        minutes
                    )))
                }
                _ => Ok(()),
            },
        }
    }
}

impl NativeRequest for SendChildOrder {
    type Output = ChildOrderAcceptance;

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn method(&self) -> Method {
        Method::POST
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["me"], "sendchildorder")
    }

    fn body(&self) -> Result<Option<String>, ClientError> {
        self.validate()?;
        Ok(Some(serde_json::to_string(self)?))
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::BitFlyer, content)
    }
}

/// `POST /v1/me/cancelchildorder`. The exchange replies with an empty body.
#[derive(Debug, Clone, Serialize)]
pub struct CancelChildOrder {
    pub product_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_order_acceptance_id: Option<String>,
}

impl CancelChildOrder {
    pub fn by_acceptance_id(
        product_code: impl Into<String>,
        acceptance_id: impl Into<String>,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            child_order_id: None,
            child_order_acceptance_id: Some(acceptance_id.into()),
        }
    }
}

impl NativeRequest for CancelChildOrder {
    type Output = ();

    fn exchange(&self) -> Exchange {
        Exchange::BitFlyer
    }

    fn method(&self) -> Method {
        Method::POST
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["me"], "cancelchildorder")
    }

    fn body(&self) -> Result<Option<String>, ClientError> {
        if self.child_order_id.is_none() && self.child_order_acceptance_id.is_none() {
            return Err(ClientError::Configuration(
                "either child_order_id or child_order_acceptance_id is required".to_string(),
            ));
        }
        Ok(Some(serde_json::to_string(self)?))
    }

    fn decode(&self, _content: &str) -> Result<Self::Output, ClientError> {
        Ok(())
    }
}
