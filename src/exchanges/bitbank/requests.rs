use super::types::{Asset, BitbankDepth, BitbankOrder, BitbankTicker, OrderType, Side, SpotStatus};
use crate::core::errors::ClientError;
use crate::core::exchange::{ApiRoot, Exchange, Visibility};
use crate::core::kernel::{decode_json, EndpointPath, NativeRequest};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Serialize;

/// `GET https://public.bitbank.cc/{pair}/ticker`
#[derive(Debug, Clone)]
pub struct GetTicker {
    pub pair: String,
}

impl GetTicker {
    pub fn new(pair: impl Into<String>) -> Self {
        Self { pair: pair.into() }
    }
}

impl NativeRequest for GetTicker {
    type Output = BitbankTicker;

    fn exchange(&self) -> Exchange {
        Exchange::Bitbank
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource([self.pair.as_str()], "ticker")
    }

    fn endpoint_class(&self) -> String {
        "ticker".to_string()
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Bitbank, content)
    }
}

/// `GET https://public.bitbank.cc/{pair}/depth`
#[derive(Debug, Clone)]
pub struct GetDepth {
    pub pair: String,
}

impl GetDepth {
    pub fn new(pair: impl Into<String>) -> Self {
        Self { pair: pair.into() }
    }
}

impl NativeRequest for GetDepth {
    type Output = BitbankDepth;

    fn exchange(&self) -> Exchange {
        Exchange::Bitbank
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource([self.pair.as_str()], "depth")
    }

    fn endpoint_class(&self) -> String {
        "depth".to_string()
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Bitbank, content)
    }
}

/// `GET https://api.bitbank.cc/v1/spot/status`. Public, but served from the
/// private host.
#[derive(Debug, Clone, Default)]
pub struct GetSpotStatus;

impl NativeRequest for GetSpotStatus {
    type Output = SpotStatus;

    fn exchange(&self) -> Exchange {
        Exchange::Bitbank
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["spot"], "status")
    }

    fn api_root(&self) -> ApiRoot {
        Exchange::Bitbank.api_root(Visibility::Private)
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Bitbank, content)
    }
}

/// `GET /v1/user/assets`
#[derive(Debug, Clone, Default)]
pub struct GetAssets;

impl NativeRequest for GetAssets {
    type Output = Vec<Asset>;

    fn exchange(&self) -> Exchange {
        Exchange::Bitbank
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["user"], "assets")
    }

    fn content_path(&self) -> &'static [&'static str] {
        &["assets"]
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Bitbank, content)
    }
}

/// `POST /v1/user/spot/order`
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrder {
    pub pair: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<Decimal>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub post_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_side: Option<String>,
}

impl CreateOrder {
    pub fn limit(pair: impl Into<String>, side: Side, price: Decimal, amount: Decimal) -> Self {
        Self {
            pair: pair.into(),
            side,
            order_type: OrderType::Limit,
            amount: Some(amount),
            price: Some(price),
            trigger_price: None,
            post_only: false,
            position_side: None,
        }
    }

    pub fn market(pair: impl Into<String>, side: Side, amount: Decimal) -> Self {
        Self {
            pair: pair.into(),
            side,
            order_type: OrderType::Market,
            amount: Some(amount),
            price: None,
            trigger_price: None,
            post_only: false,
            position_side: None,
        }
    }

    #[must_use]
    pub fn post_only(mut self) -> Self {
        self.post_only = true;
        self
    }
}

impl NativeRequest for CreateOrder {
    type Output = BitbankOrder;

    fn exchange(&self) -> Exchange {
        Exchange::Bitbank
    }

    fn method(&self) -> Method {
        Method::POST
    }

    fn visibility(&self) -> Visibility {
        Visibility::Private
    }

    fn endpoint(&self) -> EndpointPath {
        EndpointPath::resource(["user", "spot"], "order")
    }

    fn body(&self) -> Result<Option<String>, ClientError> {
        Ok(Some(serde_json::to_string(self)?))
    }

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError> {
        decode_json(Exchange::Bitbank, content)
    }
}
