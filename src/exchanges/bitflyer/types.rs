use crate::core::serde_util::{decimal, decimal_opt, utc_timestamp, utc_timestamp_opt};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketType {
    Spot,
    FX,
    Futures,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BitFlyerMarket {
    pub product_code: String,
    pub market_type: MarketType,
    #[serde(default)]
    pub alias: Option<String>,
}

/// `/v1/ticker`. Only `product_code` is guaranteed; the rest may be missing
/// from partial or maintenance responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BitFlyerTicker {
    pub product_code: String,
    #[serde(default)]
    pub state: Option<BoardStateType>,
    #[serde(default, deserialize_with = "utc_timestamp_opt::deserialize")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tick_id: Option<u64>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub best_bid: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub best_ask: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub best_bid_size: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub best_ask_size: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub total_bid_depth: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub total_ask_depth: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub market_bid_size: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub market_ask_size: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub ltp: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub volume: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub volume_by_product: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BoardEntry {
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal")]
    pub size: Decimal,
}

/// Order book. Bids are sorted by price descending, asks ascending.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BitFlyerBoard {
    #[serde(with = "decimal")]
    pub mid_price: Decimal,
    #[serde(default)]
    pub bids: Vec<BoardEntry>,
    #[serde(default)]
    pub asks: Vec<BoardEntry>,
}

impl BitFlyerBoard {
    /// Best ask minus best bid, `None` while either side is empty.
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.asks.first()?.price - self.bids.first()?.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// Itayose executions report `side` as an empty string.
fn side_or_empty<'de, D>(deserializer: D) -> Result<Option<Side>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some("BUY") => Ok(Some(Side::Buy)),
        Some("SELL") => Ok(Some(Side::Sell)),
        Some(other) => Err(serde::de::Error::unknown_variant(other, &["BUY", "SELL"])),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublicExecution {
    pub id: u64,
    #[serde(default, deserialize_with = "side_or_empty")]
    pub side: Option<Side>,
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal")]
    pub size: Decimal,
    #[serde(with = "utc_timestamp")]
    pub exec_date: DateTime<Utc>,
    pub buy_child_order_acceptance_id: String,
    pub sell_child_order_acceptance_id: String,
}

/// One of the caller's own fills from `/v1/me/getexecutions`. `side` is
/// empty for itayose fills.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrivateExecution {
    pub id: u64,
    #[serde(default, deserialize_with = "side_or_empty")]
    pub side: Option<Side>,
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal")]
    pub size: Decimal,
    #[serde(with = "utc_timestamp")]
    pub exec_date: DateTime<Utc>,
    #[serde(with = "decimal")]
    pub commission: Decimal,
    pub child_order_id: String,
    pub child_order_acceptance_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TradingCommission {
    #[serde(with = "decimal")]
    pub commission_rate: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatusType {
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "BUSY")]
    Busy,
    #[serde(rename = "VERY BUSY")]
    VeryBusy,
    #[serde(rename = "SUPER BUSY")]
    SuperBusy,
    #[serde(rename = "NO ORDER")]
    NoOrder,
    #[serde(rename = "STOP")]
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardStateType {
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "CLOSED")]
    Closed,
    #[serde(rename = "STARTING")]
    Starting,
    #[serde(rename = "PREOPEN")]
    Preopen,
    #[serde(rename = "CIRCUIT BREAK")]
    CircuitBreak,
    #[serde(rename = "AWAITING SQ")]
    AwaitingSq,
    #[serde(rename = "MATURED")]
    Matured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: HealthStatusType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BoardState {
    pub health: HealthStatusType,
    pub state: BoardStateType,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Balance {
    pub currency_code: String,
    #[serde(with = "decimal")]
    pub amount: Decimal,
    #[serde(with = "decimal")]
    pub available: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChildOrderType {
    Limit,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChildOrderState {
    Active,
    Completed,
    Canceled,
    Expired,
    Rejected,
}

impl ChildOrderState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
            Self::Expired => "EXPIRED",
            Self::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    GTC,
    IOC,
    FOK,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChildOrder {
    pub id: u64,
    pub child_order_id: String,
    pub product_code: String,
    pub side: Side,
    pub child_order_type: ChildOrderType,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub average_price: Option<Decimal>,
    #[serde(with = "decimal")]
    pub size: Decimal,
    pub child_order_state: ChildOrderState,
    #[serde(with = "utc_timestamp")]
    pub expire_date: DateTime<Utc>,
    #[serde(with = "utc_timestamp")]
    pub child_order_date: DateTime<Utc>,
    pub child_order_acceptance_id: String,
    #[serde(with = "decimal")]
    pub outstanding_size: Decimal,
    #[serde(with = "decimal")]
    pub cancel_size: Decimal,
    #[serde(with = "decimal")]
    pub executed_size: Decimal,
    #[serde(with = "decimal")]
    pub total_commission: Decimal,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChildOrderAcceptance {
    pub child_order_acceptance_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_partial_ticker_decodes() {
        let ticker: BitFlyerTicker =
            serde_json::from_str(r#"{"product_code":"BTC_JPY","ltp":31690}"#).unwrap();
        assert_eq!(ticker.ltp, Some(Decimal::from(31690)));
        assert_eq!(ticker.best_bid, None);
        assert_eq!(ticker.timestamp, None);
    }

    #[test]
    fn test_full_ticker_keeps_precision_and_utc() {
        let raw = r#"{
            "product_code": "BTC_JPY", "state": "RUNNING",
            "timestamp": "2025-02-27T13:50:43.957", "tick_id": 243332856,
            "best_bid": 12860000.0, "best_ask": 12870464.0,
            "best_bid_size": 0.1385912, "best_ask_size": 0.0106,
            "total_bid_depth": 123.24202636, "total_ask_depth": 279.49970104,
            "market_bid_size": 0.0, "market_ask_size": 0.0,
            "ltp": 12872459.0, "volume": 5691.9186518, "volume_by_product": 2042.29972298
        }"#;
        let ticker: BitFlyerTicker = serde_json::from_str(raw).unwrap();
        assert_eq!(ticker.state, Some(BoardStateType::Running));
        assert_eq!(ticker.total_bid_depth, Some(Decimal::from_str("123.24202636").unwrap()));
        assert_eq!(
            ticker.timestamp.unwrap().to_rfc3339(),
            "2025-02-27T13:50:43.957+00:00"
        );
    }

    #[test]
    fn test_board_spread() {
        let board: BitFlyerBoard = serde_json::from_str(
            r#"{"mid_price":33320,"bids":[{"price":30000,"size":0.1}],"asks":[{"price":36640,"size":5}]}"#,
        )
        .unwrap();
        assert_eq!(board.spread(), Some(Decimal::from(6640)));

        let empty: BitFlyerBoard = serde_json::from_str(r#"{"mid_price":0}"#).unwrap();
        assert_eq!(empty.spread(), None);
    }

    #[test]
    fn test_itayose_execution_has_no_side() {
        let execution: PublicExecution = serde_json::from_str(
            r#"{"id":1,"side":"","price":12328565.0,"size":0.01,
                "exec_date":"2025-03-09T18:46:14.073",
                "buy_child_order_acceptance_id":"a","sell_child_order_acceptance_id":"b"}"#,
        )
        .unwrap();
        assert_eq!(execution.side, None);
    }

    #[test]
    fn test_private_execution_commission() {
        let execution: PrivateExecution = serde_json::from_str(
            r#"{"id":37233,"side":"BUY","price":33470,"size":0.01,
                "exec_date":"2015-07-07T09:57:40.397","commission":0.00002,
                "child_order_id":"JOR20150707-060559-021935",
                "child_order_acceptance_id":"JRF20150707-060559-396699"}"#,
        )
        .unwrap();
        assert_eq!(execution.side, Some(Side::Buy));
        assert_eq!(execution.commission, Decimal::from_str("0.00002").unwrap());
    }

    #[test]
    fn test_state_names_with_spaces() {
        let state: BoardState =
            serde_json::from_str(r#"{"health":"SUPER BUSY","state":"CIRCUIT BREAK"}"#).unwrap();
        assert_eq!(state.health, HealthStatusType::SuperBusy);
        assert_eq!(state.state, BoardStateType::CircuitBreak);
    }
}
