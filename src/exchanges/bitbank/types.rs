use crate::core::serde_util::{decimal, decimal_opt, utc_timestamp, utc_timestamp_opt, DecimalValue};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `/{pair}/ticker`. Price fields other than `last` and `vol` can be null
/// while a pair has no book.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BitbankTicker {
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub sell: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub buy: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub open: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub high: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub low: Option<Decimal>,
    #[serde(with = "decimal")]
    pub last: Decimal,
    #[serde(with = "decimal")]
    pub vol: Decimal,
    #[serde(default, deserialize_with = "utc_timestamp_opt::deserialize")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// One `[price, size]` level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "(DecimalValue, DecimalValue)")]
pub struct DepthEntry {
    pub price: Decimal,
    pub size: Decimal,
}

impl From<(DecimalValue, DecimalValue)> for DepthEntry {
    fn from((price, size): (DecimalValue, DecimalValue)) -> Self {
        Self {
            price: price.0,
            size: size.0,
        }
    }
}

/// `/{pair}/depth`. The `*_over`/`*_under` totals are only present while
/// circuit-break mode restricts the price range.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BitbankDepth {
    #[serde(default)]
    pub asks: Vec<DepthEntry>,
    #[serde(default)]
    pub bids: Vec<DepthEntry>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub asks_over: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub bids_under: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub asks_under: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub bids_over: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub ask_market: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub bid_market: Option<Decimal>,
    #[serde(with = "utc_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "sequenceId", default)]
    pub sequence_id: Option<String>,
}

impl BitbankDepth {
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.asks.first()?.price - self.bids.first()?.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpotStatusType {
    Normal,
    Busy,
    VeryBusy,
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PairStatus {
    pub pair: String,
    pub status: SpotStatusType,
    #[serde(with = "decimal")]
    pub min_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotStatus {
    pub statuses: Vec<PairStatus>,
}

/// Fiat assets report `threshold`/`under`/`over`; crypto assets report `min`/`max`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WithdrawalFee {
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub threshold: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub under: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub over: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub min: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub max: Option<Decimal>,
}

impl WithdrawalFee {
    pub fn is_fiat(&self) -> bool {
        self.threshold.is_some()
    }

    /// Fee for withdrawing `amount`.
    pub fn fee_for(&self, amount: Decimal) -> Option<Decimal> {
        match (self.threshold, self.under, self.over) {
            (Some(threshold), Some(under), Some(over)) => {
                Some(if amount < threshold { under } else { over })
            }
            _ => self.min,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub asset: String,
    pub amount_precision: u32,
    #[serde(with = "decimal")]
    pub onhand_amount: Decimal,
    #[serde(with = "decimal")]
    pub locked_amount: Decimal,
    #[serde(with = "decimal")]
    pub free_amount: Decimal,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub withdrawing_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub collateral_ratio: Option<Decimal>,
    pub stop_deposit: bool,
    pub stop_withdrawal: bool,
    #[serde(default)]
    pub withdrawal_fee: Option<WithdrawalFee>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Limit,
    Market,
    Stop,
    StopLimit,
    TakeProfit,
    StopLoss,
    Losscut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Inactive,
    Unfilled,
    PartiallyFilled,
    FullyFilled,
    CanceledUnfilled,
    CanceledPartiallyFilled,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BitbankOrder {
    pub order_id: u64,
    pub pair: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub start_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub remaining_amount: Option<Decimal>,
    #[serde(with = "decimal")]
    pub executed_amount: Decimal,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub average_price: Option<Decimal>,
    #[serde(with = "utc_timestamp")]
    pub ordered_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "utc_timestamp_opt::deserialize")]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "utc_timestamp_opt::deserialize")]
    pub canceled_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub trigger_price: Option<Decimal>,
    #[serde(default)]
    pub post_only: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_depth_levels_from_pairs() {
        let depth: BitbankDepth = serde_json::from_str(
            r#"{"asks":[["15350001","0.1"]],"bids":[["15350000","0.2"]],
                "asks_over":"10.5","timestamp":1748558090326,"sequenceId":"1234567890"}"#,
        )
        .unwrap();
        assert_eq!(depth.asks[0].size, Decimal::from_str("0.1").unwrap());
        assert_eq!(depth.spread(), Some(Decimal::ONE));
        assert_eq!(depth.asks_over, Some(Decimal::from_str("10.5").unwrap()));
        assert_eq!(depth.bid_market, None);
    }

    #[test]
    fn test_withdrawal_fee_shapes() {
        let fiat: WithdrawalFee = serde_json::from_str(
            r#"{"threshold":"30000.0000","under":"550.0000","over":"770.0000"}"#,
        )
        .unwrap();
        assert!(fiat.is_fiat());
        assert_eq!(fiat.fee_for(Decimal::from(10_000)), Some(Decimal::from(550)));
        assert_eq!(fiat.fee_for(Decimal::from(30_000)), Some(Decimal::from(770)));
        let crypto: WithdrawalFee =
            serde_json::from_str(r#"{"min":"0.0006","max":"0.0006"}"#).unwrap();
        assert!(!crypto.is_fiat());
        assert_eq!(crypto.fee_for(Decimal::ONE), Some(Decimal::from_str("0.0006").unwrap()));
    }

    #[test]
    fn test_ticker_timestamp_in_millis() {
        let ticker: BitbankTicker = serde_json::from_str(
            r#"{"sell":"15350001","buy":"15350000","open":"15572550","high":"15836477",
                "low":"15271389","last":"15350001","vol":"273.5234","timestamp":1748558090326}"#,
        )
        .unwrap();
        assert_eq!(ticker.vol.to_string(), "273.5234");
        assert_eq!(ticker.timestamp.unwrap().timestamp_millis(), 1_748_558_090_326);
    }
}
