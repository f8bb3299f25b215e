use crate::core::serde_util::{decimal, utc_timestamp};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Direction of the last price move against the previous close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Rise,
    Even,
    Fall,
}

/// One element of `/v1/ticker`. Prices arrive as JSON numbers; trade
/// dates are kept as the compact `yyyyMMdd`/`HHmmss` strings Upbit sends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpbitTicker {
    pub market: String,
    #[serde(with = "decimal")]
    pub trade_price: Decimal,
    #[serde(with = "decimal")]
    pub opening_price: Decimal,
    #[serde(with = "decimal")]
    pub high_price: Decimal,
    #[serde(with = "decimal")]
    pub low_price: Decimal,
    #[serde(with = "decimal")]
    pub prev_closing_price: Decimal,
    pub change: ChangeType,
    #[serde(with = "decimal")]
    pub change_price: Decimal,
    #[serde(with = "decimal")]
    pub change_rate: Decimal,
    #[serde(with = "decimal")]
    pub signed_change_price: Decimal,
    #[serde(with = "decimal")]
    pub signed_change_rate: Decimal,
    #[serde(with = "decimal")]
    pub trade_volume: Decimal,
    #[serde(with = "decimal")]
    pub acc_trade_price: Decimal,
    #[serde(with = "decimal")]
    pub acc_trade_price_24h: Decimal,
    #[serde(with = "decimal")]
    pub acc_trade_volume: Decimal,
    #[serde(with = "decimal")]
    pub acc_trade_volume_24h: Decimal,
    #[serde(with = "decimal")]
    pub highest_52_week_price: Decimal,
    pub highest_52_week_date: String,
    #[serde(with = "decimal")]
    pub lowest_52_week_price: Decimal,
    pub lowest_52_week_date: String,
    pub trade_date: String,
    pub trade_time: String,
    pub trade_date_kst: String,
    pub trade_time_kst: String,
    #[serde(with = "utc_timestamp")]
    pub trade_timestamp: DateTime<Utc>,
    #[serde(with = "utc_timestamp")]
    pub timestamp: DateTime<Utc>,
}
