use crate::core::serde_util::{decimal, utc_timestamp};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GmoTicker {
    pub symbol: String,
    #[serde(with = "decimal")]
    pub ask: Decimal,
    #[serde(with = "decimal")]
    pub bid: Decimal,
    #[serde(with = "decimal")]
    pub high: Decimal,
    #[serde(with = "decimal")]
    pub last: Decimal,
    #[serde(with = "decimal")]
    pub low: Decimal,
    #[serde(with = "decimal")]
    pub volume: Decimal,
    #[serde(with = "utc_timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OrderBookEntry {
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal")]
    pub size: Decimal,
}

/// `symbol` holds only the base currency (`BTC`), not the requested pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GmoOrderBook {
    #[serde(default)]
    pub asks: Vec<OrderBookEntry>,
    #[serde(default)]
    pub bids: Vec<OrderBookEntry>,
    pub symbol: String,
}

impl GmoOrderBook {
    pub fn best_ask(&self) -> Option<&OrderBookEntry> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&OrderBookEntry> {
        self.bids.first()
    }
}
