use crate::core::errors::{ClientError, MessageFormatError};
use crate::core::exchange::Exchange;
use crate::core::serde_util::{decimal, decimal_opt, utc_seconds, utc_timestamp, DecimalValue};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `/api/ticker`. `timestamp` is in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoincheckTicker {
    #[serde(with = "decimal")]
    pub last: Decimal,
    #[serde(with = "decimal")]
    pub bid: Decimal,
    #[serde(with = "decimal")]
    pub ask: Decimal,
    #[serde(with = "decimal")]
    pub high: Decimal,
    #[serde(with = "decimal")]
    pub low: Decimal,
    #[serde(with = "decimal")]
    pub volume: Decimal,
    #[serde(with = "utc_seconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "(DecimalValue, DecimalValue)")]
pub struct OrderBookEntry {
    pub price: Decimal,
    pub size: Decimal,
}

impl From<(DecimalValue, DecimalValue)> for OrderBookEntry {
    fn from((price, size): (DecimalValue, DecimalValue)) -> Self {
        Self {
            price: price.0,
            size: size.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoincheckOrderBook {
    #[serde(default)]
    pub asks: Vec<OrderBookEntry>,
    #[serde(default)]
    pub bids: Vec<OrderBookEntry>,
}

impl CoincheckOrderBook {
    pub fn best_ask(&self) -> Option<&OrderBookEntry> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&OrderBookEntry> {
        self.bids.first()
    }

    pub fn mid_price(&self) -> Option<Decimal> {
        Some((self.best_bid()?.price + self.best_ask()?.price) / Decimal::TWO)
    }

    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }
}

/// Balance of one currency, split out of the flat `/api/accounts/balance` object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CurrencyBalance {
    pub currency: String,
    pub available: Decimal,
    pub reserved: Decimal,
    pub lending: Decimal,
    pub lend_in_use: Decimal,
    pub lent: Decimal,
    pub debt: Decimal,
    pub tsumitate: Decimal,
}

// Longest first so `_lend_in_use` wins over `_lent`.
const BALANCE_SUFFIXES: [&str; 6] = [
    "_lend_in_use",
    "_tsumitate",
    "_reserved",
    "_lending",
    "_lent",
    "_debt",
];

/// Group `{"jpy":"1","jpy_reserved":"2",...}` into one entry per currency,
/// sorted by currency code.
pub fn split_balances(content: &str) -> Result<Vec<CurrencyBalance>, ClientError> {
    let fields: BTreeMap<String, DecimalValue> = serde_json::from_str(content).map_err(|e| {
        MessageFormatError::new(Exchange::Coincheck, "object of decimal balances", e.to_string())
    })?;

    let mut balances: BTreeMap<String, CurrencyBalance> = BTreeMap::new();
    for (name, DecimalValue(amount)) in fields {
        let (currency, suffix) = BALANCE_SUFFIXES
            .iter()
            .find_map(|suffix| name.strip_suffix(suffix).map(|currency| (currency, *suffix)))
            .unwrap_or((name.as_str(), ""));
        let entry = balances
            .entry(currency.to_string())
            .or_insert_with(|| CurrencyBalance {
                currency: currency.to_string(),
                ..Default::default()
            });
        match suffix {
            "" => entry.available = amount,
            "_reserved" => entry.reserved = amount,
            "_lending" => entry.lending = amount,
            "_lend_in_use" => entry.lend_in_use = amount,
            "_lent" => entry.lent = amount,
            "_debt" => entry.debt = amount,
            _ => entry.tsumitate = amount,
        }
    }
    Ok(balances.into_values().collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Buy,
    Sell,
}

/// Entry of `/api/exchange/orders/opens`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnsettledOrder {
    pub id: u64,
    pub order_type: OrderType,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub rate: Option<Decimal>,
    pub pair: String,
    #[serde(with = "decimal")]
    pub pending_amount: Decimal,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub pending_market_buy_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opt::deserialize")]
    pub stop_loss_rate: Option<Decimal>,
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ticker_seconds_timestamp() {
        let ticker: CoincheckTicker = serde_json::from_str(
            r#"{"last":15350000,"bid":15340000,"ask":15350001,"high":15836477,
                "low":15271389,"volume":"273.5234","timestamp":1748558090}"#,
        )
        .unwrap();
        assert_eq!(ticker.timestamp.timestamp(), 1_748_558_090);
        assert_eq!(ticker.volume, Decimal::from_str("273.5234").unwrap());
    }

    #[test]
    fn test_split_balances_groups_by_currency() {
        let balances = split_balances(
            r#"{"jpy":"0.8401","btc":"7.75052654","jpy_reserved":"3000.0","btc_reserved":"3.5002",
                "btc_lending":"0.1","btc_lend_in_use":"0.3","btc_lent":"1.2","btc_debt":"0",
                "jpy_tsumitate":"10000.0"}"#,
        )
        .unwrap();
        assert_eq!(balances.len(), 2);
        let btc = &balances[0];
        assert_eq!(btc.currency, "btc");
        assert_eq!(btc.available, Decimal::from_str("7.75052654").unwrap());
        assert_eq!(btc.lend_in_use, Decimal::from_str("0.3").unwrap());
        assert_eq!(btc.lent, Decimal::from_str("1.2").unwrap());
        let jpy = &balances[1];
        assert_eq!(jpy.reserved, Decimal::from_str("3000.0").unwrap());
        assert_eq!(jpy.tsumitate, Decimal::from_str("10000.0").unwrap());
        assert_eq!(jpy.debt, Decimal::ZERO);
    }

    #[test]
    fn test_order_book_mid_price() {
        let book: CoincheckOrderBook = serde_json::from_str(
            r#"{"asks":[["101","0.1"]],"bids":[["99","0.2"]]}"#,
        )
        .unwrap();
        assert_eq!(book.mid_price(), Some(Decimal::from(100)));
        assert_eq!(book.spread(), Some(Decimal::from(2)));
    }
}
