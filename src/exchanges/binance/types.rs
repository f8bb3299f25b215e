use crate::core::serde_util::{decimal, utc_timestamp, DecimalValue};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};

/// `/api/v3/ticker/24hr` for a single symbol.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker {
    pub symbol: String,
    #[serde(with = "decimal")]
    pub price_change: Decimal,
    #[serde(with = "decimal")]
    pub price_change_percent: Decimal,
    #[serde(with = "decimal")]
    pub weighted_avg_price: Decimal,
    #[serde(with = "decimal")]
    pub prev_close_price: Decimal,
    #[serde(with = "decimal")]
    pub last_price: Decimal,
    #[serde(with = "decimal")]
    pub last_qty: Decimal,
    #[serde(with = "decimal")]
    pub bid_price: Decimal,
    #[serde(with = "decimal")]
    pub bid_qty: Decimal,
    #[serde(with = "decimal")]
    pub ask_price: Decimal,
    #[serde(with = "decimal")]
    pub ask_qty: Decimal,
    #[serde(with = "decimal")]
    pub open_price: Decimal,
    #[serde(with = "decimal")]
    pub high_price: Decimal,
    #[serde(with = "decimal")]
    pub low_price: Decimal,
    #[serde(with = "decimal")]
    pub volume: Decimal,
    #[serde(with = "decimal")]
    pub quote_volume: Decimal,
    #[serde(with = "utc_timestamp")]
    pub open_time: DateTime<Utc>,
    #[serde(with = "utc_timestamp")]
    pub close_time: DateTime<Utc>,
    pub first_id: i64,
    pub last_id: i64,
    pub count: u64,
}

/// `["price", "quantity"]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "(DecimalValue, DecimalValue)")]
pub struct DepthEntry {
    pub price: Decimal,
    pub quantity: Decimal,
}

impl From<(DecimalValue, DecimalValue)> for DepthEntry {
    fn from((price, quantity): (DecimalValue, DecimalValue)) -> Self {
        Self {
            price: price.0,
            quantity: quantity.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceDepth {
    pub last_update_id: u64,
    pub bids: Vec<DepthEntry>,
    pub asks: Vec<DepthEntry>,
}

impl BinanceDepth {
    pub fn best_bid(&self) -> Option<&DepthEntry> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&DepthEntry> {
        self.asks.first()
    }

    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }

    pub fn mid_price(&self) -> Option<Decimal> {
        Some((self.best_ask()?.price + self.best_bid()?.price) / Decimal::TWO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateLimitType {
    RequestWeight,
    Orders,
    RawRequests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RateLimitInterval {
    Second,
    Minute,
    Day,
}

/// `intervalNum=1, interval=MINUTE, limit=1200` reads as 1200 per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub rate_limit_type: RateLimitType,
    pub interval: RateLimitInterval,
    pub interval_num: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolStatus {
    Trading,
    Halt,
    Break,
    AuctionMatch,
    PreTrading,
    PostTrading,
    EndOfDay,
}

/// Filter fields differ per `filterType`, so everything else is kept as JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolFilter {
    pub filter_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SymbolFilter {
    /// A decimal field of this filter, e.g. `tickSize` on `PRICE_FILTER`.
    pub fn decimal(&self, name: &str) -> Option<Decimal> {
        self.fields.get(name)?.as_str()?.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeSymbol {
    pub symbol: String,
    pub status: SymbolStatus,
    pub base_asset: String,
    pub base_asset_precision: u32,
    pub quote_asset: String,
    pub quote_asset_precision: u32,
    #[serde(default)]
    pub order_types: Vec<String>,
    #[serde(default)]
    pub is_spot_trading_allowed: bool,
    #[serde(default)]
    pub is_margin_trading_allowed: bool,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub permission_sets: Option<Vec<Vec<String>>>,
}

impl ExchangeSymbol {
    pub fn filter(&self, filter_type: &str) -> Option<&SymbolFilter> {
        self.filters.iter().find(|f| f.filter_type == filter_type)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    pub timezone: String,
    #[serde(with = "utc_timestamp")]
    pub server_time: DateTime<Utc>,
    pub rate_limits: Vec<RateLimit>,
    #[serde(default)]
    pub exchange_filters: Vec<Value>,
    pub symbols: Vec<ExchangeSymbol>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountBalance {
    pub asset: String,
    #[serde(with = "decimal")]
    pub free: Decimal,
    #[serde(with = "decimal")]
    pub locked: Decimal,
}

/// `/api/v3/account`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceAccount {
    pub maker_commission: u32,
    pub taker_commission: u32,
    pub can_trade: bool,
    pub can_withdraw: bool,
    pub can_deposit: bool,
    #[serde(with = "utc_timestamp")]
    pub update_time: DateTime<Utc>,
    pub account_type: String,
    pub balances: Vec<AccountBalance>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl BinanceAccount {
    /// Balances with a non-zero free or locked amount.
    pub fn non_zero_balances(&self) -> impl Iterator<Item = &AccountBalance> {
        self.balances
            .iter()
            .filter(|b| !b.free.is_zero() || !b.locked.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_depth_mid_price() {
        let depth: BinanceDepth = serde_json::from_str(
            r#"{"lastUpdateId":1027024,"bids":[["4.00000000","431.00000000"]],
                "asks":[["4.00000200","12.00000000"]]}"#,
        )
        .unwrap();
        assert_eq!(depth.spread(), Some(Decimal::from_str("0.000002").unwrap()));
        assert_eq!(depth.mid_price(), Some(Decimal::from_str("4.000001").unwrap()));
    }

    #[test]
    fn test_exchange_info_filters_keep_extra_fields() {
        let info: ExchangeInfo = serde_json::from_str(
            r#"{"timezone":"UTC","serverTime":1565246363776,
                "rateLimits":[{"rateLimitType":"REQUEST_WEIGHT","interval":"MINUTE","intervalNum":1,"limit":6000}],
                "exchangeFilters":[],
                "symbols":[{"symbol":"ETHBTC","status":"TRADING","baseAsset":"ETH","baseAssetPrecision":8,
                    "quoteAsset":"BTC","quotePrecision":8,"quoteAssetPrecision":8,
                    "orderTypes":["LIMIT","MARKET"],"isSpotTradingAllowed":true,
                    "filters":[{"filterType":"PRICE_FILTER","minPrice":"0.00000100",
                        "maxPrice":"922327.00000000","tickSize":"0.00000100"}],
                    "permissions":[],"permissionSets":[["SPOT","MARGIN"]]}]}"#,
        )
        .unwrap();
        assert_eq!(info.rate_limits[0].limit, 6000);
        let symbol = &info.symbols[0];
        assert_eq!(symbol.status, SymbolStatus::Trading);
        let price_filter = symbol.filter("PRICE_FILTER").unwrap();
        assert_eq!(
            price_filter.decimal("tickSize"),
            Some(Decimal::from_str("0.000001").unwrap())
        );
    }
}
