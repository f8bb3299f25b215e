//! BINANCE spot (`/api/v3`). Market data plus the signed account endpoint.

pub mod requests;
pub mod rest;
pub mod signer;
pub mod types;
pub mod validator;

pub use rest::BinanceRestClient;
pub use signer::BinanceSigner;
pub use types::{
    AccountBalance, BinanceAccount, BinanceDepth, BinanceTicker, DepthEntry, ExchangeInfo,
    ExchangeSymbol, RateLimit, RateLimitInterval, RateLimitType, SymbolFilter, SymbolStatus,
};
pub use validator::BinanceValidator;
