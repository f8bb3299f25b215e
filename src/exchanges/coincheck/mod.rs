pub mod requests;
pub mod rest;
pub mod signer;
pub mod types;
pub mod validator;

pub use rest::CoincheckRestClient;
pub use signer::CoincheckSigner;
pub use types::{
    CoincheckOrderBook, CoincheckTicker, CurrencyBalance, OrderBookEntry, OrderType,
    UnsettledOrder,
};
pub use validator::CoincheckValidator;
