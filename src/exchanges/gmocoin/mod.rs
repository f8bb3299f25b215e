pub mod requests;
pub mod rest;
pub mod types;
pub mod validator;

pub use rest::GmoCoinRestClient;
pub use types::{GmoOrderBook, GmoTicker, OrderBookEntry};
pub use validator::GmoCoinValidator;
