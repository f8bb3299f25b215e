pub mod requests;
pub mod rest;
pub mod types;
pub mod validator;

pub use rest::UpbitRestClient;
pub use types::{ChangeType, UpbitTicker};
pub use validator::UpbitValidator;
