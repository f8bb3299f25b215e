pub mod requests;
pub mod rest;
pub mod signer;
pub mod types;
pub mod validator;

pub use rest::BitbankRestClient;
pub use signer::BitbankSigner;
pub use types::{
    Asset, BitbankDepth, BitbankOrder, BitbankTicker, DepthEntry, OrderStatus, OrderType,
    PairStatus, Side, SpotStatus, SpotStatusType, WithdrawalFee,
};
pub use validator::BitbankValidator;
