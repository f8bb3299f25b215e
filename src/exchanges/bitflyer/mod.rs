pub mod requests;
pub mod rest;
pub mod signer;
pub mod types;
pub mod validator;

pub use rest::BitFlyerRestClient;
pub use signer::BitFlyerSigner;
pub use types::{
    Balance, BitFlyerBoard, BitFlyerMarket, BitFlyerTicker, BoardEntry, BoardState,
    BoardStateType, ChildOrder, ChildOrderAcceptance, ChildOrderState, ChildOrderType,
    HealthStatus, HealthStatusType, MarketType, PrivateExecution, PublicExecution, Side,
    TimeInForce, TradingCommission,
};
pub use validator::BitFlyerValidator;
