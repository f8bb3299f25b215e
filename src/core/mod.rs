pub mod config;
pub mod errors;
pub mod exchange;
pub mod kernel;
pub mod masking;
pub mod message;
pub mod rate_limit;
pub mod serde_util;
pub mod session;
