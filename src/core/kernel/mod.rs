//! Coinbridge kernel - the exchange-agnostic request path.
//!
//! Everything here is transport and plumbing. Exchange knowledge (roots,
//! signing schemes, error envelopes, models) lives under `crate::exchanges`.
//!
//! # Components
//!
//! ## Endpoints
//! - `EndpointPath`: resource path plus action, composed under an `ApiRoot`
//! - `NativeRequest`: per-call parameters and the decoder for the result
//!
//! ## Authentication
//! - `AuthSigner`: pluggable per-exchange signing
//!
//! ## Transport
//! - `Transport`: one request, one response, no retries
//! - `ReqwestTransport`: pooled HTTP client built from `SessionConfig`
//!
//! ## Pipeline
//! - `RequestPipeline`: `Built → RateGated → Sent → Validated → Decoded`
//! - `CallbackRegistry`: pre-request, validation and post-request hooks
//!
//! # Usage
//!
//! ```rust,no_run
//! use coinbridge::core::kernel::*;
//! use coinbridge::core::config::SessionConfig;
//! use coinbridge::core::exchange::Exchange;
//! use coinbridge::exchanges::bitflyer::requests::GetTicker;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(ReqwestTransport::new(SessionConfig::default())?);
//! let pipeline = RequestPipeline::new(Exchange::BitFlyer, transport);
//!
//! let ticker = pipeline.execute(&GetTicker::new("BTC_JPY")).await?;
//! println!("{:?}", ticker.ltp);
//! # Ok(())
//! # }
//! ```
pub mod callbacks;
pub mod endpoint;
pub mod pipeline;
pub mod signer;
pub mod transport;

pub use callbacks::{
    CallContext, CallbackRegistry, Flow, PostRequestCallback, PreRequestCallback,
    ResponseValidator,
};
pub use endpoint::{decode_json, EndpointPath, EndpointRequest, HttpResponseData, NativeRequest};
pub use pipeline::RequestPipeline;
pub use signer::{hmac_sha256_hex, timestamp_millis, AuthSigner, SignatureResult, SigningInput};
pub use transport::{ReqwestTransport, ReqwestTransportBuilder, Transport};
