pub mod core;
pub mod exchanges;

pub use core::config::{Credentials, RateLimitConfig, SessionConfig};
pub use core::errors::{CallError, ClientError, MessageFormatError, Stage};
pub use core::exchange::{Exchange, Visibility};
pub use core::kernel::{CallbackRegistry, Flow, NativeRequest, RequestPipeline};
pub use core::message::{Envelope, Metadata, NativeMessage, Payload};
pub use core::rate_limit::{LocalRateLimiter, RateLimiter, SharedRateLimiter};
pub use core::session::{ExchangeSession, ExchangeSessionBuilder};
