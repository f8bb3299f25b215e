//! Request pacing per `(exchange, endpoint class)`.
//!
//! [`LocalRateLimiter`] keeps buckets in process memory; [`SharedRateLimiter`]
//! draws from a [`BucketStore`] so separate processes share one quota. Both
//! satisfy [`RateLimiter`] and can be swapped freely.

pub mod local;
pub mod redis_store;
pub mod shared;

use crate::core::errors::ClientError;
use crate::core::exchange::Exchange;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use local::LocalRateLimiter;
pub use redis_store::RedisBucketStore;
pub use shared::{BucketDecision, BucketStore, InMemoryBucketStore, SharedRateLimiter, StoreError};

/// Identifies one quota bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    pub exchange: Exchange,
    pub endpoint_class: String,
}

impl RateLimitKey {
    pub fn new(exchange: Exchange, endpoint_class: impl Into<String>) -> Self {
        Self {
            exchange,
            endpoint_class: endpoint_class.into(),
        }
    }

    /// Key used in a shared store, e.g. `RATE_LIMIT:URL_PATTERN:bitflyer:ticker`.
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{}:{}", prefix, self)
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange.as_str(), self.endpoint_class)
    }
}

/// `capacity` tokens per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitQuota {
    pub capacity: u32,
    pub window: Duration,
}

impl RateLimitQuota {
    pub const fn new(capacity: u32, window: Duration) -> Self {
        Self { capacity, window }
    }

    pub(crate) fn check_weight(&self, key: &RateLimitKey, weight: u32) -> Result<(), ClientError> {
        if weight == 0 {
            return Err(ClientError::Configuration(format!(
                "rate limit weight for {} must be positive",
                key
            )));
        }
        if weight > self.capacity {
            return Err(ClientError::Configuration(format!(
                "rate limit weight {} for {} exceeds bucket capacity {}",
                weight, key, self.capacity
            )));
        }
        Ok(())
    }
}

/// What a shared limiter does when its store cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationPolicy {
    /// Fail the acquire with `RateLimitBackendUnavailable`.
    #[default]
    FailClosed,
    /// Fall back to process-local limiting.
    FailOpen,
}

/// Proof that `weight` tokens were taken from `key`'s bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permit {
    pub key: RateLimitKey,
    pub weight: u32,
    /// Tokens left after this grant, when the backend reports it.
    pub remaining: Option<u32>,
}

/// Acquire contract shared by every backend.
///
/// `acquire` suspends until tokens are available. It must be cancel-safe:
/// dropping the future before it resolves never consumes tokens. Callers
/// bound the wait with their own timeout.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn acquire(&self, key: &RateLimitKey, weight: u32) -> Result<Permit, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_layout() {
        let key = RateLimitKey::new(Exchange::Bitbank, "user/assets");
        assert_eq!(
            key.storage_key("RATE_LIMIT:URL_PATTERN"),
            "RATE_LIMIT:URL_PATTERN:bitbank:user/assets"
        );
    }

    #[test]
    fn test_weight_must_fit_capacity() {
        let key = RateLimitKey::new(Exchange::Binance, "account");
        let quota = RateLimitQuota::new(10, Duration::from_secs(1));
        assert!(quota.check_weight(&key, 10).is_ok());
        assert!(quota.check_weight(&key, 0).is_err());
        assert!(quota.check_weight(&key, 11).is_err());
    }
}
