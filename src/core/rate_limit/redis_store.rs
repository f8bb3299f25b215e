use super::shared::{BucketDecision, BucketStore, StoreError};
use super::RateLimitQuota;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{RedisError, Script};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Fixed-window token bucket kept in a hash `{tokens, window_start}`.
///
/// Window boundaries use the server's `TIME`, so client clock skew never
/// moves a window. Returns `{granted, tokens, retry_after_ms}`.
const TAKE_SCRIPT: &str = r"
local capacity = tonumber(ARGV[1])
local window_ms = tonumber(ARGV[2])
local weight = tonumber(ARGV[3])
local t = redis.call('TIME')
local now = tonumber(t[1]) * 1000 + math.floor(tonumber(t[2]) / 1000)
local state = redis.call('HMGET', KEYS[1], 'tokens', 'window_start')
local tokens = tonumber(state[1])
local window_start = tonumber(state[2])
if tokens == nil or window_start == nil or now - window_start >= window_ms then
  tokens = capacity
  window_start = now
end
local left = window_ms - (now - window_start)
if tokens >= weight then
  tokens = tokens - weight
  redis.call('HSET', KEYS[1], 'tokens', tokens, 'window_start', window_start)
  redis.call('PEXPIRE', KEYS[1], left)
  return {1, tokens, 0}
end
redis.call('HSET', KEYS[1], 'tokens', tokens, 'window_start', window_start)
redis.call('PEXPIRE', KEYS[1], left)
return {0, tokens, left}
";

/// Read-only view of the same bucket.
const PEEK_SCRIPT: &str = r"
local capacity = tonumber(ARGV[1])
local window_ms = tonumber(ARGV[2])
local t = redis.call('TIME')
local now = tonumber(t[1]) * 1000 + math.floor(tonumber(t[2]) / 1000)
local state = redis.call('HMGET', KEYS[1], 'tokens', 'window_start')
local tokens = tonumber(state[1])
local window_start = tonumber(state[2])
if tokens == nil or window_start == nil or now - window_start >= window_ms then
  return capacity
end
return tokens
";

/// Give back tokens within the current window, capped at capacity. A bucket
/// whose window has rolled over (or expired) is left alone.
const REFUND_SCRIPT: &str = r"
local capacity = tonumber(ARGV[1])
local window_ms = tonumber(ARGV[2])
local weight = tonumber(ARGV[3])
local t = redis.call('TIME')
local now = tonumber(t[1]) * 1000 + math.floor(tonumber(t[2]) / 1000)
local state = redis.call('HMGET', KEYS[1], 'tokens', 'window_start')
local tokens = tonumber(state[1])
local window_start = tonumber(state[2])
if tokens == nil or window_start == nil or now - window_start >= window_ms then
  return capacity
end
return redis.call('HINCRBY', KEYS[1], 'tokens', math.min(weight, capacity - tokens))
";

/// [`BucketStore`] backed by Redis.
#[derive(Clone)]
pub struct RedisBucketStore {
    connection: ConnectionManager,
    take: Script,
    peek: Script,
    refund: Script,
}

impl fmt::Debug for RedisBucketStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBucketStore").finish_non_exhaustive()
    }
}

impl RedisBucketStore {
    /// Connect and `PING` once so an unreachable server is reported up front.
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(store_error)?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(store_error)?;
        let store = Self::from_manager(connection);
        store.ping().await?;
        debug!("connected to rate limit store");
        Ok(store)
    }

    pub fn from_manager(connection: ConnectionManager) -> Self {
        Self {
            connection,
            take: Script::new(TAKE_SCRIPT),
            peek: Script::new(PEEK_SCRIPT),
            refund: Script::new(REFUND_SCRIPT),
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(store_error)?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Protocol(format!("PING answered {}", reply)))
        }
    }
}

#[async_trait]
impl BucketStore for RedisBucketStore {
    async fn try_take(
        &self,
        key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<BucketDecision, StoreError> {
        let mut connection = self.connection.clone();
        let reply: Vec<i64> = self
            .take
            .key(key)
            .arg(quota.capacity)
            .arg(window_ms(quota))
            .arg(weight)
            .invoke_async(&mut connection)
            .await
            .map_err(store_error)?;

        match reply.as_slice() {
            [1, tokens, _] => Ok(BucketDecision::Granted {
                remaining: u32::try_from(*tokens).unwrap_or(0),
            }),
            [0, _, retry_after_ms] => Ok(BucketDecision::Denied {
                retry_after: Duration::from_millis(u64::try_from(*retry_after_ms).unwrap_or(0)),
            }),
            other => Err(StoreError::Protocol(format!("take script returned {:?}", other))),
        }
    }

    async fn remaining(&self, key: &str, quota: RateLimitQuota) -> Result<u32, StoreError> {
        let mut connection = self.connection.clone();
        let tokens: i64 = self
            .peek
            .key(key)
            .arg(quota.capacity)
            .arg(window_ms(quota))
            .invoke_async(&mut connection)
            .await
            .map_err(store_error)?;
        u32::try_from(tokens).map_err(|e| StoreError::Protocol(e.to_string()))
    }

    async fn refund(
        &self,
        key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _tokens: i64 = self
            .refund
            .key(key)
            .arg(quota.capacity)
            .arg(window_ms(quota))
            .arg(weight)
            .invoke_async(&mut connection)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

fn window_ms(quota: RateLimitQuota) -> u64 {
    (quota.window.as_millis() as u64).max(1)
}

fn store_error(error: RedisError) -> StoreError {
    if error.is_io_error()
        || error.is_connection_refusal()
        || error.is_connection_dropped()
        || error.is_timeout()
    {
        StoreError::Unavailable(error.to_string())
    } else {
        StoreError::Protocol(error.to_string())
    }
}
