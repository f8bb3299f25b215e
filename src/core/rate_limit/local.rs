use super::{Permit, RateLimitKey, RateLimitQuota, RateLimiter};
use crate::core::config::RateLimitConfig;
use crate::core::errors::ClientError;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::Quota;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::trace;

type DirectRateLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// In-process limiter with one GCRA bucket per key.
///
/// Each bucket holds `capacity` cells and regains one every
/// `window / capacity`, so an idle key can burst a full window's worth.
pub struct LocalRateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<RateLimitKey, Arc<DirectRateLimiter>>>,
}

impl LocalRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Take tokens without waiting; `Ok(None)` when the bucket is short.
    pub fn try_acquire(
        &self,
        key: &RateLimitKey,
        weight: u32,
    ) -> Result<Option<Permit>, ClientError> {
        let (limiter, cells) = self.prepare(key, weight)?;
        match limiter.check_n(cells) {
            Ok(Ok(())) => Ok(Some(self.permit(key, weight))),
            Ok(Err(_)) => Ok(None),
            Err(e) => Err(ClientError::Configuration(e.to_string())),
        }
    }

    fn prepare(
        &self,
        key: &RateLimitKey,
        weight: u32,
    ) -> Result<(Arc<DirectRateLimiter>, NonZeroU32), ClientError> {
        let quota = self.config.quota_for(key);
        quota.check_weight(key, weight)?;
        let cells = NonZeroU32::new(weight)
            .ok_or_else(|| ClientError::Configuration("weight must be positive".into()))?;
        Ok((self.bucket(key, quota)?, cells))
    }

    fn bucket(
        &self,
        key: &RateLimitKey,
        quota: RateLimitQuota,
    ) -> Result<Arc<DirectRateLimiter>, ClientError> {
        // a panic elsewhere cannot leave the map half-updated
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(limiter) = buckets.get(key) {
            return Ok(Arc::clone(limiter));
        }
        let limiter = Arc::new(governor::RateLimiter::direct(quota_from_window(
            quota.window,
            quota.capacity,
        )?));
        buckets.insert(key.clone(), Arc::clone(&limiter));
        Ok(limiter)
    }

    fn permit(&self, key: &RateLimitKey, weight: u32) -> Permit {
        Permit {
            key: key.clone(),
            weight,
            remaining: None,
        }
    }
}

#[async_trait]
impl RateLimiter for LocalRateLimiter {
    async fn acquire(&self, key: &RateLimitKey, weight: u32) -> Result<Permit, ClientError> {
        let (limiter, cells) = self.prepare(key, weight)?;
        limiter
            .until_n_ready(cells)
            .await
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        trace!(key = %key, weight, "local rate limit slot acquired");
        Ok(self.permit(key, weight))
    }
}

fn quota_from_window(window: Duration, capacity: u32) -> Result<Quota, ClientError> {
    let burst = NonZeroU32::new(capacity).ok_or_else(|| {
        ClientError::Configuration("rate limit capacity must be positive".to_string())
    })?;
    let period = window / capacity;
    Quota::with_period(period)
        .map(|quota| quota.allow_burst(burst))
        .ok_or_else(|| {
            ClientError::Configuration(format!(
                "rate limit window {:?} is too short for capacity {}",
                window, capacity
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::exchange::Exchange;

    fn limiter(capacity: u32, window: Duration) -> LocalRateLimiter {
        LocalRateLimiter::new(RateLimitConfig::default().with_default_quota(capacity, window))
    }

    #[test]
    fn test_bucket_denies_beyond_capacity() {
        let limiter = limiter(3, Duration::from_secs(60));
        let key = RateLimitKey::new(Exchange::BitFlyer, "ticker");
        for _ in 0..3 {
            assert!(limiter.try_acquire(&key, 1).unwrap().is_some());
        }
        assert!(limiter.try_acquire(&key, 1).unwrap().is_none());
    }

    #[test]
    fn test_keys_have_independent_buckets() {
        let limiter = limiter(1, Duration::from_secs(60));
        let ticker = RateLimitKey::new(Exchange::BitFlyer, "ticker");
        let board = RateLimitKey::new(Exchange::BitFlyer, "board");
        assert!(limiter.try_acquire(&ticker, 1).unwrap().is_some());
        assert!(limiter.try_acquire(&board, 1).unwrap().is_some());
        assert!(limiter.try_acquire(&ticker, 1).unwrap().is_none());
    }

    #[test]
    fn test_oversized_weight_is_configuration_error() {
        let limiter = limiter(2, Duration::from_secs(1));
        let key = RateLimitKey::new(Exchange::Binance, "account");
        assert!(matches!(
            limiter.try_acquire(&key, 3),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_window_is_rejected() {
        assert!(quota_from_window(Duration::ZERO, 5).is_err());
        assert!(quota_from_window(Duration::from_secs(1), 0).is_err());
    }
}
