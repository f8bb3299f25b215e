use super::{DegradationPolicy, LocalRateLimiter, Permit, RateLimitKey, RateLimitQuota, RateLimiter};
use crate::core::config::RateLimitConfig;
use crate::core::errors::ClientError;
use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

const MAX_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Outcome of one atomic check-and-decrement against a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketDecision {
    Granted { remaining: u32 },
    Denied { retry_after: Duration },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unavailable(String),

    #[error("unexpected store reply: {0}")]
    Protocol(String),
}

/// Remote (or in-memory) home of token buckets.
///
/// Every mutation of bucket state happens inside `try_take`, which must be
/// atomic with respect to all other callers of the same store. Window
/// boundaries come from the store's clock, never the caller's.
#[async_trait]
pub trait BucketStore: Send + Sync {
    async fn try_take(
        &self,
        key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<BucketDecision, StoreError>;

    /// Tokens currently left in the bucket without taking any.
    async fn remaining(&self, key: &str, quota: RateLimitQuota) -> Result<u32, StoreError>;

    /// Give back `weight` tokens taken by a grant nobody received. Never
    /// raises the bucket above capacity and never touches a later window.
    async fn refund(
        &self,
        key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<(), StoreError>;
}

/// Limiter whose buckets live in a [`BucketStore`] shared across processes.
pub struct SharedRateLimiter<S> {
    store: Arc<S>,
    config: RateLimitConfig,
    fallback: Option<LocalRateLimiter>,
}

impl<S: BucketStore + 'static> SharedRateLimiter<S> {
    pub fn new(store: S, config: RateLimitConfig) -> Self {
        let fallback = match config.degradation {
            DegradationPolicy::FailOpen => Some(LocalRateLimiter::new(config.clone())),
            DegradationPolicy::FailClosed => None,
        };
        Self {
            store: Arc::new(store),
            config,
            fallback,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tokens left in `key`'s shared bucket.
    pub async fn remaining(&self, key: &RateLimitKey) -> Result<u32, ClientError> {
        let storage_key = key.storage_key(&self.config.key_prefix);
        self.store
            .remaining(&storage_key, self.config.quota_for(key))
            .await
            .map_err(|e| ClientError::RateLimitBackendUnavailable(e.to_string()))
    }

    /// Run one `try_take` on its own task. If the caller is dropped while the
    /// store round trip is in flight, a grant that lands afterwards is refunded.
    async fn take(
        &self,
        storage_key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<BucketDecision, StoreError> {
        let (tx, rx) = oneshot::channel();
        let store = Arc::clone(&self.store);
        let key = storage_key.to_string();
        tokio::spawn(async move {
            let decision = store.try_take(&key, quota, weight).await;
            if let Err(Ok(BucketDecision::Granted { .. })) = tx.send(decision) {
                refund(store.as_ref(), &key, quota, weight).await;
            }
        });

        let mut pending = PendingTake {
            rx,
            store: Arc::clone(&self.store),
            key: storage_key.to_string(),
            quota,
            weight,
        };
        (&mut pending.rx)
            .await
            .map_err(|_| StoreError::Unavailable("bucket store task ended".to_string()))?
    }

    async fn degrade(
        &self,
        key: &RateLimitKey,
        weight: u32,
        error: StoreError,
    ) -> Result<Permit, ClientError> {
        match &self.fallback {
            Some(local) => {
                warn!(
                    key = %key,
                    error = %error,
                    "shared rate limit store unavailable, limiting locally"
                );
                local.acquire(key, weight).await
            }
            None => Err(ClientError::RateLimitBackendUnavailable(error.to_string())),
        }
    }
}

#[async_trait]
impl<S: BucketStore + 'static> RateLimiter for SharedRateLimiter<S> {
    async fn acquire(&self, key: &RateLimitKey, weight: u32) -> Result<Permit, ClientError> {
        let quota = self.config.quota_for(key);
        quota.check_weight(key, weight)?;
        let storage_key = key.storage_key(&self.config.key_prefix);

        loop {
            match self.take(&storage_key, quota, weight).await {
                Ok(BucketDecision::Granted { remaining }) => {
                    debug!(key = %key, weight, remaining, "shared rate limit slot acquired");
                    return Ok(Permit {
                        key: key.clone(),
                        weight,
                        remaining: Some(remaining),
                    });
                }
                Ok(BucketDecision::Denied { retry_after }) => {
                    tokio::time::sleep(poll_delay(retry_after)).await;
                }
                Err(error) => return self.degrade(key, weight, error).await,
            }
        }
    }
}

/// Receiving end of an in-flight `try_take`.
///
/// Dropping it closes the channel first, so the store task either sees the
/// send fail and refunds, or the grant is already buffered here and refunded
/// on drop. Exactly one of the two happens.
struct PendingTake<S: BucketStore + 'static> {
    rx: oneshot::Receiver<Result<BucketDecision, StoreError>>,
    store: Arc<S>,
    key: String,
    quota: RateLimitQuota,
    weight: u32,
}

impl<S: BucketStore + 'static> Drop for PendingTake<S> {
    fn drop(&mut self) {
        self.rx.close();
        if let Ok(Ok(BucketDecision::Granted { .. })) = self.rx.try_recv() {
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                warn!(key = %self.key, "no runtime to refund dropped grant");
                return;
            };
            let store = Arc::clone(&self.store);
            let key = std::mem::take(&mut self.key);
            let (quota, weight) = (self.quota, self.weight);
            runtime.spawn(async move { refund(store.as_ref(), &key, quota, weight).await });
        }
    }
}

async fn refund<S: BucketStore + ?Sized>(
    store: &S,
    key: &str,
    quota: RateLimitQuota,
    weight: u32,
) {
    match store.refund(key, quota, weight).await {
        Ok(()) => debug!(key, weight, "refunded unclaimed shared rate limit grant"),
        Err(error) => {
            warn!(key, weight, error = %error, "failed to refund shared rate limit grant")
        }
    }
}

/// Wait before polling again: bounded so waiters re-check often, jittered so
/// they do not retry in lockstep.
fn poll_delay(retry_after: Duration) -> Duration {
    let base = retry_after.min(MAX_POLL_INTERVAL);
    let spread = (base.as_millis() as u64 / 4).max(1);
    let jitter = rand::thread_rng().gen_range(0..=spread);
    base + Duration::from_millis(jitter)
}

/// Process-local [`BucketStore`] with the same fixed-window semantics as the
/// Redis store. Useful for sharing one quota between limiter instances in a
/// single process and for tests.
#[derive(Default)]
pub struct InMemoryBucketStore {
    buckets: Mutex<HashMap<String, WindowState>>,
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    tokens: u32,
    window_start: Instant,
}

impl InMemoryBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(
        &self,
        key: &str,
        quota: RateLimitQuota,
        f: impl FnOnce(&mut WindowState, Duration) -> T,
    ) -> T {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let state = buckets.entry(key.to_string()).or_insert(WindowState {
            tokens: quota.capacity,
            window_start: now,
        });
        let elapsed = now.duration_since(state.window_start);
        if elapsed >= quota.window {
            state.tokens = quota.capacity;
            state.window_start = now;
        }
        let left_in_window = quota.window.saturating_sub(now.duration_since(state.window_start));
        f(state, left_in_window)
    }
}

#[async_trait]
impl BucketStore for InMemoryBucketStore {
    async fn try_take(
        &self,
        key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<BucketDecision, StoreError> {
        Ok(self.with_state(key, quota, |state, left_in_window| {
            if state.tokens >= weight {
                state.tokens -= weight;
                BucketDecision::Granted {
                    remaining: state.tokens,
                }
            } else {
                BucketDecision::Denied {
                    retry_after: left_in_window,
                }
            }
        }))
    }

    async fn remaining(&self, key: &str, quota: RateLimitQuota) -> Result<u32, StoreError> {
        Ok(self.with_state(key, quota, |state, _| state.tokens))
    }

    async fn refund(
        &self,
        key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<(), StoreError> {
        self.with_state(key, quota, |state, _| {
            state.tokens = state.tokens.saturating_add(weight).min(quota.capacity);
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_delay_is_bounded() {
        for _ in 0..100 {
            let delay = poll_delay(Duration::from_secs(10));
            assert!(delay >= MAX_POLL_INTERVAL);
            assert!(delay <= MAX_POLL_INTERVAL + MAX_POLL_INTERVAL / 4);
        }
        assert!(poll_delay(Duration::ZERO) <= Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_in_memory_store_resets_after_window() {
        let store = InMemoryBucketStore::new();
        let quota = RateLimitQuota::new(2, Duration::from_millis(100));

        assert_eq!(
            store.try_take("k", quota, 2).await.unwrap(),
            BucketDecision::Granted { remaining: 0 }
        );
        assert!(matches!(
            store.try_take("k", quota, 1).await.unwrap(),
            BucketDecision::Denied { .. }
        ));

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(store.remaining("k", quota).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_in_memory_refund_is_capped() {
        let store = InMemoryBucketStore::new();
        let quota = RateLimitQuota::new(3, Duration::from_secs(60));

        store.try_take("k", quota, 2).await.unwrap();
        store.refund("k", quota, 1).await.unwrap();
        assert_eq!(store.remaining("k", quota).await.unwrap(), 2);

        store.refund("k", quota, 5).await.unwrap();
        assert_eq!(store.remaining("k", quota).await.unwrap(), 3);
    }
}
